//! CLI handlers for `recovery-plan generate` and `recovery-plan regenerate`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tracing::{debug, info};

use recovery_core::fingerprint::{plan_fingerprint, value_fingerprint};
use recovery_core::{GeneratedPlan, PlanRequest, generate_plan, parse_configuration};

use crate::config::{CliOverrides, Settings};
use crate::document::{load_document, load_template, render_plan, write_output};

/// Inputs shared by `generate` and `regenerate`.
#[derive(Debug, clap::Args)]
pub struct PlanInputs {
    /// Plan configuration document (JSON or TOML)
    #[arg(long)]
    pub config: PathBuf,
    /// Stored template (defaults to the built-in template)
    #[arg(long)]
    pub template: Option<PathBuf>,
    /// Clinic override policy document
    #[arg(long)]
    pub policy: Option<PathBuf>,
    /// Category recorded in plan metadata
    #[arg(long)]
    pub category: Option<String>,
}

// -----------------------------------------------------------------------
// Shared pipeline invocation
// -----------------------------------------------------------------------

/// Load every input document and run the engine.
fn build_plan(inputs: &PlanInputs) -> Result<GeneratedPlan> {
    let settings = Settings::resolve(CliOverrides {
        template: inputs.template.as_deref(),
        category: inputs.category.as_deref(),
    })?;
    debug!(template = ?settings.template, category = %settings.category, "resolved settings");

    let template = load_template(settings.template.as_deref())?;

    let raw_config = load_document(&inputs.config)?;
    let config = parse_configuration(&raw_config)
        .with_context(|| format!("invalid configuration in {}", inputs.config.display()))?;

    let policy: Option<Value> = inputs.policy.as_deref().map(load_document).transpose()?;

    let plan = generate_plan(&PlanRequest {
        category: &settings.category,
        template: &template,
        config: &config,
        policy: policy.as_ref(),
    })
    .context("plan generation failed")?;
    Ok(plan)
}

// -----------------------------------------------------------------------
// recovery-plan generate
// -----------------------------------------------------------------------

pub fn run_generate(inputs: &PlanInputs, output: Option<&Path>, compact: bool) -> Result<()> {
    let plan = build_plan(inputs)?;
    let fingerprint = plan_fingerprint(&plan).context("failed to fingerprint plan")?;
    info!(
        fingerprint = %fingerprint,
        rules = plan.meta.applied_rules.len(),
        audit_events = plan.meta.clinic_audit_events.len(),
        "plan generated"
    );

    write_output(output, &render_plan(&plan, compact)?)?;
    if let Some(path) = output {
        println!("Plan written to {}", path.display());
        println!("  Fingerprint: {fingerprint}");
    }
    Ok(())
}

// -----------------------------------------------------------------------
// recovery-plan regenerate
// -----------------------------------------------------------------------

/// Regenerate a plan and compare it with the copy on disk.
///
/// Unchanged plans are left alone. A changed plan is an error unless
/// `write` is set, in which case the file is replaced.
pub fn run_regenerate(plan_path: &Path, inputs: &PlanInputs, write: bool) -> Result<()> {
    let existing = load_document(plan_path)?;
    let existing_fingerprint = value_fingerprint(&existing);

    let plan = build_plan(inputs)?;
    let fingerprint = plan_fingerprint(&plan).context("failed to fingerprint plan")?;
    debug!(existing = %existing_fingerprint, regenerated = %fingerprint, "comparing plans");

    if fingerprint == existing_fingerprint {
        println!("Plan unchanged.");
        println!("  Fingerprint: {fingerprint}");
        return Ok(());
    }

    if !write {
        bail!(
            "plan {} is out of date\n  existing:    {existing_fingerprint}\n  regenerated: {fingerprint}\nUse --write to replace it.",
            plan_path.display()
        );
    }

    write_output(Some(plan_path), &render_plan(&plan, false)?)?;
    info!(path = %plan_path.display(), fingerprint = %fingerprint, "plan replaced");
    println!("Plan changed and rewritten to {}", plan_path.display());
    println!("  Previous:    {existing_fingerprint}");
    println!("  Fingerprint: {fingerprint}");
    Ok(())
}
