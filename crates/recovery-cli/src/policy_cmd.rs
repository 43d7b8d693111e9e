//! CLI handler for `recovery-plan policy check`.

use std::path::Path;

use anyhow::{Context, Result};

use recovery_core::library::builtin_modules;
use recovery_core::overrides::{ClinicOverridePolicy, parse_policy};

use crate::PolicyCommands;
use crate::document::load_document;

pub fn run_policy_command(command: PolicyCommands) -> Result<()> {
    match command {
        PolicyCommands::Check { file } => cmd_check(&file),
    }
}

/// Validate a policy document and print a summary of what it does.
///
/// The engine tolerates invalid policies by ignoring them; this command is
/// where a clinic finds out before that happens.
fn cmd_check(path: &Path) -> Result<()> {
    let raw = load_document(path)?;
    let policy =
        parse_policy(&raw).with_context(|| format!("invalid policy in {}", path.display()))?;

    println!("Policy is valid.");
    println!();
    for line in summarize(&policy) {
        println!("  {line}");
    }

    let unknown = unknown_ids(&policy);
    if !unknown.is_empty() {
        println!();
        println!("Warnings:");
        for id in &unknown {
            println!("  - {id} is not in the built-in module library");
        }
    }
    Ok(())
}

fn summarize(policy: &ClinicOverridePolicy) -> Vec<String> {
    let or_none = |v: Option<String>| v.unwrap_or_else(|| "(none)".to_owned());
    let mut lines = vec![
        format!("Version:          {}", or_none(policy.version.as_ref().map(|v| v.to_string()))),
        format!("Note:             {}", or_none(policy.note.clone())),
        format!("Required:         {}", list(&policy.required_module_ids)),
        format!("Forbidden:        {}", list(&policy.forbidden_module_ids)),
    ];
    for (phase, ids) in &policy.required_by_phase {
        lines.push(format!("Required ({phase}): {}", list(ids)));
    }
    for (day, ids) in &policy.required_by_day {
        lines.push(format!("Required (day {day}): {}", list(ids)));
    }
    lines.push(format!(
        "Max per day:      {}",
        or_none(policy.max_modules_per_day.map(|n| n.to_string()))
    ));
    lines
}

fn list(ids: &[String]) -> String {
    if ids.is_empty() {
        "(none)".to_owned()
    } else {
        ids.join(", ")
    }
}

/// Policy ids with no built-in definition, sorted and deduplicated. The
/// engine ignores these when it enforces the policy against the built-in
/// library.
fn unknown_ids(policy: &ClinicOverridePolicy) -> Vec<String> {
    let modules = builtin_modules();
    let mut ids: Vec<String> = policy
        .required_module_ids
        .iter()
        .chain(&policy.forbidden_module_ids)
        .chain(policy.required_by_phase.values().flatten())
        .chain(policy.required_by_day.values().flatten())
        .filter(|id| !modules.contains_key(*id))
        .cloned()
        .collect();
    ids.sort();
    ids.dedup();
    ids
}
