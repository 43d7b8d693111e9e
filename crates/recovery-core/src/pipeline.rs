//! Plan generation pipeline.
//!
//! `template → skeleton → after-rules → after-enforcement → after-resolution`.
//! Each stage is a pure function returning a new value, so identical
//! requests always yield identical plans.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::PlanConfiguration;
use crate::error::ConfigurationError;
use crate::model::{DayBlock, ModuleDefinition};
use crate::overrides::{AuditEvent, ClinicOverrideMeta, enforce_clinic_policy};
use crate::resolve::{ResolvedDayBlock, resolve_modules};
use crate::rules::apply_rules;
use crate::template::{PlanTemplate, normalize_days};

/// Version of the generated plan document layout.
pub const SCHEMA_VERSION: u32 = 2;

/// Engine identifier recorded in every plan.
pub const ENGINE_VERSION: &str = concat!("recovery-core/", env!("CARGO_PKG_VERSION"));

/// Everything a single generation needs. Borrowed; the engine keeps nothing.
#[derive(Debug, Clone, Copy)]
pub struct PlanRequest<'a> {
    /// Template category key the caller looked the template up by.
    pub category: &'a str,
    pub template: &'a PlanTemplate,
    pub config: &'a PlanConfiguration,
    /// Untyped clinic override policy, validated during enforcement.
    pub policy: Option<&'a Value>,
}

/// Observability data attached to a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMeta {
    pub engine_version: String,
    pub category: String,
    pub config: PlanConfiguration,
    pub applied_rules: Vec<String>,
    pub clinic_overrides: ClinicOverrideMeta,
    pub clinic_audit_events: Vec<AuditEvent>,
}

/// The final, fully resolved recovery plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPlan {
    pub title: String,
    pub disclaimer: String,
    pub schema_version: u32,
    pub modules: BTreeMap<String, ModuleDefinition>,
    pub days: Vec<ResolvedDayBlock>,
    pub meta: PlanMeta,
}

impl GeneratedPlan {
    /// Day blocks without the resolved module content.
    pub fn day_blocks(&self) -> impl Iterator<Item = &DayBlock> {
        self.days.iter().map(|d| &d.block)
    }
}

/// Run the full pipeline.
///
/// Only a bad template is fatal. Policy problems and dangling module ids
/// are recovered and show up in `meta.clinicAuditEvents` and the log.
pub fn generate_plan(request: &PlanRequest<'_>) -> Result<GeneratedPlan, ConfigurationError> {
    let template = request.template;
    let config = request.config;
    template.validate()?;
    debug!(
        recovery_region = config.recovery_region.as_str(),
        recovery_duration = config.recovery_duration.as_str(),
        mobility_impact = config.mobility_impact.as_str(),
        incision_status = config.incision_status.as_str(),
        discomfort_pattern = config.discomfort_pattern.as_str(),
        follow_up_expectation = config.follow_up_expectation.as_str(),
        "generating plan"
    );

    let skeleton = normalize_days(&template.days);
    debug!(category = request.category, "template normalized");

    let ruled = apply_rules(&skeleton, &template.modules, config);
    debug!(rules = ruled.applied_rules.len(), "rules applied");

    let enforced = enforce_clinic_policy(&ruled.days, &template.modules, request.policy);
    debug!(events = enforced.audit_events.len(), "clinic overrides enforced");

    let days = resolve_modules(&enforced.days, &template.modules);

    Ok(GeneratedPlan {
        title: template.title.clone(),
        disclaimer: template.disclaimer.clone(),
        schema_version: SCHEMA_VERSION,
        modules: template.modules.clone(),
        days,
        meta: PlanMeta {
            engine_version: ENGINE_VERSION.to_owned(),
            category: request.category.to_owned(),
            config: *config,
            applied_rules: ruled.applied_rules,
            clinic_overrides: enforced.clinic_overrides,
            clinic_audit_events: enforced.audit_events,
        },
    })
}
