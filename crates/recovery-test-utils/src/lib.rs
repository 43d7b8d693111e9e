//! Shared fixtures for recovery plan tests.
//!
//! Provides the configurations and policies used across the core and CLI
//! test suites, plus helpers for writing them to a scratch directory.

use std::path::PathBuf;

use serde_json::{Value, json};
use tempfile::TempDir;

use recovery_core::library::{DEFAULT_CATEGORY, builtin_template};
use recovery_core::template::PlanTemplate;
use recovery_core::{GeneratedPlan, PlanConfiguration, PlanRequest, generate_plan, parse_configuration};

/// Raw configuration of the leg surgery example: open wound, escalating
/// discomfort, follow-up within a week, limited mobility.
pub fn leg_surgery_config_json() -> Value {
    json!({
        "recovery_region": "leg_foot",
        "incision_status": "open_wound",
        "discomfort_pattern": "escalating",
        "follow_up_expectation": "within_7_days",
        "mobility_impact": "limited",
        "recovery_duration": "standard_15_21"
    })
}

pub fn leg_surgery_config() -> PlanConfiguration {
    parse_configuration(&leg_surgery_config_json()).expect("fixture config is valid")
}

/// A configuration that fires only the unconditional rules.
pub fn quiet_config() -> PlanConfiguration {
    parse_configuration(&json!({
        "recovery_region": "other",
        "incision_status": "no_incision",
        "discomfort_pattern": "improving",
        "follow_up_expectation": "not_scheduled",
        "mobility_impact": "no_restriction",
        "recovery_duration": "short_7_14"
    }))
    .expect("fixture config is valid")
}

/// A template whose `days` are deliberately messy: out of order, duplicated,
/// out of range, and partly malformed.
pub fn messy_template() -> PlanTemplate {
    let mut template = builtin_template();
    template.days = vec![
        json!({"day": 14, "title": "Two weeks", "moduleIds": ["milestone_two_weeks", 5]}),
        json!("not a day"),
        json!({"day": 2, "phase": "late", "moduleIds": ["track_pain", "unknown_module"]}),
        json!({"day": 30, "title": "Clamped to last day"}),
        json!({"day": 9, "title": "First nine"}),
        json!({"day": 9, "title": "Second nine", "boxItems": ["Walk to the mailbox", false]}),
    ];
    template
}

/// Generate a plan from the built-in template.
pub fn generate_builtin(config: &PlanConfiguration, policy: Option<&Value>) -> GeneratedPlan {
    generate_with(&builtin_template(), config, policy)
}

pub fn generate_with(
    template: &PlanTemplate,
    config: &PlanConfiguration,
    policy: Option<&Value>,
) -> GeneratedPlan {
    generate_plan(&PlanRequest {
        category: DEFAULT_CATEGORY,
        template,
        config,
        policy,
    })
    .expect("fixture template is valid")
}

/// Ids scheduled on a day of a generated plan.
pub fn ids_on(plan: &GeneratedPlan, day: usize) -> Vec<String> {
    plan.days[day].block.module_ids.clone()
}

/// Day indices on which `module_id` appears.
pub fn days_with(plan: &GeneratedPlan, module_id: &str) -> Vec<u8> {
    plan.day_blocks()
        .filter(|b| b.contains(module_id))
        .map(|b| b.day)
        .collect()
}

/// A scratch directory holding JSON input files.
pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    /// Write `value` as pretty JSON to `name` and return its path.
    pub fn write_json(&self, name: &str, value: &Value) -> PathBuf {
        let path = self.dir.path().join(name);
        let body = serde_json::to_string_pretty(value).expect("fixture serializes");
        std::fs::write(&path, body).expect("failed to write fixture");
        path
    }

    /// Write raw text to `name` and return its path.
    pub fn write_text(&self, name: &str, body: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, body).expect("failed to write fixture");
        path
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

impl Default for Scratch {
    fn default() -> Self {
        Self::new()
    }
}
