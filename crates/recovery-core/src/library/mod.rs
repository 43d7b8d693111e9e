//! Built-in module library and default template.
//!
//! The library is defined in `library.toml` and embedded in the binary at
//! compile time. Callers with their own stored templates never need it; it
//! backs the CLI defaults and the test fixtures.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::model::{ModuleDefinition, ModuleType};
use crate::template::PlanTemplate;

/// Stable ids of the modules the rule resolver and normalizer schedule.
pub mod ids {
    pub const CHECKIN_OVERALL: &str = "checkin_overall";
    pub const TRACK_PAIN: &str = "track_pain";
    pub const TRACK_SLEEP: &str = "track_sleep";
    pub const TRACK_SWELLING: &str = "track_swelling";
    pub const RF_EMERGENCY: &str = "rf_emergency";
    pub const RF_WORSENING: &str = "rf_worsening";
    pub const RF_INFECTION: &str = "rf_infection";
    pub const EDU_WOUND_CARE: &str = "edu_wound_care";
    pub const EDU_MOBILITY: &str = "edu_mobility";
    pub const EDU_FOLLOW_UP: &str = "edu_follow_up";
    pub const EDU_LONG_TERM: &str = "edu_long_term";
}

/// Category recorded in plan metadata when the caller names none.
pub const DEFAULT_CATEGORY: &str = "general_post_surgical";

/// Container for deserializing the embedded TOML file.
#[derive(Debug, Deserialize)]
struct LibraryFile {
    modules: Vec<ModuleDefinition>,
    template: TemplateSection,
}

#[derive(Debug, Deserialize)]
struct TemplateSection {
    title: String,
    disclaimer: String,
    #[serde(default)]
    days: Vec<Value>,
}

static LIBRARY_TOML: &str = include_str!("library.toml");

/// # Panics
///
/// Panics if the embedded TOML is malformed. The file is compiled into the
/// binary, so a successful test run proves it valid.
fn load_library() -> LibraryFile {
    toml::from_str(LIBRARY_TOML).expect("embedded library.toml is invalid")
}

/// All built-in modules keyed by id.
pub fn builtin_modules() -> BTreeMap<String, ModuleDefinition> {
    load_library()
        .modules
        .into_iter()
        .map(|m| (m.id.clone(), m))
        .collect()
}

/// The default template: built-in modules plus a sparse set of milestone
/// days. The normalizer fills in the rest.
pub fn builtin_template() -> PlanTemplate {
    let lib = load_library();
    PlanTemplate {
        title: lib.template.title,
        disclaimer: lib.template.disclaimer,
        modules: lib.modules.into_iter().map(|m| (m.id.clone(), m)).collect(),
        days: lib.template.days,
    }
}

/// Ids of built-in modules of the given type, in id order.
pub fn module_ids_by_type(kind: ModuleType) -> Vec<String> {
    builtin_modules()
        .into_values()
        .filter(|m| m.kind == kind)
        .map(|m| m.id)
        .collect()
}
