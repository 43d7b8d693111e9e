//! Clinic override policy schema and validation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::model::{LAST_DAY, Phase};

/// Bounds for `maxModulesPerDay`.
pub const MIN_MODULES_PER_DAY: i64 = 1;
pub const MAX_MODULES_PER_DAY: i64 = 50;

/// Errors from validating a clinic override policy. Always recovered by the
/// enforcer; never fatal to plan generation.
#[derive(Debug, Error)]
pub enum PolicyValidationError {
    #[error("policy does not match schema: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("maxModulesPerDay must be between 1 and 50, got {0}")]
    CapOutOfRange(i64),

    #[error("requiredByDay key {0:?} is not a day between 0 and 20")]
    InvalidDayKey(String),

    #[error("{field} contains an empty module id")]
    EmptyModuleId { field: String },
}

/// Policy version as written by the clinic: a label or a revision number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PolicyVersion {
    Number(u64),
    Text(String),
}

impl fmt::Display for PolicyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Per-phase required module ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPhaseRequirements {
    #[serde(default)]
    early: Option<Vec<String>>,
    #[serde(default)]
    mid: Option<Vec<String>>,
    #[serde(default)]
    late: Option<Vec<String>>,
}

/// Wire shape of the policy. Every field is optional and may be `null`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawPolicy {
    #[serde(default)]
    version: Option<PolicyVersion>,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    required_module_ids: Option<Vec<String>>,
    #[serde(default)]
    forbidden_module_ids: Option<Vec<String>>,
    #[serde(default)]
    required_by_phase: Option<RawPhaseRequirements>,
    #[serde(default)]
    required_by_day: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    max_modules_per_day: Option<i64>,
}

/// A validated clinic override policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClinicOverridePolicy {
    pub version: Option<PolicyVersion>,
    pub note: Option<String>,
    pub required_module_ids: Vec<String>,
    pub forbidden_module_ids: Vec<String>,
    pub required_by_phase: BTreeMap<Phase, Vec<String>>,
    pub required_by_day: BTreeMap<u8, Vec<String>>,
    pub max_modules_per_day: Option<usize>,
}

/// Validate an untyped policy document.
pub fn parse_policy(raw: &Value) -> Result<ClinicOverridePolicy, PolicyValidationError> {
    let raw = RawPolicy::deserialize(raw)?;

    let max_modules_per_day = match raw.max_modules_per_day {
        Some(n) if !(MIN_MODULES_PER_DAY..=MAX_MODULES_PER_DAY).contains(&n) => {
            return Err(PolicyValidationError::CapOutOfRange(n));
        }
        Some(n) => Some(n as usize),
        None => None,
    };

    let required_module_ids = non_empty_ids("requiredModuleIds", raw.required_module_ids)?;
    let forbidden_module_ids = non_empty_ids("forbiddenModuleIds", raw.forbidden_module_ids)?;

    let mut required_by_phase = BTreeMap::new();
    let phases = raw.required_by_phase.unwrap_or_default();
    for (phase, ids) in [
        (Phase::Early, phases.early),
        (Phase::Mid, phases.mid),
        (Phase::Late, phases.late),
    ] {
        let ids = non_empty_ids(&format!("requiredByPhase.{phase}"), ids)?;
        if !ids.is_empty() {
            required_by_phase.insert(phase, ids);
        }
    }

    // Raw keys iterate in string order, so keys naming the same day ("07",
    // "7") merge in that order regardless of document order.
    let mut required_by_day = BTreeMap::new();
    for (key, ids) in raw.required_by_day.unwrap_or_default() {
        let day = key
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|d| *d <= LAST_DAY)
            .ok_or_else(|| PolicyValidationError::InvalidDayKey(key.clone()))?;
        let ids = non_empty_ids(&format!("requiredByDay.{key}"), Some(ids))?;
        required_by_day.entry(day).or_insert_with(Vec::new).extend(ids);
    }

    Ok(ClinicOverridePolicy {
        version: raw.version,
        note: raw.note,
        required_module_ids,
        forbidden_module_ids,
        required_by_phase,
        required_by_day,
        max_modules_per_day,
    })
}

fn non_empty_ids(
    field: &str,
    ids: Option<Vec<String>>,
) -> Result<Vec<String>, PolicyValidationError> {
    let ids = ids.unwrap_or_default();
    if ids.iter().any(|id| id.trim().is_empty()) {
        return Err(PolicyValidationError::EmptyModuleId {
            field: field.to_owned(),
        });
    }
    Ok(ids)
}
