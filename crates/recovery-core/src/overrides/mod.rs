//! Clinic override enforcer.
//!
//! Layers a clinic's require/forbid/cap policy over the rule-resolved days.
//! Enforcement is fail-open: an invalid policy or an incompatible plan
//! leaves the days untouched and records a diagnostic event instead of
//! failing. Per day the steps run in a fixed order:
//!
//! 1. remove forbidden ids
//! 2. add `requiredModuleIds`
//! 3. add `requiredByPhase[phase]`
//! 4. add `requiredByDay[day]`
//! 5. drop ids missing from the module dictionary
//! 6. remove forbidden ids again (forbidden beats required)
//! 7. truncate to `maxModulesPerDay`

pub mod audit;
pub mod policy;

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::model::{DayBlock, ModuleDefinition, PLAN_DAYS, Phase};

pub use audit::{AuditEvent, AuditEventKind, RequirementSource};
pub use policy::{ClinicOverridePolicy, PolicyValidationError, PolicyVersion, parse_policy};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Policy identification recorded in plan metadata. Both fields are `null`
/// unless a valid policy was applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicOverrideMeta {
    pub version: Option<PolicyVersion>,
    pub note: Option<String>,
}

/// The plan after override enforcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnforcedPlan {
    pub days: Vec<DayBlock>,
    pub clinic_overrides: ClinicOverrideMeta,
    pub audit_events: Vec<AuditEvent>,
}

impl EnforcedPlan {
    fn unchanged(days: &[DayBlock], audit_events: Vec<AuditEvent>) -> Self {
        Self {
            days: days.to_vec(),
            clinic_overrides: ClinicOverrideMeta::default(),
            audit_events,
        }
    }
}

/// Required ids split by source, with unknown ids already removed.
#[derive(Debug, Default)]
struct KnownRequirements {
    global: Vec<String>,
    by_phase: BTreeMap<Phase, Vec<String>>,
    by_day: BTreeMap<u8, Vec<String>>,
}

impl KnownRequirements {
    fn partition(
        policy: &ClinicOverridePolicy,
        modules: &BTreeMap<String, ModuleDefinition>,
        events: &mut Vec<AuditEvent>,
    ) -> Self {
        let mut known = Self {
            global: keep_known(
                &policy.required_module_ids,
                RequirementSource::Global,
                modules,
                events,
            ),
            ..Self::default()
        };
        for (phase, ids) in &policy.required_by_phase {
            let ids = keep_known(ids, RequirementSource::Phase(*phase), modules, events);
            known.by_phase.insert(*phase, ids);
        }
        for (day, ids) in &policy.required_by_day {
            let ids = keep_known(ids, RequirementSource::Day(*day), modules, events);
            known.by_day.insert(*day, ids);
        }
        known
    }

    fn for_block(&self, block: &DayBlock) -> [(RequirementSource, &[String]); 3] {
        let phase = self.by_phase.get(&block.phase).map(Vec::as_slice).unwrap_or_default();
        let day = self.by_day.get(&block.day).map(Vec::as_slice).unwrap_or_default();
        [
            (RequirementSource::Global, self.global.as_slice()),
            (RequirementSource::Phase(block.phase), phase),
            (RequirementSource::Day(block.day), day),
        ]
    }
}

fn keep_known(
    ids: &[String],
    source: RequirementSource,
    modules: &BTreeMap<String, ModuleDefinition>,
    events: &mut Vec<AuditEvent>,
) -> Vec<String> {
    let mut reported = HashSet::new();
    let mut known = Vec::new();
    for id in ids {
        if modules.contains_key(id) {
            known.push(id.clone());
        } else if reported.insert(id.as_str()) {
            warn!(module_id = %id, %source, "unknown module ignored");
            let day = match source {
                RequirementSource::Day(day) => Some(day),
                _ => None,
            };
            events.push(AuditEvent::unknown_ignored(day, id, &source.to_string()));
        }
    }
    known
}

// ---------------------------------------------------------------------------
// Enforcement
// ---------------------------------------------------------------------------

/// Apply an optional clinic policy to rule-resolved days.
///
/// `policy` of `None` or JSON `null` returns the days unchanged with no
/// events. Never fails.
pub fn enforce_clinic_policy(
    days: &[DayBlock],
    modules: &BTreeMap<String, ModuleDefinition>,
    policy: Option<&Value>,
) -> EnforcedPlan {
    let Some(raw) = policy.filter(|v| !v.is_null()) else {
        return EnforcedPlan::unchanged(days, Vec::new());
    };

    let policy = match parse_policy(raw) {
        Ok(policy) => policy,
        Err(e) => {
            warn!(error = %e, "clinic override policy is invalid, skipping enforcement");
            return EnforcedPlan::unchanged(days, vec![AuditEvent::policy_invalid(e.to_string())]);
        }
    };

    if days.len() != PLAN_DAYS || modules.is_empty() {
        warn!(
            day_count = days.len(),
            module_count = modules.len(),
            "plan shape is incompatible with clinic overrides, skipping enforcement"
        );
        return EnforcedPlan::unchanged(
            days,
            vec![AuditEvent::override_skipped(format!(
                "plan has {} days and {} modules",
                days.len(),
                modules.len()
            ))],
        );
    }

    debug!(version = ?policy.version, "enforcing clinic override policy");

    let mut events = Vec::new();
    let required = KnownRequirements::partition(&policy, modules, &mut events);
    let forbidden: HashSet<&str> = policy
        .forbidden_module_ids
        .iter()
        .map(String::as_str)
        .collect();

    let days = days
        .iter()
        .map(|block| {
            let module_ids = enforce_day(
                block,
                &required,
                &forbidden,
                policy.max_modules_per_day,
                modules,
                &mut events,
            );
            DayBlock {
                module_ids,
                ..block.clone()
            }
        })
        .collect();

    EnforcedPlan {
        days,
        clinic_overrides: ClinicOverrideMeta {
            version: policy.version,
            note: policy.note,
        },
        audit_events: events,
    }
}

fn enforce_day(
    block: &DayBlock,
    required: &KnownRequirements,
    forbidden: &HashSet<&str>,
    cap: Option<usize>,
    modules: &BTreeMap<String, ModuleDefinition>,
    events: &mut Vec<AuditEvent>,
) -> Vec<String> {
    let day = block.day;
    let mut ids = block.module_ids.clone();

    remove_forbidden(day, &mut ids, forbidden, "forbidden by clinic policy", events);

    for (source, list) in required.for_block(block) {
        for id in list {
            if !ids.contains(id) {
                ids.push(id.clone());
                events.push(AuditEvent::required_added(day, id, source));
            }
        }
    }

    ids.retain(|id| {
        let known = modules.contains_key(id);
        if !known {
            warn!(day, module_id = %id, "unknown module ignored");
            events.push(AuditEvent::unknown_ignored(Some(day), id, "day module list"));
        }
        known
    });

    remove_forbidden(
        day,
        &mut ids,
        forbidden,
        "forbidden by clinic policy, overrides required",
        events,
    );

    if let Some(cap) = cap {
        if ids.len() > cap {
            let removed = ids.split_off(cap);
            debug!(day, cap, removed = removed.len(), "trimmed day to module cap");
            events.push(AuditEvent::cap_trimmed(day, removed, cap));
        }
    }

    ids
}

fn remove_forbidden(
    day: u8,
    ids: &mut Vec<String>,
    forbidden: &HashSet<&str>,
    reason: &str,
    events: &mut Vec<AuditEvent>,
) {
    ids.retain(|id| {
        if forbidden.contains(id.as_str()) {
            events.push(AuditEvent::forbidden_removed(day, id, reason));
            false
        } else {
            true
        }
    });
}
