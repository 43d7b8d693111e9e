//! Structured audit events emitted while enforcing a clinic policy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Phase;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventKind {
    ClinicPolicyInvalid,
    ClinicOverrideSkipped,
    ClinicUnknownModuleIgnored,
    ClinicForbiddenRemoved,
    ClinicRequiredAdded,
    ClinicCapTrimmed,
}

/// One override-stage decision. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    #[serde(rename = "type")]
    pub kind: AuditEventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub module_ids: Vec<String>,
    pub reason: String,
}

impl AuditEvent {
    fn new(kind: AuditEventKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            day: None,
            module_id: None,
            module_ids: Vec::new(),
            reason: reason.into(),
        }
    }

    pub fn policy_invalid(reason: impl Into<String>) -> Self {
        Self::new(AuditEventKind::ClinicPolicyInvalid, reason)
    }

    pub fn override_skipped(reason: impl Into<String>) -> Self {
        Self::new(AuditEventKind::ClinicOverrideSkipped, reason)
    }

    pub fn unknown_ignored(day: Option<u8>, module_id: &str, source: &str) -> Self {
        Self {
            day,
            module_id: Some(module_id.to_owned()),
            ..Self::new(
                AuditEventKind::ClinicUnknownModuleIgnored,
                format!("unknown module ignored ({source})"),
            )
        }
    }

    pub fn forbidden_removed(day: u8, module_id: &str, reason: impl Into<String>) -> Self {
        Self {
            day: Some(day),
            module_id: Some(module_id.to_owned()),
            ..Self::new(AuditEventKind::ClinicForbiddenRemoved, reason)
        }
    }

    pub fn required_added(day: u8, module_id: &str, source: RequirementSource) -> Self {
        Self {
            day: Some(day),
            module_id: Some(module_id.to_owned()),
            ..Self::new(
                AuditEventKind::ClinicRequiredAdded,
                format!("required by {source}"),
            )
        }
    }

    pub fn cap_trimmed(day: u8, removed: Vec<String>, cap: usize) -> Self {
        Self {
            day: Some(day),
            module_ids: removed,
            ..Self::new(
                AuditEventKind::ClinicCapTrimmed,
                format!("maxModulesPerDay is {cap}"),
            )
        }
    }
}

/// Which policy list a required id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementSource {
    Global,
    Phase(Phase),
    Day(u8),
}

impl fmt::Display for RequirementSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("requiredModuleIds"),
            Self::Phase(phase) => write!(f, "requiredByPhase.{phase}"),
            Self::Day(day) => write!(f, "requiredByDay.{day}"),
        }
    }
}
