//! The six-field categorical plan configuration.
//!
//! Every field is required. The engine never fills in a default; a raw
//! configuration document is checked by [`parse_configuration`], which
//! reports every missing or unrecognized field by name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::model::EnumParseError;

// ---------------------------------------------------------------------------
// Field enums
// ---------------------------------------------------------------------------

/// Body region the surgery affected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryRegion {
    LegFoot,
    ArmHand,
    Torso,
    FaceNeck,
    Other,
}

impl RecoveryRegion {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LegFoot => "leg_foot",
            Self::ArmHand => "arm_hand",
            Self::Torso => "torso",
            Self::FaceNeck => "face_neck",
            Self::Other => "other",
        }
    }
}

impl FromStr for RecoveryRegion {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "leg_foot" => Ok(Self::LegFoot),
            "arm_hand" => Ok(Self::ArmHand),
            "torso" => Ok(Self::Torso),
            "face_neck" => Ok(Self::FaceNeck),
            "other" => Ok(Self::Other),
            other => Err(EnumParseError {
                kind: "recovery_region",
                value: other.to_owned(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------

/// Expected length of the recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryDuration {
    #[serde(rename = "short_7_14")]
    Short,
    #[serde(rename = "standard_15_21")]
    Standard,
    #[serde(rename = "extended")]
    Extended,
}

impl RecoveryDuration {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short_7_14",
            Self::Standard => "standard_15_21",
            Self::Extended => "extended",
        }
    }
}

impl FromStr for RecoveryDuration {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short_7_14" => Ok(Self::Short),
            "standard_15_21" => Ok(Self::Standard),
            "extended" => Ok(Self::Extended),
            other => Err(EnumParseError {
                kind: "recovery_duration",
                value: other.to_owned(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------

/// How much the surgery restricts movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MobilityImpact {
    NoRestriction,
    Limited,
    NonWeightBearing,
}

impl MobilityImpact {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoRestriction => "no_restriction",
            Self::Limited => "limited",
            Self::NonWeightBearing => "non_weight_bearing",
        }
    }
}

impl FromStr for MobilityImpact {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no_restriction" => Ok(Self::NoRestriction),
            "limited" => Ok(Self::Limited),
            "non_weight_bearing" => Ok(Self::NonWeightBearing),
            other => Err(EnumParseError {
                kind: "mobility_impact",
                value: other.to_owned(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------

/// State of the surgical site at discharge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncisionStatus {
    NoIncision,
    Closed,
    OpenWound,
    DrainsPresent,
}

impl IncisionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoIncision => "no_incision",
            Self::Closed => "closed",
            Self::OpenWound => "open_wound",
            Self::DrainsPresent => "drains_present",
        }
    }
}

impl FromStr for IncisionStatus {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no_incision" => Ok(Self::NoIncision),
            "closed" => Ok(Self::Closed),
            "open_wound" => Ok(Self::OpenWound),
            "drains_present" => Ok(Self::DrainsPresent),
            other => Err(EnumParseError {
                kind: "incision_status",
                value: other.to_owned(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------

/// How the patient's discomfort is trending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscomfortPattern {
    Improving,
    Steady,
    Escalating,
}

impl DiscomfortPattern {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Steady => "steady",
            Self::Escalating => "escalating",
        }
    }
}

impl FromStr for DiscomfortPattern {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "improving" => Ok(Self::Improving),
            "steady" => Ok(Self::Steady),
            "escalating" => Ok(Self::Escalating),
            other => Err(EnumParseError {
                kind: "discomfort_pattern",
                value: other.to_owned(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------

/// When the first follow-up visit is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpExpectation {
    #[serde(rename = "within_7_days")]
    Within7Days,
    #[serde(rename = "within_14_days")]
    Within14Days,
    #[serde(rename = "within_30_days")]
    Within30Days,
    NotScheduled,
}

impl FollowUpExpectation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Within7Days => "within_7_days",
            Self::Within14Days => "within_14_days",
            Self::Within30Days => "within_30_days",
            Self::NotScheduled => "not_scheduled",
        }
    }
}

impl FromStr for FollowUpExpectation {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "within_7_days" => Ok(Self::Within7Days),
            "within_14_days" => Ok(Self::Within14Days),
            "within_30_days" => Ok(Self::Within30Days),
            "not_scheduled" => Ok(Self::NotScheduled),
            other => Err(EnumParseError {
                kind: "follow_up_expectation",
                value: other.to_owned(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// PlanConfiguration
// ---------------------------------------------------------------------------

/// Validated configuration driving the rule resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanConfiguration {
    pub recovery_region: RecoveryRegion,
    pub recovery_duration: RecoveryDuration,
    pub mobility_impact: MobilityImpact,
    pub incision_status: IncisionStatus,
    pub discomfort_pattern: DiscomfortPattern,
    pub follow_up_expectation: FollowUpExpectation,
}

/// Names of the six required configuration fields, in canonical order.
pub const CONFIG_FIELDS: [&str; 6] = [
    "recovery_region",
    "recovery_duration",
    "mobility_impact",
    "incision_status",
    "discomfort_pattern",
    "follow_up_expectation",
];

/// A single problem found in a raw configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldProblem {
    Missing(&'static str),
    NotAString(&'static str),
    InvalidValue { field: &'static str, value: String },
    Unknown(String),
}

impl fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(field) => write!(f, "{field} is required"),
            Self::NotAString(field) => write!(f, "{field} must be a string"),
            Self::InvalidValue { field, value } => {
                write!(f, "{field} has unrecognized value {value:?}")
            }
            Self::Unknown(field) => write!(f, "unknown field {field:?}"),
        }
    }
}

/// Errors from validating a raw configuration document.
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("plan configuration must be an object")]
    NotAnObject,

    #[error("invalid plan configuration: {}", join_problems(.0))]
    Invalid(Vec<FieldProblem>),
}

fn join_problems(problems: &[FieldProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validate a raw configuration document into a [`PlanConfiguration`].
///
/// Collects every problem rather than stopping at the first, so callers can
/// show the full list at once.
pub fn parse_configuration(raw: &Value) -> Result<PlanConfiguration, ConfigValidationError> {
    let obj = raw.as_object().ok_or(ConfigValidationError::NotAnObject)?;
    let mut problems = Vec::new();

    for key in obj.keys() {
        if !CONFIG_FIELDS.contains(&key.as_str()) {
            problems.push(FieldProblem::Unknown(key.clone()));
        }
    }

    let recovery_region = field::<RecoveryRegion>(raw, "recovery_region", &mut problems);
    let recovery_duration = field::<RecoveryDuration>(raw, "recovery_duration", &mut problems);
    let mobility_impact = field::<MobilityImpact>(raw, "mobility_impact", &mut problems);
    let incision_status = field::<IncisionStatus>(raw, "incision_status", &mut problems);
    let discomfort_pattern = field::<DiscomfortPattern>(raw, "discomfort_pattern", &mut problems);
    let follow_up_expectation =
        field::<FollowUpExpectation>(raw, "follow_up_expectation", &mut problems);

    match (
        recovery_region,
        recovery_duration,
        mobility_impact,
        incision_status,
        discomfort_pattern,
        follow_up_expectation,
    ) {
        (Some(a), Some(b), Some(c), Some(d), Some(e), Some(f)) if problems.is_empty() => {
            Ok(PlanConfiguration {
                recovery_region: a,
                recovery_duration: b,
                mobility_impact: c,
                incision_status: d,
                discomfort_pattern: e,
                follow_up_expectation: f,
            })
        }
        _ => Err(ConfigValidationError::Invalid(problems)),
    }
}

fn field<T>(raw: &Value, name: &'static str, problems: &mut Vec<FieldProblem>) -> Option<T>
where
    T: FromStr<Err = EnumParseError>,
{
    match raw.get(name) {
        None | Some(Value::Null) => {
            problems.push(FieldProblem::Missing(name));
            None
        }
        Some(Value::String(s)) => match s.parse::<T>() {
            Ok(v) => Some(v),
            Err(e) => {
                problems.push(FieldProblem::InvalidValue {
                    field: name,
                    value: e.value,
                });
                None
            }
        },
        Some(_) => {
            problems.push(FieldProblem::NotAString(name));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full() -> Value {
        json!({
            "recovery_region": "leg_foot",
            "recovery_duration": "standard_15_21",
            "mobility_impact": "limited",
            "incision_status": "open_wound",
            "discomfort_pattern": "escalating",
            "follow_up_expectation": "within_7_days"
        })
    }

    #[test]
    fn parses_complete_configuration() {
        let cfg = parse_configuration(&full()).expect("complete config should parse");
        assert_eq!(cfg.recovery_region, RecoveryRegion::LegFoot);
        assert_eq!(cfg.recovery_duration, RecoveryDuration::Standard);
        assert_eq!(cfg.follow_up_expectation, FollowUpExpectation::Within7Days);
    }

    #[test]
    fn reports_every_missing_field() {
        let err = parse_configuration(&json!({})).unwrap_err();
        match err {
            ConfigValidationError::Invalid(problems) => {
                assert_eq!(problems.len(), 6);
                for name in CONFIG_FIELDS {
                    assert!(
                        problems.contains(&FieldProblem::Missing(name)),
                        "missing {name} should be reported"
                    );
                }
            }
            other => panic!("expected Invalid, got: {other}"),
        }
    }

    #[test]
    fn never_defaults_a_single_missing_field() {
        let mut raw = full();
        raw.as_object_mut().unwrap().remove("incision_status");
        let err = parse_configuration(&raw).unwrap_err();
        assert!(
            matches!(err, ConfigValidationError::Invalid(ref p) if p == &[FieldProblem::Missing("incision_status")]),
            "expected only incision_status missing, got: {err}"
        );
    }

    #[test]
    fn rejects_unrecognized_value_and_unknown_field() {
        let mut raw = full();
        raw["mobility_impact"] = json!("sprinting");
        raw["favourite_colour"] = json!("blue");
        let err = parse_configuration(&raw).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("mobility_impact has unrecognized value \"sprinting\""), "{text}");
        assert!(text.contains("unknown field \"favourite_colour\""), "{text}");
    }

    #[test]
    fn rejects_non_string_values() {
        let mut raw = full();
        raw["recovery_region"] = json!(3);
        let err = parse_configuration(&raw).unwrap_err();
        assert!(
            matches!(err, ConfigValidationError::Invalid(ref p) if p == &[FieldProblem::NotAString("recovery_region")]),
            "got: {err}"
        );
    }

    #[test]
    fn rejects_non_object() {
        assert!(matches!(
            parse_configuration(&json!(["leg_foot"])),
            Err(ConfigValidationError::NotAnObject)
        ));
    }

    #[test]
    fn serde_names_match_from_str() {
        let cfg = parse_configuration(&full()).unwrap();
        assert_eq!(serde_json::to_value(cfg).unwrap(), full());
        assert_eq!(cfg.recovery_duration.as_str(), "standard_15_21");
        assert_eq!(cfg.follow_up_expectation.as_str(), "within_7_days");
    }

    #[test]
    fn as_str_matches_serialized_value_for_every_field() {
        let cfg = parse_configuration(&full()).unwrap();
        let value = serde_json::to_value(cfg).unwrap();
        let rendered = [
            cfg.recovery_region.as_str(),
            cfg.recovery_duration.as_str(),
            cfg.mobility_impact.as_str(),
            cfg.incision_status.as_str(),
            cfg.discomfort_pattern.as_str(),
            cfg.follow_up_expectation.as_str(),
        ];
        for (field, name) in CONFIG_FIELDS.iter().zip(rendered) {
            assert_eq!(value[*field], name, "{field} renders differently in logs");
        }
    }
}
