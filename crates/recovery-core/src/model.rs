use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of day blocks in every plan (days `0..=20`).
pub const PLAN_DAYS: usize = 21;

/// Highest valid day index.
pub const LAST_DAY: u8 = 20;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Error returned when a string does not name a variant of one of the
/// engine's enumerations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumParseError {
    /// Human-readable name of the enumeration (e.g. `"phase"`).
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl fmt::Display for EnumParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {:?}", self.kind, self.value)
    }
}

impl std::error::Error for EnumParseError {}

// ---------------------------------------------------------------------------

/// Coarse recovery period, derived purely from the day index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Early,
    Mid,
    Late,
}

impl Phase {
    /// Phase for a day index: 0–3 early, 4–10 mid, 11 and later late.
    pub fn for_day(day: u8) -> Self {
        match day {
            0..=3 => Self::Early,
            4..=10 => Self::Mid,
            _ => Self::Late,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Early => "early",
            Self::Mid => "mid",
            Self::Late => "late",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "early" => Ok(Self::Early),
            "mid" => Ok(Self::Mid),
            "late" => Ok(Self::Late),
            other => Err(EnumParseError {
                kind: "phase",
                value: other.to_owned(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------

/// Kind of content a module carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleType {
    Education,
    Task,
    Tracking,
    Milestone,
    RedFlag,
}

impl ModuleType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Education => "education",
            Self::Task => "task",
            Self::Tracking => "tracking",
            Self::Milestone => "milestone",
            Self::RedFlag => "red_flag",
        }
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleType {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "education" => Ok(Self::Education),
            "task" => Ok(Self::Task),
            "tracking" => Ok(Self::Tracking),
            "milestone" => Ok(Self::Milestone),
            "red_flag" => Ok(Self::RedFlag),
            other => Err(EnumParseError {
                kind: "module type",
                value: other.to_owned(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------

/// Urgency attached to red-flag content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

/// An immutable entry of the module library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDefinition {
    /// Stable identifier (e.g. `track_pain`).
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ModuleType,
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

/// One day of a plan.
///
/// `phase` always equals [`Phase::for_day`] of `day` once a block has left
/// the template normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBlock {
    pub day: u8,
    pub phase: Phase,
    pub title: String,
    /// Ordered module ids shown on this day.
    pub module_ids: Vec<String>,
    /// Ordered free-text checklist items.
    pub box_items: Vec<String>,
}

impl DayBlock {
    pub fn contains(&self, module_id: &str) -> bool {
        self.module_ids.iter().any(|id| id == module_id)
    }
}
