//! Template normalizer: repairs sparse or malformed day entries into exactly
//! [`PLAN_DAYS`] blocks sorted by day.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::library::ids;
use crate::model::{DayBlock, LAST_DAY, PLAN_DAYS, Phase};

/// Modules placed on early days the template does not supply.
pub const STARTER_MODULE_IDS: [&str; 4] = [
    ids::CHECKIN_OVERALL,
    ids::TRACK_PAIN,
    ids::RF_EMERGENCY,
    ids::RF_WORSENING,
];

/// Checklist items placed on early days the template does not supply.
pub const STARTER_BOX_ITEMS: [&str; 3] = [
    "Take medications exactly as prescribed",
    "Keep your discharge instructions somewhere easy to find",
    "Rest and drink plenty of fluids",
];

/// Normalize raw template day entries into a full 21-day skeleton.
///
/// Entries that are not objects or carry no usable `day` are dropped. When
/// the same day appears more than once, the last occurrence wins.
pub fn normalize_days(raw_days: &[Value]) -> Vec<DayBlock> {
    let mut supplied: BTreeMap<u8, DayBlock> = BTreeMap::new();

    for (index, entry) in raw_days.iter().enumerate() {
        let Some(block) = entry.as_object().and_then(normalize_entry) else {
            warn!(index, "dropping malformed template day entry");
            continue;
        };
        let day = block.day;
        if supplied.insert(day, block).is_some() {
            debug!(day, index, "template supplies day more than once, keeping the later entry");
        }
    }

    let days: Vec<DayBlock> = (0..=LAST_DAY)
        .map(|day| supplied.remove(&day).unwrap_or_else(|| default_day(day)))
        .collect();
    debug_assert_eq!(days.len(), PLAN_DAYS);
    days
}

fn normalize_entry(obj: &Map<String, Value>) -> Option<DayBlock> {
    let day = clamp_day(obj.get("day")?)?;
    let derived = Phase::for_day(day);

    let phase = match obj.get("phase").and_then(Value::as_str).map(str::parse::<Phase>) {
        Some(Ok(supplied)) if supplied != derived => {
            debug!(day, %supplied, %derived, "template phase disagrees with day, using derived phase");
            derived
        }
        _ => derived,
    };

    let title = obj
        .get("title")
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
        .map_or_else(|| default_title(day), str::to_owned);

    Some(DayBlock {
        day,
        phase,
        title,
        module_ids: string_array(obj.get("moduleIds")),
        box_items: string_array(obj.get("boxItems")),
    })
}

/// Accepts numbers and numeric strings; truncates fractions and clamps to
/// the plan range. Non-finite values are rejected.
fn clamp_day(value: &Value) -> Option<u8> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !n.is_finite() {
        return None;
    }
    Some(n.trunc().clamp(0.0, f64::from(LAST_DAY)) as u8)
}

fn string_array(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect(),
        _ => Vec::new(),
    }
}

fn default_title(day: u8) -> String {
    format!("Day {day}")
}

fn default_day(day: u8) -> DayBlock {
    let phase = Phase::for_day(day);
    let (module_ids, box_items): (Vec<String>, Vec<String>) = if phase == Phase::Early {
        (
            STARTER_MODULE_IDS.iter().map(|s| s.to_string()).collect(),
            STARTER_BOX_ITEMS.iter().map(|s| s.to_string()).collect(),
        )
    } else {
        (Vec::new(), Vec::new())
    };
    DayBlock {
        day,
        phase,
        title: default_title(day),
        module_ids,
        box_items,
    }
}
