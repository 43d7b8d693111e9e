//! Rule resolver: maps a [`PlanConfiguration`] onto per-day module
//! additions.
//!
//! Rules fire in a fixed order and each firing appends a token to the
//! applied-rule trace. Activation depends on the configuration alone.

pub mod schedule;

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, warn};

use crate::config::{
    DiscomfortPattern, FollowUpExpectation, IncisionStatus, MobilityImpact, PlanConfiguration,
    RecoveryDuration, RecoveryRegion,
};
use crate::library::ids;
use crate::model::{DayBlock, ModuleDefinition};

pub use schedule::Schedule;
use schedule::{EARLY, EARLY_AND_MID, LATE, MID};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One fired rule: a trace token and the module it places.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleActivation {
    /// Token recorded in `meta.appliedRules`.
    pub token: &'static str,
    pub module_id: &'static str,
    pub schedule: Schedule,
}

impl RuleActivation {
    const fn new(token: &'static str, module_id: &'static str, schedule: Schedule) -> Self {
        Self {
            token,
            module_id,
            schedule,
        }
    }
}

/// The plan after rule resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuledPlan {
    pub days: Vec<DayBlock>,
    /// Ordered, deduplicated rule tokens.
    pub applied_rules: Vec<String>,
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

fn global_rule() -> RuleActivation {
    RuleActivation::new("global_sleep_tracking", ids::TRACK_SLEEP, Schedule::EveryDay)
}

fn region_rule(region: RecoveryRegion) -> Option<RuleActivation> {
    match region {
        RecoveryRegion::LegFoot | RecoveryRegion::FaceNeck => Some(RuleActivation::new(
            "region_swelling_all_days",
            ids::TRACK_SWELLING,
            Schedule::EveryDay,
        )),
        RecoveryRegion::ArmHand | RecoveryRegion::Torso => Some(RuleActivation::new(
            "region_swelling_early",
            ids::TRACK_SWELLING,
            Schedule::Phases(EARLY),
        )),
        RecoveryRegion::Other => None,
    }
}

fn incision_rules(status: IncisionStatus) -> Vec<RuleActivation> {
    let mut fired = vec![
        RuleActivation::new(
            "incision_wound_education",
            ids::EDU_WOUND_CARE,
            Schedule::Phases(EARLY_AND_MID),
        ),
        RuleActivation::new(
            "incision_infection_early",
            ids::RF_INFECTION,
            Schedule::Phases(EARLY),
        ),
    ];
    if matches!(
        status,
        IncisionStatus::OpenWound | IncisionStatus::DrainsPresent
    ) {
        fired.push(RuleActivation::new(
            "incision_infection_mid",
            ids::RF_INFECTION,
            Schedule::Phases(MID),
        ));
    }
    fired
}

fn mobility_rule(impact: MobilityImpact) -> Option<RuleActivation> {
    match impact {
        MobilityImpact::Limited | MobilityImpact::NonWeightBearing => Some(RuleActivation::new(
            "mobility_education_mid",
            ids::EDU_MOBILITY,
            Schedule::Phases(MID),
        )),
        MobilityImpact::NoRestriction => None,
    }
}

fn discomfort_rule(pattern: DiscomfortPattern) -> Option<RuleActivation> {
    (pattern == DiscomfortPattern::Escalating).then(|| {
        RuleActivation::new(
            "discomfort_escalating_worsening",
            ids::RF_WORSENING,
            Schedule::Phases(EARLY_AND_MID),
        )
    })
}

const FOLLOW_UP_7_DAYS: &[u8] = &[5, 6];
const FOLLOW_UP_14_DAYS: &[u8] = &[12, 13];
const FOLLOW_UP_30_DAYS: &[u8] = &[19, 20];

fn follow_up_rule(expectation: FollowUpExpectation) -> Option<RuleActivation> {
    let (token, days) = match expectation {
        FollowUpExpectation::Within7Days => ("follow_up_7_days", FOLLOW_UP_7_DAYS),
        FollowUpExpectation::Within14Days => ("follow_up_14_days", FOLLOW_UP_14_DAYS),
        FollowUpExpectation::Within30Days => ("follow_up_30_days", FOLLOW_UP_30_DAYS),
        FollowUpExpectation::NotScheduled => return None,
    };
    Some(RuleActivation::new(
        token,
        ids::EDU_FOLLOW_UP,
        Schedule::Days(days),
    ))
}

fn duration_rule(duration: RecoveryDuration) -> Option<RuleActivation> {
    (duration == RecoveryDuration::Extended).then(|| {
        RuleActivation::new(
            "duration_extended_long_term",
            ids::EDU_LONG_TERM,
            Schedule::Phases(LATE),
        )
    })
}

/// Every rule that fires for `config`, in application order.
pub fn activations(config: &PlanConfiguration) -> Vec<RuleActivation> {
    let mut fired = vec![global_rule()];
    fired.extend(region_rule(config.recovery_region));
    fired.extend(incision_rules(config.incision_status));
    fired.extend(mobility_rule(config.mobility_impact));
    fired.extend(discomfort_rule(config.discomfort_pattern));
    fired.extend(follow_up_rule(config.follow_up_expectation));
    fired.extend(duration_rule(config.recovery_duration));
    fired
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Apply every fired rule to a copy of `skeleton`.
///
/// Afterwards each day's module ids are deduplicated (first occurrence
/// kept) and ids missing from `modules` are dropped.
pub fn apply_rules(
    skeleton: &[DayBlock],
    modules: &BTreeMap<String, ModuleDefinition>,
    config: &PlanConfiguration,
) -> RuledPlan {
    let mut days = skeleton.to_vec();
    let mut applied_rules = Vec::new();

    for rule in activations(config) {
        debug!(rule = rule.token, module_id = rule.module_id, "rule fired");
        applied_rules.push(rule.token.to_owned());
        for block in days.iter_mut().filter(|b| rule.schedule.applies_to(b)) {
            block.module_ids.push(rule.module_id.to_owned());
        }
    }

    for block in &mut days {
        block.module_ids = finalize_ids(block.day, &block.module_ids, modules);
    }

    RuledPlan {
        days,
        applied_rules: dedup_preserving_order(applied_rules),
    }
}

fn finalize_ids(
    day: u8,
    module_ids: &[String],
    modules: &BTreeMap<String, ModuleDefinition>,
) -> Vec<String> {
    let mut seen = HashSet::new();
    module_ids
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .filter(|id| {
            let known = modules.contains_key(id.as_str());
            if !known {
                warn!(day, module_id = %id, "unknown module ignored");
            }
            known
        })
        .cloned()
        .collect()
}

fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
