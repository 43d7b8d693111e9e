//! End-to-end tests for the plan generation pipeline.
//!
//! Covers the engine's contract: determinism, completeness, closure,
//! forbidden-wins precedence, per-day caps, and fail-open enforcement.

use serde_json::json;

use recovery_core::fingerprint::plan_fingerprint;
use recovery_core::model::{LAST_DAY, PLAN_DAYS, Phase};
use recovery_core::overrides::AuditEventKind;
use recovery_test_utils::{
    days_with, generate_builtin, generate_with, ids_on, leg_surgery_config, messy_template,
    quiet_config,
};

fn range(from: u8, to: u8) -> Vec<u8> {
    (from..=to).collect()
}

// -----------------------------------------------------------------------
// Worked examples
// -----------------------------------------------------------------------

#[test]
fn leg_surgery_example_schedules_expected_modules() {
    let plan = generate_builtin(&leg_surgery_config(), None);

    assert_eq!(days_with(&plan, "track_swelling"), range(0, LAST_DAY));
    assert_eq!(days_with(&plan, "rf_infection"), range(0, 10));
    assert_eq!(days_with(&plan, "rf_worsening"), range(0, 10));
    assert_eq!(days_with(&plan, "edu_follow_up"), vec![5, 6]);
    assert_eq!(days_with(&plan, "edu_mobility"), range(4, 10));

    assert_eq!(
        plan.meta.applied_rules,
        vec![
            "global_sleep_tracking",
            "region_swelling_all_days",
            "incision_wound_education",
            "incision_infection_early",
            "incision_infection_mid",
            "mobility_education_mid",
            "discomfort_escalating_worsening",
            "follow_up_7_days",
        ]
    );
}

#[test]
fn forbidden_and_required_same_id_is_absent_everywhere() {
    let policy = json!({
        "forbiddenModuleIds": ["track_swelling"],
        "requiredModuleIds": ["track_swelling"]
    });
    let plan = generate_builtin(&leg_surgery_config(), Some(&policy));

    assert!(days_with(&plan, "track_swelling").is_empty());
    assert!(
        plan.days
            .iter()
            .all(|d| d.modules_resolved.iter().all(|m| m.id != "track_swelling"))
    );
}

#[test]
fn cap_keeps_first_ids_and_records_removed_ones() {
    let base = generate_builtin(&leg_surgery_config(), None);
    assert_eq!(
        ids_on(&base, 14),
        vec![
            "checkin_overall",
            "track_pain",
            "milestone_two_weeks",
            "track_sleep",
            "track_swelling"
        ],
        "day 14 resolves to five modules before the cap"
    );

    let plan = generate_builtin(&leg_surgery_config(), Some(&json!({"maxModulesPerDay": 2})));
    assert_eq!(ids_on(&plan, 14), vec!["checkin_overall", "track_pain"]);

    let trims: Vec<_> = plan
        .meta
        .clinic_audit_events
        .iter()
        .filter(|e| e.kind == AuditEventKind::ClinicCapTrimmed && e.day == Some(14))
        .collect();
    assert_eq!(trims.len(), 1);
    assert_eq!(
        trims[0].module_ids,
        vec!["milestone_two_weeks", "track_sleep", "track_swelling"]
    );
}

// -----------------------------------------------------------------------
// Properties
// -----------------------------------------------------------------------

#[test]
fn generation_is_byte_identical() {
    let policy = json!({
        "version": 4,
        "requiredByPhase": {"late": ["edu_long_term"]},
        "forbiddenModuleIds": ["track_sleep"],
        "maxModulesPerDay": 5
    });
    let a = generate_builtin(&leg_surgery_config(), Some(&policy));
    let b = generate_builtin(&leg_surgery_config(), Some(&policy));

    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
    assert_eq!(plan_fingerprint(&a).unwrap(), plan_fingerprint(&b).unwrap());
}

#[test]
fn concurrent_generation_agrees() {
    let expected = serde_json::to_string(&generate_builtin(&leg_surgery_config(), None)).unwrap();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    serde_json::to_string(&generate_builtin(&leg_surgery_config(), None)).unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn every_plan_has_21_days_with_matching_phases() {
    for config in [leg_surgery_config(), quiet_config()] {
        let plan = generate_with(&messy_template(), &config, None);
        assert_eq!(plan.days.len(), PLAN_DAYS);
        for (i, block) in plan.day_blocks().enumerate() {
            assert_eq!(block.day as usize, i);
            let expected = match block.day {
                0..=3 => Phase::Early,
                4..=10 => Phase::Mid,
                _ => Phase::Late,
            };
            assert_eq!(block.phase, expected, "day {}", block.day);
        }
    }
}

#[test]
fn every_scheduled_id_resolves() {
    let policy = json!({"requiredModuleIds": ["not_in_library", "edu_mobility"]});
    let plan = generate_with(&messy_template(), &leg_surgery_config(), Some(&policy));
    for day in &plan.days {
        for id in &day.block.module_ids {
            assert!(plan.modules.contains_key(id), "day {} has dangling {id}", day.block.day);
        }
        assert_eq!(day.modules_resolved.len(), day.block.module_ids.len());
        let resolved: Vec<&str> = day.modules_resolved.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(resolved, day.block.module_ids);
    }
}

#[test]
fn module_ids_are_unique_per_day() {
    let plan = generate_with(&messy_template(), &leg_surgery_config(), None);
    for block in plan.day_blocks() {
        let mut ids = block.module_ids.clone();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), block.module_ids.len(), "duplicates on day {}", block.day);
    }
}

#[test]
fn cap_is_respected_on_every_day() {
    for cap in [1, 3, 50] {
        let policy = json!({"maxModulesPerDay": cap, "requiredModuleIds": ["edu_long_term"]});
        let plan = generate_builtin(&leg_surgery_config(), Some(&policy));
        assert!(
            plan.day_blocks().all(|b| b.module_ids.len() <= cap),
            "cap {cap} exceeded"
        );
    }
}

#[test]
fn forbidden_wins_for_every_requirement_source() {
    let policy = json!({
        "forbiddenModuleIds": ["edu_follow_up", "milestone_first_week"],
        "requiredModuleIds": ["edu_follow_up"],
        "requiredByPhase": {"early": ["milestone_first_week"], "mid": ["edu_follow_up"]},
        "requiredByDay": {"7": ["milestone_first_week"]}
    });
    let plan = generate_builtin(&leg_surgery_config(), Some(&policy));
    assert!(days_with(&plan, "edu_follow_up").is_empty());
    assert!(days_with(&plan, "milestone_first_week").is_empty());
}

#[test]
fn absent_empty_and_invalid_policies_leave_days_untouched() {
    let base = generate_builtin(&leg_surgery_config(), None);
    let empty = generate_builtin(&leg_surgery_config(), Some(&json!({})));
    let null = generate_builtin(&leg_surgery_config(), Some(&serde_json::Value::Null));
    let invalid = generate_builtin(
        &leg_surgery_config(),
        Some(&json!({"forbiddenModuleIds": "track_pain", "maxModulesPerDay": 99})),
    );

    assert_eq!(base.days, empty.days);
    assert_eq!(base.days, null.days);
    assert_eq!(base.days, invalid.days);
    assert_eq!(base.meta.applied_rules, invalid.meta.applied_rules);

    assert!(empty.meta.clinic_audit_events.is_empty());
    assert_eq!(invalid.meta.clinic_audit_events.len(), 1);
    assert_eq!(
        invalid.meta.clinic_audit_events[0].kind,
        AuditEventKind::ClinicPolicyInvalid
    );
    assert_eq!(invalid.meta.clinic_overrides.version, None);
}

#[test]
fn messy_template_is_repaired() {
    let plan = generate_with(&messy_template(), &quiet_config(), None);

    // Day 2 had an invalid phase and an unknown id.
    let day2 = &plan.days[2].block;
    assert_eq!(day2.phase, Phase::Early);
    assert!(!day2.contains("unknown_module"));
    assert_eq!(day2.module_ids[0], "track_pain");

    // Day 30 was clamped onto day 20 and replaced the template's own day 20.
    assert_eq!(plan.days[20].block.title, "Clamped to last day");
    assert!(!plan.days[20].block.contains("milestone_plan_complete"));

    // Duplicate day 9: the later entry wins.
    assert_eq!(plan.days[9].block.title, "Second nine");
    assert_eq!(plan.days[9].block.box_items, vec!["Walk to the mailbox"]);

    // Non-string id dropped; milestone kept.
    assert!(plan.days[14].block.contains("milestone_two_weeks"));
}

#[test]
fn regenerating_with_a_different_policy_changes_fingerprint() {
    let a = generate_builtin(&leg_surgery_config(), None);
    let b = generate_builtin(
        &leg_surgery_config(),
        Some(&json!({"forbiddenModuleIds": ["track_sleep"]})),
    );
    assert_ne!(plan_fingerprint(&a).unwrap(), plan_fingerprint(&b).unwrap());
}
