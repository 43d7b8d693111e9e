//! Scheduling strategies: which days of a plan a module lands on.

use crate::model::{DayBlock, Phase};

/// A closed set of placement strategies. Each variant maps to a pure
/// function of the day block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Every day of the plan.
    EveryDay,
    /// Every day whose phase is listed.
    Phases(&'static [Phase]),
    /// Exactly the listed day indices.
    Days(&'static [u8]),
}

impl Schedule {
    pub fn applies_to(self, block: &DayBlock) -> bool {
        match self {
            Self::EveryDay => true,
            Self::Phases(phases) => phases.contains(&block.phase),
            Self::Days(days) => days.contains(&block.day),
        }
    }
}

pub const EARLY: &[Phase] = &[Phase::Early];
pub const MID: &[Phase] = &[Phase::Mid];
pub const LATE: &[Phase] = &[Phase::Late];
pub const EARLY_AND_MID: &[Phase] = &[Phase::Early, Phase::Mid];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LAST_DAY;

    fn covered(schedule: Schedule) -> Vec<u8> {
        (0..=LAST_DAY)
            .filter(|&day| {
                schedule.applies_to(&DayBlock {
                    day,
                    phase: Phase::for_day(day),
                    title: format!("Day {day}"),
                    module_ids: vec![],
                    box_items: vec![],
                })
            })
            .collect()
    }

    #[test]
    fn phase_schedules_cover_expected_days() {
        assert_eq!(covered(Schedule::Phases(EARLY)), vec![0, 1, 2, 3]);
        assert_eq!(covered(Schedule::Phases(MID)), (4..=10).collect::<Vec<u8>>());
        assert_eq!(covered(Schedule::Phases(LATE)).len(), 10);
        assert_eq!(covered(Schedule::Phases(EARLY_AND_MID)), (0..=10).collect::<Vec<u8>>());
        assert_eq!(covered(Schedule::EveryDay).len(), 21);
    }

    #[test]
    fn day_schedule_ignores_out_of_range() {
        assert_eq!(covered(Schedule::Days(&[20, 5, 5, 30])), vec![5, 20]);
    }

    #[test]
    fn applies_to_matches_days() {
        let block = DayBlock {
            day: 6,
            phase: Phase::Mid,
            title: "Day 6".to_owned(),
            module_ids: vec![],
            box_items: vec![],
        };
        assert!(Schedule::Phases(MID).applies_to(&block));
        assert!(!Schedule::Phases(EARLY).applies_to(&block));
        assert!(Schedule::Days(&[5, 6]).applies_to(&block));
        assert!(Schedule::EveryDay.applies_to(&block));
    }
}
