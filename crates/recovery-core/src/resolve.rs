//! Module resolver: expands each day's final module ids into full
//! definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::{DayBlock, ModuleDefinition};

/// A day block with its modules resolved alongside the raw ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedDayBlock {
    #[serde(flatten)]
    pub block: DayBlock,
    pub modules_resolved: Vec<ModuleDefinition>,
}

/// Resolve every day's module ids, in order. Ids with no definition are
/// dropped from `modulesResolved` only; `moduleIds` is left as is.
pub fn resolve_modules(
    days: &[DayBlock],
    modules: &BTreeMap<String, ModuleDefinition>,
) -> Vec<ResolvedDayBlock> {
    days.iter()
        .map(|block| {
            let modules_resolved = block
                .module_ids
                .iter()
                .filter_map(|id| {
                    let module = modules.get(id);
                    if module.is_none() {
                        warn!(day = block.day, module_id = %id, "module id does not resolve");
                    }
                    module.cloned()
                })
                .collect();
            ResolvedDayBlock {
                block: block.clone(),
                modules_resolved,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::builtin_modules;
    use crate::model::Phase;

    fn block(ids: &[&str]) -> DayBlock {
        DayBlock {
            day: 0,
            phase: Phase::Early,
            title: "Day 0".to_owned(),
            module_ids: ids.iter().map(|s| s.to_string()).collect(),
            box_items: vec![],
        }
    }

    #[test]
    fn resolves_in_order() {
        let resolved = resolve_modules(&[block(&["track_sleep", "checkin_overall"])], &builtin_modules());
        let ids: Vec<&str> = resolved[0].modules_resolved.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["track_sleep", "checkin_overall"]);
        assert_eq!(resolved[0].block.module_ids, vec!["track_sleep", "checkin_overall"]);
    }

    #[test]
    fn unresolvable_ids_are_skipped_without_gaps() {
        let resolved = resolve_modules(&[block(&["ghost", "track_pain"])], &builtin_modules());
        assert_eq!(resolved[0].modules_resolved.len(), 1);
        assert_eq!(resolved[0].modules_resolved[0].id, "track_pain");
    }

    #[test]
    fn serializes_flat_with_both_representations() {
        let resolved = resolve_modules(&[block(&["track_pain"])], &builtin_modules());
        let value = serde_json::to_value(&resolved[0]).unwrap();
        assert_eq!(value["day"], 0);
        assert_eq!(value["moduleIds"][0], "track_pain");
        assert_eq!(value["modulesResolved"][0]["type"], "tracking");
    }
}
