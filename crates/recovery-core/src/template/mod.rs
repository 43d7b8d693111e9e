//! Stored plan templates and the normalizer that turns them into a
//! 21-day skeleton.
//!
//! The template envelope (`title`, `disclaimer`, `modules`, `days`) must be
//! well formed; individual day entries may be sparse, out of order, or
//! malformed and are repaired by [`normalize_days`].

pub mod normalize;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigurationError;
use crate::model::ModuleDefinition;

pub use normalize::{STARTER_BOX_ITEMS, STARTER_MODULE_IDS, normalize_days};

/// A stored template as supplied by the lookup collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanTemplate {
    pub title: String,
    pub disclaimer: String,
    /// Module dictionary keyed by module id.
    pub modules: BTreeMap<String, ModuleDefinition>,
    /// Raw day entries; shape is checked per entry by the normalizer.
    pub days: Vec<Value>,
}

impl PlanTemplate {
    /// Deserialize and validate a template from an untyped document.
    pub fn from_value(raw: Value) -> Result<Self, ConfigurationError> {
        let template: PlanTemplate = serde_json::from_value(raw)?;
        template.validate()?;
        Ok(template)
    }

    /// Check the envelope invariants the pipeline relies on.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.title.trim().is_empty() {
            return Err(ConfigurationError::BlankTitle);
        }
        if self.modules.is_empty() {
            return Err(ConfigurationError::NoModules);
        }
        for (key, module) in &self.modules {
            if key != &module.id {
                return Err(ConfigurationError::ModuleIdMismatch {
                    key: key.clone(),
                    id: module.id.clone(),
                });
            }
        }
        Ok(())
    }
}
