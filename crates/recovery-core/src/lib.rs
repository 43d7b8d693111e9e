//! Deterministic recovery plan engine.
//!
//! Turns a stored template, a six-field [`PlanConfiguration`] and an optional
//! clinic override policy into a 21-day [`GeneratedPlan`]. Every stage is a
//! pure function; see [`pipeline::generate_plan`] for the composition.

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod library;
pub mod model;
pub mod overrides;
pub mod pipeline;
pub mod resolve;
pub mod rules;
pub mod template;

pub use config::{ConfigValidationError, PlanConfiguration, parse_configuration};
pub use error::ConfigurationError;
pub use model::{DayBlock, ModuleDefinition, ModuleType, Phase, Severity};
pub use pipeline::{GeneratedPlan, PlanMeta, PlanRequest, generate_plan};
