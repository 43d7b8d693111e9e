//! Content fingerprints for generated plans.
//!
//! A fingerprint is the hex SHA-256 of the plan's canonical JSON (object
//! keys sorted, no whitespace). Regenerating from the same inputs must
//! reproduce it exactly.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::pipeline::GeneratedPlan;

/// Fingerprint a generated plan.
pub fn plan_fingerprint(plan: &GeneratedPlan) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(plan)?;
    Ok(value_fingerprint(&value))
}

/// Fingerprint an already-serialized plan document, e.g. one read back from
/// storage.
pub fn value_fingerprint(value: &Value) -> String {
    // Value's map is ordered, so its compact rendering is canonical.
    let canonical = value.to_string();
    hex::encode(Sha256::digest(canonical.as_bytes()))
}
