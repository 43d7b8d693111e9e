//! Loading input documents and writing plan output.
//!
//! Inputs are JSON, or TOML when the file extension is `.toml`. Either way
//! they are handed to the engine as untyped JSON values.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use recovery_core::GeneratedPlan;
use recovery_core::library::builtin_template;
use recovery_core::template::PlanTemplate;

/// Read a JSON or TOML document from disk.
pub fn load_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_document(path, &content)
}

/// Parse `content` according to the extension of `path`.
pub fn parse_document(path: &Path, content: &str) -> Result<Value> {
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        toml::from_str(content).with_context(|| format!("failed to parse TOML in {}", path.display()))
    } else {
        serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON in {}", path.display()))
    }
}

/// Load a stored template, or the built-in one when no path is given.
pub fn load_template(path: Option<&Path>) -> Result<PlanTemplate> {
    match path {
        Some(path) => {
            let raw = load_document(path)?;
            PlanTemplate::from_value(raw)
                .with_context(|| format!("invalid template in {}", path.display()))
        }
        None => Ok(builtin_template()),
    }
}

/// Render a plan as JSON.
pub fn render_plan(plan: &GeneratedPlan, compact: bool) -> Result<String> {
    let mut out = if compact {
        serde_json::to_string(plan)
    } else {
        serde_json::to_string_pretty(plan)
    }
    .context("failed to serialize plan")?;
    out.push('\n');
    Ok(out)
}

/// Write `content` to `path`, or to stdout when no path is given.
pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("failed to write to {}", path.display())),
        None => {
            print!("{content}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_by_default() {
        let value = parse_document(Path::new("policy.json"), r#"{"maxModulesPerDay": 4}"#).unwrap();
        assert_eq!(value["maxModulesPerDay"], 4);
    }

    #[test]
    fn parses_toml_by_extension() {
        let value = parse_document(
            Path::new("policy.TOML"),
            "maxModulesPerDay = 4\nforbiddenModuleIds = [\"track_sleep\"]\n",
        )
        .unwrap();
        assert_eq!(value["maxModulesPerDay"], 4);
        assert_eq!(value["forbiddenModuleIds"][0], "track_sleep");
    }

    #[test]
    fn parse_error_names_the_file() {
        let err = parse_document(Path::new("config.json"), "{not json").unwrap_err();
        assert!(
            err.to_string().contains("config.json"),
            "expected file name in error, got: {err}"
        );
    }

    #[test]
    fn missing_template_path_uses_builtin() {
        let template = load_template(None).unwrap();
        assert_eq!(template, builtin_template());
    }
}
