//! Configuration file management for recovery-plan.
//!
//! Provides a TOML-based config file at `~/.config/recovery-plan/config.toml`
//! and a resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use recovery_core::library::DEFAULT_CATEGORY;

pub const TEMPLATE_ENV: &str = "RECOVERY_PLAN_TEMPLATE";
pub const CATEGORY_ENV: &str = "RECOVERY_PLAN_CATEGORY";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub defaults: DefaultsSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DefaultsSection {
    /// Stored template used instead of the built-in one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,
    /// Category recorded in generated plan metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the recovery-plan config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/recovery-plan` or
/// `~/.config/recovery-plan`, on every platform.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("recovery-plan");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("recovery-plan")
}

/// Return the path to the config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file at `path`.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved settings
// -----------------------------------------------------------------------

/// Values supplied on the command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct CliOverrides<'a> {
    pub template: Option<&'a Path>,
    pub category: Option<&'a str>,
}

/// Fully resolved settings, ready for use.
#[derive(Debug, PartialEq, Eq)]
pub struct Settings {
    /// `None` means the built-in template.
    pub template: Option<PathBuf>,
    pub category: String,
}

impl Settings {
    /// Resolve settings from the process environment and the config file.
    ///
    /// A missing config file is not an error; a malformed one is.
    pub fn resolve(cli: CliOverrides<'_>) -> Result<Self> {
        let path = config_path();
        let file = if path.exists() {
            Some(load_config(&path)?)
        } else {
            None
        };
        Ok(Self::resolve_with(cli, |key| std::env::var(key).ok(), file.as_ref()))
    }

    /// Resolve using the chain: CLI flag > env var > config file > default.
    ///
    /// - Template: `--template` > `RECOVERY_PLAN_TEMPLATE` > `defaults.template` > built-in
    /// - Category: `--category` > `RECOVERY_PLAN_CATEGORY` > `defaults.category` > `general_post_surgical`
    pub fn resolve_with(
        cli: CliOverrides<'_>,
        env: impl Fn(&str) -> Option<String>,
        file: Option<&ConfigFile>,
    ) -> Self {
        let non_blank = |v: String| (!v.trim().is_empty()).then_some(v);

        let template = if let Some(path) = cli.template {
            Some(path.to_path_buf())
        } else if let Some(path) = env(TEMPLATE_ENV).and_then(non_blank) {
            Some(PathBuf::from(path))
        } else {
            file.and_then(|f| f.defaults.template.clone())
        };

        let category = if let Some(category) = cli.category {
            category.to_owned()
        } else if let Some(category) = env(CATEGORY_ENV).and_then(non_blank) {
            category
        } else if let Some(category) = file.and_then(|f| f.defaults.category.clone()) {
            category
        } else {
            DEFAULT_CATEGORY.to_owned()
        };

        Self { template, category }
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
