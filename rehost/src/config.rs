use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

use crate::hotkey::{parse_key, KeyCode};

pub const DEFAULT_RESTART_KEY: &str = "R";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Root configuration structure, deserialized from TOML.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    /// Key that, held with Ctrl+Shift+Alt, forces a return to the main menu.
    #[serde(default = "default_restart_key")]
    pub restart_key: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            restart_key: DEFAULT_RESTART_KEY.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. "info" or "rehost=debug".
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Resolves the configured restart key, falling back to the default
    /// when the name is not a recognised key.
    pub fn restart_key(&self) -> KeyCode {
        parse_key(&self.general.restart_key).unwrap_or_else(|| {
            warn!(
                "unknown restart_key {:?}; using {DEFAULT_RESTART_KEY}",
                self.general.restart_key
            );
            KeyCode::R
        })
    }
}

/// Loads the config file at `path`, returning `Config::default()` if the file does not exist.
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn default_restart_key() -> String {
    DEFAULT_RESTART_KEY.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn default_restart_key_is_r() {
        let c = Config::default();
        assert_eq!(c.general.restart_key, "R");
        assert_eq!(c.restart_key(), KeyCode(0x52));
        assert_eq!(c.logging.level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn default_key_name_parses_to_fallback_code() {
        assert_eq!(parse_key(DEFAULT_RESTART_KEY), Some(KeyCode::R));
    }

    #[test]
    fn unknown_key_name_falls_back_to_r() {
        let mut c = Config::default();
        c.general.restart_key = "Hyper".to_string();
        assert_eq!(c.restart_key(), KeyCode(0x52));
    }

    #[test]
    fn restart_key_accepts_function_keys() {
        let mut c = Config::default();
        c.general.restart_key = "f5".to_string();
        assert_eq!(c.restart_key(), KeyCode(0x74));
    }

    // ── load_or_default ───────────────────────────────────────────────────────

    #[test]
    fn load_or_default_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nonexistent.toml");
        let config = load_or_default(&path).unwrap();
        assert_eq!(config.general.restart_key, DEFAULT_RESTART_KEY);
    }

    #[test]
    fn load_or_default_parses_valid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rehost.toml");
        std::fs::write(
            &path,
            r#"
[general]
restart_key = "K"

[logging]
level = "rehost=debug"
"#,
        )
        .unwrap();

        let config = load_or_default(&path).unwrap();
        assert_eq!(config.general.restart_key, "K");
        assert_eq!(config.restart_key(), KeyCode(0x4B));
        assert_eq!(config.logging.level, "rehost=debug");
    }

    #[test]
    fn load_or_default_partial_toml_uses_field_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rehost.toml");
        std::fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();

        let config = load_or_default(&path).unwrap();
        assert_eq!(config.general.restart_key, DEFAULT_RESTART_KEY);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn load_or_default_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rehost.toml");
        std::fs::write(&path, "this is not valid toml ][[[").unwrap();
        let err = load_or_default(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
