mod schema;

pub use schema::Config;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Get the config directory path (~/.config/scorekeep/)
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("scorekeep")
}

/// Get the default config file path (~/.config/scorekeep/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path (~/.config/scorekeep/config.yaml)
///
/// A missing file yields the default configuration.
///
/// # Errors
///
/// Returns an error if:
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        log::debug!(
            "No config file at {}, using defaults",
            config_path.display()
        );
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!(
            "Failed to parse config: invalid YAML in {}",
            config_path.display()
        )
    })?;

    Ok(config)
}

/// Validate configuration values at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for (key, value) in [
        ("autosave_delay", &config.autosave_delay),
        ("flash_duration", &config.flash_duration),
    ] {
        let Some(value) = value else {
            continue;
        };
        match humantime::parse_duration(value.trim()) {
            Ok(d) if key == "autosave_delay" && d == Duration::ZERO => {
                errors.push("autosave_delay: must be greater than zero".to_string());
            }
            Ok(_) => {}
            Err(e) => errors.push(format!("{}: invalid duration '{}' - {}", key, value, e)),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Resolve the catalog file location.
pub fn catalog_path(config: &Config, config_dir: &Path) -> PathBuf {
    config
        .catalog
        .as_deref()
        .map(expand_tilde)
        .unwrap_or_else(|| config_dir.join("catalog.yaml"))
}

/// Resolve the directory holding judges' score sheets.
pub fn scores_dir(config: &Config, config_dir: &Path) -> PathBuf {
    config
        .data_dir
        .as_deref()
        .map(expand_tilde)
        .unwrap_or_else(|| config_dir.join("data"))
        .join("scores")
}
