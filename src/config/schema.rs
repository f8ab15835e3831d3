use crate::autosave::DEFAULT_AUTOSAVE_DELAY;
use crate::session::DEFAULT_FLASH_DURATION;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Catalog YAML file. Defaults to `catalog.yaml` in the config directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,
    /// Directory for judges' score sheets. Defaults to `data/` in the config directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Debounce before an edit is written, e.g. "1s" or "750ms".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autosave_delay: Option<String>,
    /// How long a save message stays on screen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flash_duration: Option<String>,
}

impl Config {
    pub fn autosave_delay(&self) -> Duration {
        parse_or(self.autosave_delay.as_deref(), DEFAULT_AUTOSAVE_DELAY)
    }

    pub fn flash_duration(&self) -> Duration {
        parse_or(self.flash_duration.as_deref(), DEFAULT_FLASH_DURATION)
    }
}

/// Invalid values fall back to the default; `validate_config` reports them.
fn parse_or(value: Option<&str>, default: Duration) -> Duration {
    value
        .and_then(|v| humantime::parse_duration(v.trim()).ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.autosave_delay(), Duration::from_millis(1000));
        assert_eq!(config.flash_duration(), Duration::from_secs(3));
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
catalog: ~/events/catalog.yaml
data_dir: /var/lib/scorekeep
autosave_delay: 750ms
flash_duration: 5s
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.catalog.as_deref(), Some("~/events/catalog.yaml"));
        assert_eq!(config.data_dir.as_deref(), Some("/var/lib/scorekeep"));
        assert_eq!(config.autosave_delay(), Duration::from_millis(750));
        assert_eq!(config.flash_duration(), Duration::from_secs(5));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<Config, _> = serde_saphyr::from_str("autosave: 1s\n");
        assert!(result.is_err());
    }
}
