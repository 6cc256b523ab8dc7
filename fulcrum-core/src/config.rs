//! User configuration at `~/.config/fulcrum/config.toml`.

use std::path::{Path, PathBuf};

use chrono::Duration;
use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_REPEAT_INTERVAL_DAYS, DEFAULT_TIMEZONE, MAX_REPEAT_INTERVAL_DAYS};
use crate::error::{FulcrumError, FulcrumResult};

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_repeat_interval_days() -> i64 {
    DEFAULT_REPEAT_INTERVAL_DAYS
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FulcrumConfig {
    /// IANA zone that form timestamps are local to.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Spacing of repeats before the user has laid down a pattern.
    #[serde(default = "default_repeat_interval_days")]
    pub repeat_interval_days: i64,
}

impl Default for FulcrumConfig {
    fn default() -> Self {
        FulcrumConfig {
            timezone: default_timezone(),
            repeat_interval_days: default_repeat_interval_days(),
        }
    }
}

impl FulcrumConfig {
    pub fn config_path() -> FulcrumResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| FulcrumError::Config("Could not determine config directory".into()))?
            .join("fulcrum");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default path, creating a commented template on first use.
    pub fn load() -> FulcrumResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from `path` (optional), then `FULCRUM_*` environment variables.
    pub fn load_from(path: &Path) -> FulcrumResult<Self> {
        let config: FulcrumConfig = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("FULCRUM"))
            .build()
            .map_err(|e| FulcrumError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| FulcrumError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FulcrumResult<()> {
        self.tz()?;
        let days = self.repeat_interval_days;
        if days == 0 || days.unsigned_abs() > MAX_REPEAT_INTERVAL_DAYS.unsigned_abs() {
            return Err(FulcrumError::Config(format!(
                "repeat_interval_days must be non-zero and within ±{MAX_REPEAT_INTERVAL_DAYS}, got {days}"
            )));
        }
        Ok(())
    }

    pub fn tz(&self) -> FulcrumResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| FulcrumError::UnknownTimezone(self.timezone.clone()))
    }

    /// Falls back to the default spacing if the value was never validated.
    pub fn repeat_interval(&self) -> Duration {
        Duration::try_days(self.repeat_interval_days)
            .unwrap_or_else(|| Duration::days(DEFAULT_REPEAT_INTERVAL_DAYS))
    }

    /// Save the current config to the default path.
    pub fn save(&self) -> FulcrumResult<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> FulcrumResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| FulcrumError::Config(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| FulcrumError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a config file with all options commented out.
    pub fn create_default_config(path: &Path) -> FulcrumResult<()> {
        let contents = format!(
            "\
# fulcrum configuration

# Timezone that event times are entered in:
# timezone = \"{}\"

# Days between repeats until a pattern is set:
# repeat_interval_days = {}
",
            DEFAULT_TIMEZONE, DEFAULT_REPEAT_INTERVAL_DAYS
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                FulcrumError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| FulcrumError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fulcrum-config-{}-{}", name, uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn default_template_loads_as_defaults() {
        let path = scratch_dir("template").join("nested").join("config.toml");
        FulcrumConfig::create_default_config(&path).unwrap();

        let config = FulcrumConfig::load_from(&path).unwrap();

        assert_eq!(config, FulcrumConfig::default());
        assert_eq!(config.tz().unwrap(), chrono_tz::Europe::London);
    }

    #[test]
    fn values_from_file_override_defaults() {
        let path = scratch_dir("values").join("config.toml");
        std::fs::write(&path, "timezone = \"America/New_York\"\nrepeat_interval_days = 14\n").unwrap();

        let config = FulcrumConfig::load_from(&path).unwrap();

        assert_eq!(config.tz().unwrap(), chrono_tz::America::New_York);
        assert_eq!(config.repeat_interval(), Duration::days(14));
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let path = scratch_dir("tz").join("config.toml");
        std::fs::write(&path, "timezone = \"Mars/Olympus\"\n").unwrap();

        let err = FulcrumConfig::load_from(&path).unwrap_err();

        assert!(matches!(err, FulcrumError::UnknownTimezone(_)), "got {err}");
    }

    #[test]
    fn out_of_range_interval_is_rejected() {
        let path = scratch_dir("interval").join("config.toml");
        std::fs::write(&path, "repeat_interval_days = 100000000\n").unwrap();

        let err = FulcrumConfig::load_from(&path).unwrap_err();

        assert!(matches!(err, FulcrumError::Config(_)), "got {err}");
    }

    #[test]
    fn unvalidated_interval_does_not_panic() {
        let config = FulcrumConfig {
            repeat_interval_days: i64::MAX,
            ..FulcrumConfig::default()
        };

        assert!(config.validate().is_err());
        assert_eq!(config.repeat_interval(), Duration::days(DEFAULT_REPEAT_INTERVAL_DAYS));
    }

    #[test]
    fn saved_config_loads_back() {
        let path = scratch_dir("save").join("config.toml");
        let config = FulcrumConfig {
            timezone: "Europe/Dublin".into(),
            repeat_interval_days: 1,
        };

        config.save_to(&path).unwrap();

        assert_eq!(FulcrumConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let path = scratch_dir("missing").join("config.toml");
        assert_eq!(FulcrumConfig::load_from(&path).unwrap(), FulcrumConfig::default());
    }
}
