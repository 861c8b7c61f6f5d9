//! Input-side configuration and the TOML override loader.

use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path:   String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path:   String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config value `{field}`: {reason}")]
    Invalid {
        field:  String,
        reason: String,
    },
}

/// Longest duration any setting may ask for.
pub const MAX_SECS: f32 = 3600.0;

/// Settings shared by the worker and both games.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Minimum confidence for a detection to count as a gesture.
    pub confidence_threshold: f32,
    /// Minimum spacing between two jump triggers, in seconds.
    pub cooldown_secs: f32,
    /// How long shutdown waits for the worker before abandoning it.
    pub shutdown_timeout_secs: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            confidence_threshold:  0.60,
            cooldown_secs:         0.5,
            shutdown_timeout_secs: 1.0,
        }
    }
}

impl InputConfig {
    pub fn cooldown(&self) -> Duration {
        secs(self.cooldown_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        secs(self.shutdown_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit("input.confidence_threshold", self.confidence_threshold as f64)?;
        check_secs("input.cooldown_secs", self.cooldown_secs)?;
        check_secs("input.shutdown_timeout_secs", self.shutdown_timeout_secs)
    }
}

/// Negative or NaN seconds collapse to zero; values too large for a
/// `Duration` saturate.
pub fn secs(s: f32) -> Duration {
    if s.is_nan() || s <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f32(s).unwrap_or(Duration::MAX)
}

fn invalid(field: &str, reason: String) -> ConfigError {
    ConfigError::Invalid { field: field.to_string(), reason }
}

/// A duration setting must be a number of seconds in `[0, MAX_SECS]`.
pub fn check_secs(field: &str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=MAX_SECS).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("{} is not between 0 and {} seconds", value, MAX_SECS)))
    }
}

/// Probabilities and confidences live in `[0, 1]`.
pub fn check_unit(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("{} is not between 0 and 1", value)))
    }
}

/// Tick rates must be at least 1.
pub fn check_fps(field: &str, value: u32) -> Result<(), ConfigError> {
    if value >= 1 {
        Ok(())
    } else {
        Err(invalid(field, "must be at least 1".to_string()))
    }
}

/// Sizes and speeds must be finite.
pub fn check_finite(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("{} is not a finite number", value)))
    }
}

/// Parse a TOML document; keys absent from it keep their `Default` values
/// as long as `T` is `#[serde(default)]`.
pub fn from_toml_str<T: DeserializeOwned>(text: &str, origin: &str) -> Result<T, ConfigError> {
    toml::from_str(text).map_err(|source| ConfigError::Parse { path: origin.to_string(), source })
}

/// Load `path` if it exists, otherwise return `T::default()`.
pub fn load_or_default<T>(path: &Path) -> Result<T, ConfigError>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        log::debug!("no config at {}, using defaults", path.display());
        return Ok(T::default());
    }
    let shown = path.display().to_string();
    let text = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: shown.clone(), source })?;
    log::info!("loaded config overrides from {}", shown);
    from_toml_str(&text, &shown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let c = InputConfig::default();
        assert_eq!(c.confidence_threshold, 0.60);
        assert_eq!(c.cooldown(), Duration::from_millis(500));
        assert_eq!(c.shutdown_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c: InputConfig = from_toml_str("cooldown_secs = 0.25", "inline").unwrap();
        assert_eq!(c.cooldown(), Duration::from_millis(250));
        assert_eq!(c.confidence_threshold, 0.60);
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let r: Result<InputConfig, _> = from_toml_str("cooldown_secs = \"soon\"", "inline");
        assert!(matches!(r, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn missing_file_gives_default() {
        let c: InputConfig = load_or_default(Path::new("/definitely/not/here.toml")).unwrap();
        assert_eq!(c, InputConfig::default());
    }

    #[test]
    fn negative_seconds_clamp_to_zero() {
        assert_eq!(secs(-1.0), Duration::ZERO);
        assert_eq!(secs(f32::NAN), Duration::ZERO);
    }

    #[test]
    fn oversized_seconds_saturate() {
        assert_eq!(secs(1e20), Duration::MAX);
        assert_eq!(secs(f32::INFINITY), Duration::MAX);
    }

    #[test]
    fn out_of_range_durations_are_rejected() {
        for text in [
            "cooldown_secs = 1e20",
            "cooldown_secs = -0.5",
            "cooldown_secs = nan",
            "shutdown_timeout_secs = inf",
        ] {
            let c: InputConfig = from_toml_str(text, "inline").unwrap();
            assert!(matches!(c.validate(), Err(ConfigError::Invalid { .. })), "{}", text);
        }
    }

    #[test]
    fn threshold_must_be_a_probability() {
        for text in ["confidence_threshold = 1.5", "confidence_threshold = nan"] {
            let c: InputConfig = from_toml_str(text, "inline").unwrap();
            let err = c.validate().unwrap_err();
            assert!(err.to_string().contains("input.confidence_threshold"), "{}", err);
        }
        assert!(InputConfig::default().validate().is_ok());
    }
}
