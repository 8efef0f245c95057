//! Engine configuration, from environment variables or a host-supplied JSON object.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use serde::Deserialize;

use crate::consts::{CANVAS_WIDTH, MIN_CANVAS_HEIGHT, STICKER_TILT_DEG, Z_FLOOR};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct EngineConfig {
    pub canvas_width: f64,
    pub min_canvas_height: f64,
    pub z_floor: i64,
    /// Maximum absolute tilt of new stickers; `0` spawns them upright.
    pub sticker_tilt_deg: f64,
    pub read_only: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canvas_width: CANVAS_WIDTH,
            min_canvas_height: MIN_CANVAS_HEIGHT,
            z_floor: Z_FLOOR,
            sticker_tilt_deg: STICKER_TILT_DEG,
            read_only: false,
        }
    }
}

impl EngineConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `SCRAPBOOK_CANVAS_WIDTH`: default 800
    /// - `SCRAPBOOK_MIN_CANVAS_HEIGHT`: default 1000
    /// - `SCRAPBOOK_Z_FLOOR`: default 10
    /// - `SCRAPBOOK_STICKER_TILT_DEG`: default 10
    /// - `SCRAPBOOK_READ_ONLY`: `true` / `false` (default)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a variable is set but does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            canvas_width: env_parse("SCRAPBOOK_CANVAS_WIDTH", defaults.canvas_width)?,
            min_canvas_height: env_parse("SCRAPBOOK_MIN_CANVAS_HEIGHT", defaults.min_canvas_height)?,
            z_floor: env_parse("SCRAPBOOK_Z_FLOOR", defaults.z_floor)?,
            sticker_tilt_deg: env_parse("SCRAPBOOK_STICKER_TILT_DEG", defaults.sticker_tilt_deg)?,
            read_only: env_parse("SCRAPBOOK_READ_ONLY", defaults.read_only)?,
        };
        config.validate()
    }

    /// Parse a camelCase JSON object; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed JSON or unknown keys, and
    /// [`ConfigError::InvalidValue`] for out-of-range values.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if !(self.canvas_width.is_finite() && self.canvas_width > 0.0) {
            return Err(invalid("canvas_width", self.canvas_width));
        }
        if !(self.min_canvas_height.is_finite() && self.min_canvas_height >= 0.0) {
            return Err(invalid("min_canvas_height", self.min_canvas_height));
        }
        if !(self.sticker_tilt_deg.is_finite() && self.sticker_tilt_deg >= 0.0) {
            return Err(invalid("sticker_tilt_deg", self.sticker_tilt_deg));
        }
        Ok(self)
    }
}

fn invalid(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue { key: key.into(), value: value.to_string() }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { key: key.into(), value: raw.clone() }),
        Err(_) => Ok(default),
    }
}
