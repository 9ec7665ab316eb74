//! # Engine Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! file (or no file) yields a working 60 Hz engine on an 800x600 field.
//!
//! ```toml
//! tick_rate = 60
//! max_steps_per_frame = 5
//! event_capacity = 1024
//!
//! [field]
//! x = 0.0
//! y = 0.0
//! width = 800.0
//! height = 600.0
//!
//! [quadtree]
//! split_threshold = 1
//! max_depth = 5
//!
//! [world]
//! entity_capacity = 1024
//! fault_policy = "abort"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_FIELD_HEIGHT, DEFAULT_FIELD_WIDTH, EVENT_CAPACITY, MAX_STEPS_PER_FRAME,
    QUADTREE_MAX_DEPTH, QUADTREE_MAX_DEPTH_LIMIT, QUADTREE_SPLIT_THRESHOLD, TICK_RATE,
};

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`EngineConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// What the scheduler does when a system's executer fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// Stop the tick and return the error to the caller.
    #[default]
    Abort,
    /// Log the error, record it in the tick report and keep running.
    LogAndContinue,
}

/// Play-field rectangle in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: DEFAULT_FIELD_WIDTH,
            height: DEFAULT_FIELD_HEIGHT,
        }
    }
}

/// Broad-phase subdivision limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadTreeConfig {
    /// A node splits once it holds more boxes than this.
    pub split_threshold: usize,
    /// Nodes at this depth never split.
    pub max_depth: u32,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self {
            split_threshold: QUADTREE_SPLIT_THRESHOLD,
            max_depth: QUADTREE_MAX_DEPTH,
        }
    }
}

/// World sizing and fault handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Entity slots reserved up front. The world still grows past this.
    pub entity_capacity: usize,
    /// Scheduler behaviour on executer failure.
    pub fault_policy: FaultPolicy,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            entity_capacity: 1024,
            fault_policy: FaultPolicy::Abort,
        }
    }
}

/// Top-level engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed updates per second.
    pub tick_rate: u32,
    /// Cap on fixed updates per rendered frame.
    pub max_steps_per_frame: u32,
    /// Bounded capacity of the game event bus.
    pub event_capacity: usize,
    /// Play field.
    pub field: FieldConfig,
    /// Broad-phase limits.
    pub quadtree: QuadTreeConfig,
    /// World settings.
    pub world: WorldConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_rate: TICK_RATE,
            max_steps_per_frame: MAX_STEPS_PER_FRAME,
            event_capacity: EVENT_CAPACITY,
            field: FieldConfig::default(),
            quadtree: QuadTreeConfig::default(),
            world: WorldConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`EngineConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::Invalid("tick_rate must be positive".into()));
        }
        if self.max_steps_per_frame == 0 {
            return Err(ConfigError::Invalid(
                "max_steps_per_frame must be positive".into(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::Invalid("event_capacity must be positive".into()));
        }
        let field = &self.field;
        if !(field.x.is_finite() && field.y.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "field origin must be finite, got ({}, {})",
                field.x, field.y
            )));
        }
        if !(field.width.is_finite() && field.height.is_finite())
            || field.width <= 0.0
            || field.height <= 0.0
            || !(field.x + field.width).is_finite()
            || !(field.y + field.height).is_finite()
        {
            return Err(ConfigError::Invalid(format!(
                "field must have positive finite size, got {}x{}",
                field.width, field.height
            )));
        }
        if self.quadtree.split_threshold == 0 {
            return Err(ConfigError::Invalid(
                "quadtree.split_threshold must be at least 1".into(),
            ));
        }
        if self.quadtree.max_depth > QUADTREE_MAX_DEPTH_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "quadtree.max_depth must be at most {QUADTREE_MAX_DEPTH_LIMIT}, got {}",
                self.quadtree.max_depth
            )));
        }
        Ok(())
    }

    /// Fixed timestep in seconds.
    #[must_use]
    pub fn tick_seconds(&self) -> f64 {
        1.0 / f64::from(self.tick_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.quadtree.split_threshold, 1);
        assert_eq!(config.quadtree.max_depth, 5);
        assert_eq!(config.world.fault_policy, FaultPolicy::Abort);
    }

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::from_toml_str(
            r#"
            tick_rate = 30

            [field]
            width = 1024.0

            [world]
            fault_policy = "log_and_continue"
            "#,
        )
        .unwrap();

        assert_eq!(config.tick_rate, 30);
        assert_eq!(config.field.width, 1024.0);
        assert_eq!(config.field.height, DEFAULT_FIELD_HEIGHT);
        assert_eq!(config.world.fault_policy, FaultPolicy::LogAndContinue);
        assert!((config.tick_seconds() - 1.0 / 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            EngineConfig::from_toml_str("tick_rate = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[field]\nwidth = -1.0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[quadtree]\nsplit_threshold = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[field]\nx = inf"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[field]\ny = nan"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[field]\nx = 3.0e38\nwidth = 3.0e38"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_quadtree_depth_limit() {
        let at_limit = format!("[quadtree]\nmax_depth = {QUADTREE_MAX_DEPTH_LIMIT}");
        assert!(EngineConfig::from_toml_str(&at_limit).is_ok());

        let over = format!("[quadtree]\nmax_depth = {}", QUADTREE_MAX_DEPTH_LIMIT + 1);
        assert!(matches!(
            EngineConfig::from_toml_str(&over),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[quadtree]\nmax_depth = 4000000000"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            EngineConfig::from_toml_str("tick_rate = \"fast\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = EngineConfig::load("/definitely/not/here/kestrel.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let path = std::env::temp_dir().join(format!("kestrel_config_{}.toml", std::process::id()));
        std::fs::write(&path, "max_steps_per_frame = 3\n").unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.max_steps_per_frame, 3);

        std::fs::remove_file(&path).ok();
    }
}
