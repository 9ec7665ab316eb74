//! # Kestrel Shared
//!
//! Value types used by every other Kestrel crate.
//!
//! - [`math`]: `Vec2`, `Vector2D`, `Point`, `Rect` and angle helpers
//! - [`matrix`]: small integer grid used by tile maps
//! - [`constants`]: engine-wide defaults
//! - [`config`]: [`EngineConfig`], loaded once at startup from TOML
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on the ECS. It sits below it.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod constants;
pub mod math;
pub mod matrix;

pub use config::{
    ConfigError, EngineConfig, FaultPolicy, FieldConfig, QuadTreeConfig, WorldConfig,
};
pub use constants::{
    DEFAULT_FIELD_HEIGHT, DEFAULT_FIELD_WIDTH, EVENT_CAPACITY, MAX_STEPS_PER_FRAME,
    QUADTREE_MAX_DEPTH, QUADTREE_MAX_DEPTH_LIMIT, QUADTREE_SPLIT_THRESHOLD, TICK_RATE,
};
pub use math::{degrees_to_radians, radians_to_degrees, Point, Rect, Vec2, Vector2D};
pub use matrix::{MathError, Matrix};
