//! # Engine Constants
//!
//! Defaults used when no configuration file overrides them.

// =============================================================================
// TIMING
// =============================================================================

/// Tick rate (fixed updates per second).
pub const TICK_RATE: u32 = 60;

/// Upper bound on fixed updates run for a single rendered frame.
///
/// Stops the accumulator from spiralling after a long stall.
pub const MAX_STEPS_PER_FRAME: u32 = 5;

// =============================================================================
// PLAY FIELD
// =============================================================================

/// Default play-field width in world units.
pub const DEFAULT_FIELD_WIDTH: f32 = 800.0;

/// Default play-field height in world units.
pub const DEFAULT_FIELD_HEIGHT: f32 = 600.0;

// =============================================================================
// BROAD-PHASE
// =============================================================================

/// A quadtree node splits once it holds more boxes than this.
pub const QUADTREE_SPLIT_THRESHOLD: usize = 1;

/// Nodes at this depth never split.
pub const QUADTREE_MAX_DEPTH: u32 = 5;

/// Largest accepted `max_depth`. Boxes that never separate split down to
/// the cap, so the node count grows as `4^depth`.
pub const QUADTREE_MAX_DEPTH_LIMIT: u32 = 16;

// =============================================================================
// EVENTS
// =============================================================================

/// Bounded capacity of the game event bus.
pub const EVENT_CAPACITY: usize = 1024;
