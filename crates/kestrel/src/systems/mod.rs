//! # Built-in Systems
//!
//! Registered by [`crate::GameLoop::install_default_systems`] in this order:
//!
//! 1. [`translate`]: moves transforms along their heading
//! 2. [`animate`]: steps sprite-sheet frames
//! 3. [`collision`]: quadtree broad-phase, box test, handlers
//! 4. [`despawn`]: destroys entities marked with `Despawn`
//!
//! Each constructor returns a [`kestrel_core::System`], so games can register
//! them in a different order or alongside their own.

pub mod animate;
pub mod collision;
pub mod despawn;
pub mod translate;

pub use animate::animate_system;
pub use collision::collision_system;
pub use despawn::despawn_system;
pub use translate::translate_system;
