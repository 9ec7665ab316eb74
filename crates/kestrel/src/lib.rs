//! # Kestrel
//!
//! Game-facing crate: components, built-in systems, the event bus and the
//! fixed-timestep loop, on top of the lower layers.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                       kestrel                          │
//! │   components · systems · events · game_loop            │
//! ├──────────────────────────┬─────────────────────────────┤
//! │      kestrel_core        │     kestrel_collision       │
//! │  ECS · groups · scheduler│  Aabb · QuadTree            │
//! ├──────────────────────────┴─────────────────────────────┤
//! │                    kestrel_shared                      │
//! │          math · matrix · constants · config            │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `components`: `Transform`, `Sprite`, `Animation`, `Collider`, `Despawn`
//! - `systems`: translate, animate, collision, despawn
//! - `events`: bounded channel for collision and despawn notifications
//! - `game_loop`: [`GameLoop`] and [`FixedTimestep`]

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod components;
pub mod error;
pub mod events;
pub mod game_loop;
pub mod systems;

// Re-export the layers
pub use kestrel_collision as collision;
pub use kestrel_core as ecs;
pub use kestrel_shared as shared;

pub use components::{
    Animation, Clip, Collider, CollisionHandler, Contact, Despawn, Sprite, TextureHandle,
    Transform,
};
pub use error::{GameError, GameResult};
pub use events::{EventBus, EventReceiver, EventSender, GameEvent};
pub use game_loop::{FixedTimestep, FrameReport, GameLoop, TickStats};
