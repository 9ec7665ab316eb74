//! # Entity Component System
//!
//! ## Design Philosophy
//!
//! - One typed sparse-set storage per component type
//! - Entity IDs are indices with generation counters, recycled LIFO
//! - Groups cache matcher results and are rebuilt lazily after invalidation
//! - All structural changes go through [`World`]

mod component;
mod entity;
mod group;
mod matcher;
mod storage;
mod world;

pub use component::{component_name, Component, ComponentMask};
pub use entity::{Entity, EntityId, EntityRegistry};
pub use group::GroupHandle;
pub use matcher::Matcher;
pub use storage::ComponentStorage;
pub use world::{World, WorldStats};
