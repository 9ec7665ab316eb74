//! # Kestrel Core
//!
//! Entity Component System for a single-threaded, fixed-timestep 2D engine.
//!
//! ## Architecture Rules
//!
//! 1. **Explicit context** - every operation takes the [`World`] it acts on
//! 2. **Typed storage** - one sparse set per component type, no casts at call sites
//! 3. **Ordered systems** - registration order is execution order
//!
//! ## Example
//!
//! ```rust,ignore
//! use kestrel_core::{ComponentMask, Matcher, Scheduler, System, World};
//!
//! let mut world = World::new();
//! let mut scheduler = Scheduler::new();
//! scheduler.register(
//!     System::builder("gravity")
//!         .matching(Matcher::all_of(ComponentMask::of::<Velocity>()))
//!         .build(|world, entities, dt| {
//!             for &e in entities {
//!                 world.component_mut::<Velocity>(e)?.y += 9.8 * dt as f32;
//!             }
//!             Ok(())
//!         }),
//! );
//! scheduler.run_tick(&mut world, 1.0 / 60.0)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod ecs;
pub mod error;
pub mod event;
pub mod system;

pub use ecs::{
    component_name, Component, ComponentMask, ComponentStorage, Entity, EntityId,
    EntityRegistry, GroupHandle, Matcher, World, WorldStats,
};
pub use error::{EcsError, EcsResult};
pub use event::{EventId, EventRegistry};
pub use system::{Getter, Scheduler, SchedulerStats, System, SystemBuilder, SystemFault, TickReport};
