//! End-of-tick entity removal.

use kestrel_core::{ComponentMask, Matcher, System};

use crate::components::Despawn;
use crate::events::{EventSender, GameEvent};

/// Destroys every entity carrying [`Despawn`] and reports each one.
#[must_use]
pub fn despawn_system(events: EventSender) -> System {
    System::builder("despawn")
        .matching(Matcher::all_of(ComponentMask::of::<Despawn>()))
        .build(move |world, entities, _dt| {
            for &entity in entities {
                world.destroy_entity(entity)?;
                events.send(GameEvent::EntityDestroyed { entity });
            }
            if !entities.is_empty() {
                tracing::debug!(count = entities.len(), "entities despawned");
            }
            Ok(())
        })
}
