//! Movement integration.

use kestrel_core::{ComponentMask, Matcher, System};
use kestrel_shared::Vec2;

use crate::components::Transform;

/// `position += direction * current_speed * dt` for every `Transform`.
#[must_use]
pub fn translate_system() -> System {
    System::builder("translate")
        .matching(Matcher::all_of(ComponentMask::of::<Transform>()))
        .build(|world, entities, dt| {
            for &entity in entities {
                let transform = world.component_mut::<Transform>(entity)?;
                let step = transform.direction * (transform.current_speed * dt);
                transform.position += Vec2::new(step.x() as f32, step.y() as f32);
            }
            Ok(())
        })
}
