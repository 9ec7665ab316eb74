//! Sprite-sheet animation.

use kestrel_core::{ComponentMask, Matcher, System};

use crate::components::{Animation, Sprite};

/// Advances every `Animation` and points its `Sprite` source rect at the
/// current frame: column `frame`, row `clip.row`.
#[must_use]
pub fn animate_system() -> System {
    System::builder("animate")
        .matching(Matcher::all_of(
            ComponentMask::of::<Sprite>().with::<Animation>(),
        ))
        .build(|world, entities, dt| {
            for &entity in entities {
                let animation = world.component_mut::<Animation>(entity)?;
                let frame = animation.advance(dt);
                let row = animation.current().row;

                let sprite = world.component_mut::<Sprite>(entity)?;
                sprite.src.x = sprite.src.w * frame;
                sprite.src.y = sprite.src.h * row;
            }
            Ok(())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Clip, TextureHandle};
    use kestrel_core::{Scheduler, World};
    use kestrel_shared::Rect;

    #[test]
    fn test_animate_updates_source_rect() {
        let mut world = World::new();
        let e = world.create_entity();
        world
            .add_component(
                e,
                Sprite {
                    texture: TextureHandle(3),
                    src: Rect::new(0, 0, 32, 16),
                    dst: Rect::new(0, 0, 32, 16),
                },
            )
            .unwrap();
        let mut animation = Animation::new().with_clip(
            "run",
            Clip {
                row: 1,
                frames: 6,
                frame_ms: 100,
            },
        );
        assert!(animation.play("run"));
        world.add_component(e, animation).unwrap();

        let mut scheduler = Scheduler::new();
        scheduler.register(animate_system());
        scheduler.run_tick(&mut world, 0.25).unwrap();

        let sprite = world.get::<Sprite>(e).unwrap();
        assert_eq!(sprite.src, Rect::new(64, 16, 32, 16));
        assert_eq!(sprite.dst, Rect::new(0, 0, 32, 16));
    }
}
