//! # Collision System
//!
//! Every tick:
//!
//! 1. Move each collider box to its entity's `Transform` position.
//! 2. Rebuild the quadtree over all boxes.
//! 3. For each overlapping pair `(a, b)`, publish a
//!    [`GameEvent::Collision`] and call `a`'s handler with `b`, then `b`'s
//!    handler with `a`.
//!
//! Handlers get the whole world. A handler that destroys either entity
//! suppresses the remaining calls for that pair; pairs found earlier in the
//! tick are unaffected.

use kestrel_collision::{Aabb, QuadTree, QuadTreePolicy};
use kestrel_core::{ComponentMask, EcsResult, EntityId, Matcher, System, World};

use crate::components::{Collider, Contact, Transform};
use crate::events::{EventSender, GameEvent};

/// Builds the collision system.
///
/// # Arguments
///
/// * `field` - Play field; the quadtree root covers at least this.
/// * `policy` - Quadtree subdivision limits.
/// * `events` - Where collision events go.
#[must_use]
pub fn collision_system(field: Aabb, policy: QuadTreePolicy, events: EventSender) -> System {
    let mut tree: QuadTree<EntityId> = QuadTree::new(policy);
    let mut boxes: Vec<(EntityId, Aabb)> = Vec::new();

    System::builder("collision")
        .matching(Matcher::all_of(
            ComponentMask::of::<Transform>().with::<Collider>(),
        ))
        .build(move |world, entities, _dt| {
            boxes.clear();
            for &entity in entities {
                let position = world.component::<Transform>(entity)?.position;
                let collider = world.component_mut::<Collider>(entity)?;
                collider.set_position(position.x, position.y);
                boxes.push((entity, collider.aabb));
            }

            tree.rebuild(field, boxes.drain(..));
            let pairs = tree.overlapping_pairs();

            for &(a, b) in &pairs {
                if !(world.is_live(a) && world.is_live(b)) {
                    continue;
                }
                events.send(GameEvent::Collision { first: a, second: b });
                notify(world, a, b)?;
                if world.is_live(a) && world.is_live(b) {
                    notify(world, b, a)?;
                }
            }

            tracing::debug!(
                colliders = entities.len(),
                pairs = pairs.len(),
                nodes = tree.stats().nodes,
                "collision pass"
            );
            Ok(())
        })
}

/// Calls `this`'s handler, if it has one, about `other`.
fn notify(world: &mut World, this: EntityId, other: EntityId) -> EcsResult<()> {
    let Some(handler) = world
        .get::<Collider>(this)
        .and_then(|collider| collider.handler().cloned())
    else {
        return Ok(());
    };
    let other_tag = world
        .get::<Collider>(other)
        .map(|collider| collider.tag.clone())
        .unwrap_or_default();

    handler(
        world,
        &Contact {
            this,
            other,
            other_tag,
        },
    )
}
