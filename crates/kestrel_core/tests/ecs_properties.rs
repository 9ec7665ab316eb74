//! Randomized and scenario tests for the ECS.
//!
//! Random sequences are driven by a seeded ChaCha RNG so failures reproduce.

use kestrel_core::{
    Component, ComponentMask, EcsError, EntityId, Matcher, Scheduler, System, World,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}
impl Component for Position {
    const ID: u8 = 0;
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Velocity {
    x: f32,
    y: f32,
}
impl Component for Velocity {
    const ID: u8 = 1;
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Tag(u32);
impl Component for Tag {
    const ID: u8 = 2;
}

fn assert_storage_consistent<C: Component>(world: &World) {
    let Some(storage) = world.storage::<C>() else {
        return;
    };
    assert_eq!(storage.entities().len(), storage.values().len());
    for (slot, &entity) in storage.entities().iter().enumerate() {
        assert_eq!(storage.dense_index(entity), Some(slot));
        assert!(world.is_live(entity), "dead entity {entity} in storage");
        assert!(world.entity(entity).unwrap().has_component(C::ID));
    }
}

fn brute_force(world: &World, matcher: &Matcher) -> Vec<EntityId> {
    world
        .entities()
        .filter(|&e| matcher.matches(world.entity(e).unwrap().component_mask))
        .collect()
}

fn matchers() -> Vec<Matcher> {
    let p = ComponentMask::of::<Position>();
    let v = ComponentMask::of::<Velocity>();
    let t = ComponentMask::of::<Tag>();
    vec![
        Matcher::all_of(p),
        Matcher::all_of(p.union(v)),
        Matcher::any_of(v.union(t)),
        Matcher::none_of(t),
        Matcher::compound([Matcher::all_of(p), Matcher::none_of(v)]),
        // Same hash as AllOf{Position, Tag}.
        Matcher::any_of(v),
        Matcher::all_of(p.union(t)),
    ]
}

#[test]
fn random_operations_keep_invariants() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x4b45_5354);
    let mut world = World::new();
    let mut live: Vec<EntityId> = Vec::new();
    let mut dead: Vec<EntityId> = Vec::new();
    let matchers = matchers();
    let handles: Vec<_> = matchers.iter().map(|m| world.group(m)).collect();

    for step in 0..4_000 {
        match rng.gen_range(0..7) {
            0 | 1 => live.push(world.create_entity()),
            2 if !live.is_empty() => {
                let e = live.swap_remove(rng.gen_range(0..live.len()));
                world.destroy_entity(e).unwrap();
                dead.push(e);
            }
            3 if !live.is_empty() => {
                let e = live[rng.gen_range(0..live.len())];
                let had = world.has::<Position>(e);
                let result = world.add_component(e, Position { x: step as f32, y: 0.0 });
                assert_eq!(result.is_err(), had);
            }
            4 if !live.is_empty() => {
                let e = live[rng.gen_range(0..live.len())];
                let _ = world.add_component(e, Velocity { x: 1.0, y: 1.0 });
                let _ = world.add_component(e, Tag(step));
            }
            5 if !live.is_empty() => {
                let e = live[rng.gen_range(0..live.len())];
                let had = world.has::<Velocity>(e);
                let result = world.remove_component::<Velocity>(e);
                assert_eq!(result.is_ok(), had);
            }
            6 if !dead.is_empty() => {
                let e = dead[rng.gen_range(0..dead.len())];
                assert_eq!(world.destroy_entity(e), Err(EcsError::InvalidEntity(e)));
                assert!(!world.is_live(e));
            }
            _ => {}
        }

        if step % 50 == 0 {
            assert_storage_consistent::<Position>(&world);
            assert_storage_consistent::<Velocity>(&world);
            assert_storage_consistent::<Tag>(&world);
        }

        // Group soundness right after the mutation.
        let pick = rng.gen_range(0..matchers.len());
        let expected = brute_force(&world, &matchers[pick]);
        assert_eq!(world.group_entities(handles[pick]), expected.as_slice());
    }

    assert_eq!(world.alive_count(), live.len());
}

#[test]
fn recycled_ids_are_unique_among_live() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut world = World::new();
    let mut live = Vec::new();

    for _ in 0..2_000 {
        if live.is_empty() || rng.gen_bool(0.6) {
            let e = world.create_entity();
            assert!(!live.contains(&e));
            live.push(e);
        } else {
            let e = live.swap_remove(rng.gen_range(0..live.len()));
            world.destroy_entity(e).unwrap();
        }
    }

    let mut indices: Vec<_> = live.iter().map(|e| e.index()).collect();
    indices.sort_unstable();
    indices.dedup();
    assert_eq!(indices.len(), live.len());
}

#[test]
fn group_add_then_remove_scenario() {
    let mut world = World::new();
    let movers = Matcher::all_of(ComponentMask::of::<Position>().with::<Velocity>());

    let a = world.create_entity();
    let b = world.create_entity();
    world.add_component(a, Position { x: 0.0, y: 0.0 }).unwrap();
    world.add_component(a, Velocity { x: 1.0, y: 0.0 }).unwrap();
    world.add_component(b, Position { x: 5.0, y: 5.0 }).unwrap();

    let g = world.group(&movers);
    assert_eq!(world.group_entities(g), &[a]);

    world.add_component(b, Velocity { x: 0.0, y: 1.0 }).unwrap();
    assert_eq!(world.group_entities(g), &[a, b]);

    world.remove_component::<Velocity>(a).unwrap();
    assert_eq!(world.group_entities(g), &[b]);
}

#[test]
fn destroy_mid_tick_scenario() {
    let mut world = World::new();
    let positions = Matcher::all_of(ComponentMask::of::<Position>());
    let victim = world.create_entity();
    let bystander = world.create_entity();
    world.add_component(victim, Position { x: 0.0, y: 0.0 }).unwrap();
    world.add_component(bystander, Position { x: 0.0, y: 0.0 }).unwrap();

    let mut scheduler = Scheduler::new();
    scheduler.register(
        System::builder("kill")
            .matching(positions.clone())
            .build(move |world, entities, _| {
                assert_eq!(entities.len(), 2);
                world.destroy_entity(victim)
            }),
    );
    scheduler.register(
        System::builder("observe")
            .matching(positions)
            .build(move |world, entities, _| {
                assert_eq!(entities, &[bystander]);
                assert!(world.get::<Position>(victim).is_none());
                Ok(())
            }),
    );

    let report = scheduler.run_tick(&mut world, 1.0 / 60.0).unwrap();
    assert_eq!(report.systems_run, 2);
    assert_eq!(report.entities_processed, 3);

    // The freed slot comes back with a new generation.
    let reborn = world.create_entity();
    assert_eq!(reborn.index(), victim.index());
    assert_ne!(reborn, victim);
}

#[test]
fn identical_runs_are_deterministic() {
    fn run() -> Vec<(EntityId, f32)> {
        let mut world = World::new();
        for i in 0..20 {
            let e = world.create_entity();
            world.add_component(e, Position { x: i as f32, y: 0.0 }).unwrap();
            if i % 3 == 0 {
                world.add_component(e, Velocity { x: 2.0, y: 0.0 }).unwrap();
            }
        }
        let mut scheduler = Scheduler::new();
        scheduler.register(
            System::builder("move")
                .matching(Matcher::all_of(ComponentMask::of::<Position>().with::<Velocity>()))
                .build(|world, entities, dt| {
                    for &e in entities {
                        let v = *world.component::<Velocity>(e)?;
                        let p = world.component_mut::<Position>(e)?;
                        p.x += v.x * dt as f32;
                    }
                    Ok(())
                }),
        );
        scheduler.register(System::builder("cull").build(|world, _, _| {
            let far: Vec<_> = world
                .storage::<Position>()
                .map(|s| s.iter().filter(|(_, p)| p.x > 20.0).map(|(e, _)| e).collect())
                .unwrap_or_default();
            for e in far {
                world.destroy_entity(e)?;
            }
            Ok(())
        }));

        for _ in 0..30 {
            scheduler.run_tick(&mut world, 0.5).unwrap();
        }
        world
            .storage::<Position>()
            .unwrap()
            .iter()
            .map(|(e, p)| (e, p.x))
            .collect()
    }

    assert_eq!(run(), run());
}
