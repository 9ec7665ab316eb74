//! # Kestrel Sandbox
//!
//! Headless demo: boxes drift around the field, bounce off its edges and
//! reverse when they hit each other.
//!
//! ```text
//! kestrel_sandbox [config.toml] [frames]
//! RUST_LOG=kestrel=debug kestrel_sandbox
//! ```

use std::time::Duration;

use kestrel::ecs::{ComponentMask, Matcher, System};
use kestrel::shared::EngineConfig;
use kestrel::{Collider, GameError, GameEvent, GameLoop, Transform};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

/// Boxes spawned at startup.
const BOX_COUNT: usize = 64;

/// Frames simulated when none are given on the command line.
const DEFAULT_FRAMES: u64 = 600;

/// Scene seed, fixed so runs are comparable.
const SCENE_SEED: u64 = 0x4b45_5354;

fn main() -> Result<(), GameError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("kestrel=info,kestrel_sandbox=info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let mut game = match args.next() {
        Some(path) => GameLoop::from_config_path(path)?,
        None => GameLoop::new(EngineConfig::default())?,
    };
    let frames = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    let bounce = bounce_system(game.config());
    game.scheduler_mut().register(bounce);
    game.install_default_systems();
    spawn_boxes(&mut game)?;
    game.init()?;

    let events = game.events();
    let frame_time = Duration::from_secs_f64(game.config().tick_seconds());
    let mut collisions = 0usize;

    for _ in 0..frames {
        game.frame(frame_time)?;
        collisions += events
            .drain()
            .iter()
            .filter(|event| matches!(event, GameEvent::Collision { .. }))
            .count();
    }

    tracing::info!(frames, collisions, "sandbox finished");
    game.shutdown()
}

/// Reflects headings of boxes that left the field.
fn bounce_system(config: &EngineConfig) -> System {
    let field = config.field;
    System::builder("bounce")
        .matching(Matcher::all_of(
            ComponentMask::of::<Transform>().with::<Collider>(),
        ))
        .build(move |world, entities, _dt| {
            for &entity in entities {
                let (width, height) = {
                    let aabb = world.component::<Collider>(entity)?.aabb;
                    (aabb.width(), aabb.height())
                };
                let transform = world.component_mut::<Transform>(entity)?;
                let (x, y) = (transform.position.x, transform.position.y);
                let (mut dx, mut dy) = (transform.direction.x(), transform.direction.y());

                if (x < field.x && dx < 0.0) || (x + width > field.x + field.width && dx > 0.0) {
                    dx = -dx;
                }
                if (y < field.y && dy < 0.0) || (y + height > field.y + field.height && dy > 0.0) {
                    dy = -dy;
                }
                transform.direction.set(dx, dy);
            }
            Ok(())
        })
}

fn spawn_boxes(game: &mut GameLoop) -> Result<(), GameError> {
    let field = game.config().field;
    let mut rng = ChaCha8Rng::seed_from_u64(SCENE_SEED);
    let world = game.world_mut();

    for i in 0..BOX_COUNT {
        let size = rng.gen_range(8.0..24.0_f32);
        let x = rng.gen_range(field.x..field.x + field.width - size);
        let y = rng.gen_range(field.y..field.y + field.height - size);
        let angle: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
        let speed = rng.gen_range(40.0..160.0);

        let entity = world.create_entity();
        world.add_component(
            entity,
            Transform::new(x, y, speed).heading(angle.cos(), angle.sin()),
        )?;
        world.add_component(
            entity,
            Collider::new(size, size)
                .tagged(format!("box-{i}"))
                .on_collision(|world, contact| {
                    let transform = world.component_mut::<Transform>(contact.this)?;
                    transform.direction = transform.direction * -1.0;
                    Ok(())
                }),
        )?;
    }

    tracing::info!(boxes = BOX_COUNT, "scene spawned");
    Ok(())
}
