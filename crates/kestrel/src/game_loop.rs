//! # Kestrel Game Loop
//!
//! ```text
//! frame(elapsed):
//! ┌──────────────────────────────────────────────────────────┐
//! │ 1. ACCUMULATE   elapsed wall time                        │
//! │ 2. TICK         run_tick(dt) while a full step is banked │
//! │                 (at most max_steps_per_frame times)      │
//! │ 3. CLEANUP      cleanup hooks, once per frame            │
//! │ 4. RENDER       caller draws, interpolating with alpha   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The caller measures elapsed time and passes it in, so the loop runs the
//! same headless, under a windowing library, or in tests.

use std::path::Path;
use std::time::{Duration, Instant};

use kestrel_collision::{Aabb, QuadTreePolicy};
use kestrel_core::{Scheduler, SystemFault, TickReport, World};
use kestrel_shared::EngineConfig;

use crate::error::GameResult;
use crate::events::{EventBus, EventReceiver, EventSender};
use crate::systems::{animate_system, collision_system, despawn_system, translate_system};

// =============================================================================
// Fixed timestep
// =============================================================================

/// Tick timing statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickStats {
    /// Minimum tick duration observed.
    pub min_tick_us: u64,
    /// Maximum tick duration observed.
    pub max_tick_us: u64,
    /// Rolling average tick duration.
    pub avg_tick_us: u64,
    /// Ticks that took longer than their budget.
    pub late_ticks: u64,
    /// Ticks measured.
    pub total_ticks: u64,
    /// Banked steps discarded because a frame hit the step cap.
    pub dropped_ticks: u64,
}

impl TickStats {
    const fn fresh(budget_us: u64) -> Self {
        Self {
            min_tick_us: u64::MAX,
            max_tick_us: 0,
            avg_tick_us: budget_us,
            late_ticks: 0,
            total_ticks: 0,
            dropped_ticks: 0,
        }
    }
}

/// Fixed-timestep accumulator.
///
/// Converts variable frame times into a whole number of fixed steps and
/// keeps the remainder for the next frame.
#[derive(Clone, Debug)]
pub struct FixedTimestep {
    tick_duration: Duration,
    max_steps: u32,
    accumulator: Duration,
    tick_count: u64,
    stats: TickStats,
}

impl FixedTimestep {
    /// Creates an accumulator.
    ///
    /// # Arguments
    ///
    /// * `tick_rate` - Steps per second (clamped to at least 1)
    /// * `max_steps` - Cap on steps per frame (clamped to at least 1)
    #[must_use]
    pub fn new(tick_rate: u32, max_steps: u32) -> Self {
        let tick_duration = Duration::from_nanos(1_000_000_000 / u64::from(tick_rate.max(1)));
        Self {
            tick_duration,
            max_steps: max_steps.max(1),
            accumulator: Duration::ZERO,
            tick_count: 0,
            stats: TickStats::fresh(tick_duration.as_micros() as u64),
        }
    }

    /// Banks `elapsed` and returns how many steps to run now.
    ///
    /// When more than `max_steps` are due, the excess whole steps are
    /// dropped so a long stall does not cause a spiral of catch-up frames.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulator += elapsed;
        let due = self.accumulator.as_nanos() / self.tick_duration.as_nanos();
        let steps = due.min(u128::from(self.max_steps));

        if due > steps {
            let dropped = due - steps;
            self.stats.dropped_ticks += u64::try_from(dropped).unwrap_or(u64::MAX);
            tracing::warn!(due = due as u64, run = steps as u64, "frame over budget, dropping steps");
            self.accumulator = Duration::from_nanos(
                (self.accumulator.as_nanos() % self.tick_duration.as_nanos()) as u64,
            );
        } else {
            self.accumulator -= self.tick_duration * steps as u32;
        }

        self.tick_count += steps as u64;
        steps as u32
    }

    /// Fraction of a step banked, in `[0, 1)`. Use to interpolate rendering.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.accumulator.as_secs_f64() / self.tick_duration.as_secs_f64()
    }

    /// Records how long one step took.
    pub fn record_tick(&mut self, duration: Duration) {
        let duration_us = duration.as_micros() as u64;

        self.stats.total_ticks += 1;
        self.stats.min_tick_us = self.stats.min_tick_us.min(duration_us);
        self.stats.max_tick_us = self.stats.max_tick_us.max(duration_us);
        self.stats.avg_tick_us = (self.stats.avg_tick_us * 15 + duration_us) / 16;

        if duration > self.tick_duration {
            self.stats.late_ticks += 1;
        }
    }

    /// Steps handed out so far.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Step length.
    #[must_use]
    pub const fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    /// Timing statistics.
    #[must_use]
    pub const fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// Resets statistics.
    pub fn reset_stats(&mut self) {
        self.stats = TickStats::fresh(self.tick_duration.as_micros() as u64);
    }
}

// =============================================================================
// Game loop
// =============================================================================

/// What one call to [`GameLoop::frame`] did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Frame number, starting at 1.
    pub frame: u64,
    /// Fixed steps run.
    pub ticks: u32,
    /// Entities handed to executers, summed over steps.
    pub entities_processed: usize,
    /// Faults logged under `LogAndContinue`.
    pub faults: Vec<SystemFault>,
    /// Render interpolation factor.
    pub alpha: f64,
}

/// Owns the world, the scheduler and the timing, and drives them.
pub struct GameLoop {
    config: EngineConfig,
    world: World,
    scheduler: Scheduler,
    timestep: FixedTimestep,
    bus: EventBus,
    frame_count: u64,
}

impl GameLoop {
    /// Creates a loop with no systems registered.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GameError::Config`] if `config` fails validation.
    pub fn new(config: EngineConfig) -> GameResult<Self> {
        config.validate()?;

        tracing::info!(
            tick_rate = config.tick_rate,
            max_steps = config.max_steps_per_frame,
            field_w = config.field.width,
            field_h = config.field.height,
            "game loop created"
        );

        Ok(Self {
            world: World::with_capacity(config.world.entity_capacity),
            scheduler: Scheduler::with_policy(config.world.fault_policy),
            timestep: FixedTimestep::new(config.tick_rate, config.max_steps_per_frame),
            bus: EventBus::new(config.event_capacity),
            frame_count: 0,
            config,
        })
    }

    /// Loads a TOML configuration file and creates a loop from it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GameError::Config`] if the file cannot be read,
    /// parsed or validated.
    pub fn from_config_path(path: impl AsRef<Path>) -> GameResult<Self> {
        Self::new(EngineConfig::load(path)?)
    }

    /// Registers translate, animate, collision and despawn, in that order.
    pub fn install_default_systems(&mut self) {
        let field = Aabb::from_field(&self.config.field);
        let policy = QuadTreePolicy::from(self.config.quadtree);

        self.scheduler.register(translate_system());
        self.scheduler.register(animate_system());
        self.scheduler
            .register(collision_system(field, policy, self.bus.sender()));
        self.scheduler.register(despawn_system(self.bus.sender()));
    }

    /// Runs init hooks.
    ///
    /// # Errors
    ///
    /// Returns the first hook error.
    pub fn init(&mut self) -> GameResult<()> {
        self.scheduler.run_init(&mut self.world)?;
        tracing::info!(entities = self.world.alive_count(), "game initialized");
        Ok(())
    }

    /// Runs one fixed step immediately, bypassing the accumulator.
    ///
    /// # Errors
    ///
    /// As [`Scheduler::run_tick`].
    pub fn step(&mut self) -> GameResult<TickReport> {
        let start = Instant::now();
        let report = self
            .scheduler
            .run_tick(&mut self.world, self.config.tick_seconds())?;
        self.timestep.record_tick(start.elapsed());
        Ok(report)
    }

    /// Advances the simulation by `elapsed` wall time.
    ///
    /// Runs as many fixed steps as are due (capped), then the cleanup hooks.
    ///
    /// # Errors
    ///
    /// Returns the first tick or cleanup error. Steps already run stay
    /// applied.
    pub fn frame(&mut self, elapsed: Duration) -> GameResult<FrameReport> {
        self.frame_count += 1;
        let steps = self.timestep.advance(elapsed);

        let mut report = FrameReport {
            frame: self.frame_count,
            ticks: steps,
            ..FrameReport::default()
        };
        for _ in 0..steps {
            let tick = self.step()?;
            report.entities_processed += tick.entities_processed;
            report.faults.extend(tick.faults);
        }

        self.scheduler.run_cleanup(&mut self.world)?;
        report.alpha = self.timestep.alpha();

        tracing::trace!(frame = report.frame, ticks = steps, "frame complete");
        Ok(report)
    }

    /// Runs exit hooks and logs final counters.
    ///
    /// # Errors
    ///
    /// Returns the first hook error.
    pub fn shutdown(&mut self) -> GameResult<()> {
        self.scheduler.run_exit(&mut self.world)?;

        let world = self.world.stats();
        let timing = self.timestep.stats();
        tracing::info!(
            frames = self.frame_count,
            ticks = self.scheduler.tick_count(),
            live = world.live_entities,
            groups = world.groups,
            avg_tick_us = timing.avg_tick_us,
            late_ticks = timing.late_ticks,
            dropped_ticks = timing.dropped_ticks,
            "game loop shut down"
        );
        Ok(())
    }

    /// The ECS world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// The ECS world, mutably (for spawning between frames).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The scheduler, for registering systems, hooks and condition events.
    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    /// Receiver for game events.
    #[must_use]
    pub fn events(&self) -> EventReceiver {
        self.bus.receiver()
    }

    /// Sender for game events, for custom systems.
    #[must_use]
    pub fn event_sender(&self) -> EventSender {
        self.bus.sender()
    }

    /// Configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Timing state.
    #[must_use]
    pub const fn timestep(&self) -> &FixedTimestep {
        &self.timestep
    }

    /// Frames run so far.
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestep_creation() {
        let timestep = FixedTimestep::new(60, 5);
        assert_eq!(timestep.tick_count(), 0);
        assert_eq!(timestep.tick_duration(), Duration::from_nanos(16_666_666));
    }

    #[test]
    fn test_timestep_banks_remainder() {
        let mut timestep = FixedTimestep::new(100, 5);

        assert_eq!(timestep.advance(Duration::from_millis(5)), 0);
        assert!((timestep.alpha() - 0.5).abs() < 1e-9);
        assert_eq!(timestep.advance(Duration::from_millis(17)), 2);
        assert!((timestep.alpha() - 0.2).abs() < 1e-9);
        assert_eq!(timestep.tick_count(), 2);
    }

    #[test]
    fn test_timestep_caps_steps() {
        let mut timestep = FixedTimestep::new(100, 3);

        assert_eq!(timestep.advance(Duration::from_millis(105)), 3);
        assert_eq!(timestep.stats().dropped_ticks, 7);
        assert!((timestep.alpha() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_record_tick_stats() {
        let mut timestep = FixedTimestep::new(100, 3);
        timestep.record_tick(Duration::from_millis(2));
        timestep.record_tick(Duration::from_millis(20));

        let stats = timestep.stats();
        assert_eq!(stats.total_ticks, 2);
        assert_eq!(stats.min_tick_us, 2_000);
        assert_eq!(stats.max_tick_us, 20_000);
        assert_eq!(stats.late_ticks, 1);

        timestep.reset_stats();
        assert_eq!(timestep.stats().total_ticks, 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig {
            tick_rate: 0,
            ..EngineConfig::default()
        };
        assert!(GameLoop::new(config).is_err());
    }
}
