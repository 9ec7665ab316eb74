//! # Systems and Scheduler
//!
//! A system is four parts:
//!
//! - **getter**: which group to fetch (or none)
//! - **filter**: optional per-entity predicate applied to the group
//! - **trigger**: optional gate checked once per tick
//! - **executer**: the mutation, given the filtered entities and `dt`
//!
//! The [`Scheduler`] runs systems in registration order. Each system queries
//! its group when its turn comes, so it sees every change made by the
//! systems before it in the same tick.
//!
//! ```text
//! Ready -> trigger? --no--> skip -> Ready
//!              |
//!             yes -> query -> filter -> execute -> Ready
//! ```

use kestrel_shared::FaultPolicy;

use crate::ecs::{EntityId, Matcher, World};
use crate::error::{EcsError, EcsResult};
use crate::event::EventRegistry;

/// Per-entity predicate.
pub type FilterFn = Box<dyn Fn(&World, EntityId) -> bool>;

/// Per-tick gate.
pub type TriggerFn = Box<dyn FnMut(&World) -> bool>;

/// System body: `(world, entities, dt)`.
pub type ExecuterFn = Box<dyn FnMut(&mut World, &[EntityId], f64) -> EcsResult<()>>;

/// Lifecycle hook (init, cleanup, exit).
pub type HookFn = Box<dyn FnMut(&mut World) -> EcsResult<()>>;

/// Group selection of a system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Getter {
    /// The executer receives an empty slice.
    Nothing,
    /// The executer receives the group of this matcher.
    Group(Matcher),
}

/// A registered system.
pub struct System {
    name: String,
    getter: Getter,
    filter: Option<FilterFn>,
    trigger: Option<TriggerFn>,
    executer: ExecuterFn,
}

impl System {
    /// Starts building a system.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> SystemBuilder {
        SystemBuilder {
            name: name.into(),
            getter: Getter::Nothing,
            filter: None,
            trigger: None,
        }
    }

    /// System name, used in logs and faults.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Group selection.
    #[must_use]
    pub fn getter(&self) -> &Getter {
        &self.getter
    }
}

impl std::fmt::Debug for System {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("System")
            .field("name", &self.name)
            .field("getter", &self.getter)
            .field("filter", &self.filter.is_some())
            .field("trigger", &self.trigger.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`System`].
#[must_use]
pub struct SystemBuilder {
    name: String,
    getter: Getter,
    filter: Option<FilterFn>,
    trigger: Option<TriggerFn>,
}

impl SystemBuilder {
    /// Selects the group of `matcher`.
    pub fn matching(mut self, matcher: Matcher) -> Self {
        self.getter = Getter::Group(matcher);
        self
    }

    /// Keeps only entities for which `filter` returns true.
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&World, EntityId) -> bool + 'static,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Runs the system only on ticks where `trigger` returns true.
    pub fn trigger<F>(mut self, trigger: F) -> Self
    where
        F: FnMut(&World) -> bool + 'static,
    {
        self.trigger = Some(Box::new(trigger));
        self
    }

    /// Finishes the system with its executer.
    pub fn build<F>(self, executer: F) -> System
    where
        F: FnMut(&mut World, &[EntityId], f64) -> EcsResult<()> + 'static,
    {
        System {
            name: self.name,
            getter: self.getter,
            filter: self.filter,
            trigger: self.trigger,
            executer: Box::new(executer),
        }
    }
}

/// A failure recorded under [`FaultPolicy::LogAndContinue`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemFault {
    /// Failing system.
    pub system: String,
    /// Its error.
    pub error: EcsError,
}

/// What happened during one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// Systems whose executer ran.
    pub systems_run: usize,
    /// Systems skipped by their trigger.
    pub systems_skipped: usize,
    /// Entities handed to executers, summed over systems.
    pub entities_processed: usize,
    /// Condition events that fired.
    pub events_fired: usize,
    /// Executer failures that were logged instead of aborting.
    pub faults: Vec<SystemFault>,
}

/// Counters describing a scheduler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Registered systems.
    pub systems: usize,
    /// Init hooks.
    pub initers: usize,
    /// Cleanup hooks.
    pub cleaners: usize,
    /// Exit hooks.
    pub exiters: usize,
    /// Condition events.
    pub events: usize,
}

/// Ordered pipeline of systems plus lifecycle hooks and condition events.
pub struct Scheduler {
    systems: Vec<System>,
    initers: Vec<HookFn>,
    cleaners: Vec<HookFn>,
    exiters: Vec<HookFn>,
    events: EventRegistry,
    fault_policy: FaultPolicy,
    tick: u64,
    scratch: Vec<EntityId>,
}

impl Scheduler {
    /// Creates a scheduler that aborts the tick on executer failure.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(FaultPolicy::Abort)
    }

    /// Creates a scheduler with an explicit fault policy.
    #[must_use]
    pub fn with_policy(fault_policy: FaultPolicy) -> Self {
        Self {
            systems: Vec::new(),
            initers: Vec::new(),
            cleaners: Vec::new(),
            exiters: Vec::new(),
            events: EventRegistry::new(),
            fault_policy,
            tick: 0,
            scratch: Vec::new(),
        }
    }

    /// Appends a system. It runs after every system registered before it.
    pub fn register(&mut self, system: System) {
        tracing::debug!(system = system.name(), order = self.systems.len(), "system registered");
        self.systems.push(system);
    }

    /// Adds a hook run once by [`Scheduler::run_init`].
    pub fn add_initer<F>(&mut self, hook: F)
    where
        F: FnMut(&mut World) -> EcsResult<()> + 'static,
    {
        self.initers.push(Box::new(hook));
    }

    /// Adds a hook run by [`Scheduler::run_cleanup`].
    pub fn add_cleaner<F>(&mut self, hook: F)
    where
        F: FnMut(&mut World) -> EcsResult<()> + 'static,
    {
        self.cleaners.push(Box::new(hook));
    }

    /// Adds a hook run once by [`Scheduler::run_exit`].
    pub fn add_exiter<F>(&mut self, hook: F)
    where
        F: FnMut(&mut World) -> EcsResult<()> + 'static,
    {
        self.exiters.push(Box::new(hook));
    }

    /// Condition events checked at the end of every tick.
    pub fn events_mut(&mut self) -> &mut EventRegistry {
        &mut self.events
    }

    /// Fault policy in effect.
    #[must_use]
    pub const fn fault_policy(&self) -> FaultPolicy {
        self.fault_policy
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Counters for debug output.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            systems: self.systems.len(),
            initers: self.initers.len(),
            cleaners: self.cleaners.len(),
            exiters: self.exiters.len(),
            events: self.events.len(),
        }
    }

    fn run_hooks(hooks: &mut [HookFn], world: &mut World) -> EcsResult<()> {
        hooks.iter_mut().try_for_each(|hook| hook(world))
    }

    /// Runs init hooks in registration order.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first hook error.
    pub fn run_init(&mut self, world: &mut World) -> EcsResult<()> {
        Self::run_hooks(&mut self.initers, world)
    }

    /// Runs cleanup hooks in registration order.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first hook error.
    pub fn run_cleanup(&mut self, world: &mut World) -> EcsResult<()> {
        Self::run_hooks(&mut self.cleaners, world)
    }

    /// Runs exit hooks in registration order.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first hook error.
    pub fn run_exit(&mut self, world: &mut World) -> EcsResult<()> {
        Self::run_hooks(&mut self.exiters, world)
    }

    /// Runs one fixed-timestep tick.
    ///
    /// For each system in order: check the trigger, fetch the group, apply
    /// the filter, call the executer. Then dispatch condition events.
    ///
    /// # Errors
    ///
    /// Under [`FaultPolicy::Abort`], the first executer failure ends the
    /// tick with [`EcsError::SystemFault`]; later systems do not run.
    /// Condition event errors always abort.
    pub fn run_tick(&mut self, world: &mut World, dt: f64) -> EcsResult<TickReport> {
        self.tick += 1;
        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };

        for system in &mut self.systems {
            let _span = tracing::debug_span!("system", name = %system.name).entered();

            if let Some(trigger) = &mut system.trigger {
                if !trigger(&*world) {
                    report.systems_skipped += 1;
                    continue;
                }
            }

            self.scratch.clear();
            if let Getter::Group(matcher) = &system.getter {
                let handle = world.group(matcher);
                self.scratch.extend_from_slice(world.group_entities(handle));
            }
            if let Some(filter) = &system.filter {
                self.scratch.retain(|&entity| filter(&*world, entity));
            }

            report.entities_processed += self.scratch.len();
            match (system.executer)(world, &self.scratch, dt) {
                Ok(()) => report.systems_run += 1,
                Err(error) => {
                    tracing::warn!(system = %system.name, %error, tick = self.tick, "system failed");
                    match self.fault_policy {
                        FaultPolicy::Abort => {
                            return Err(EcsError::SystemFault {
                                system: system.name.clone(),
                                source: Box::new(error),
                            });
                        }
                        FaultPolicy::LogAndContinue => report.faults.push(SystemFault {
                            system: system.name.clone(),
                            error,
                        }),
                    }
                }
            }
        }

        report.events_fired = self.events.dispatch(world)?;

        tracing::debug!(
            tick = report.tick,
            run = report.systems_run,
            skipped = report.systems_skipped,
            entities = report.entities_processed,
            faults = report.faults.len(),
            "tick complete"
        );
        Ok(report)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
