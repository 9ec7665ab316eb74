//! # Condition Events
//!
//! An event pairs a condition with a list of actions. Once per tick, after
//! all systems ran, every active event whose condition holds runs its
//! actions in insertion order. Events are checked in creation order.

use crate::ecs::World;
use crate::error::EcsResult;

/// Predicate evaluated once per tick.
pub type ConditionFn = Box<dyn FnMut(&World) -> bool>;

/// Action run when the condition holds.
pub type ActionFn = Box<dyn FnMut(&mut World) -> EcsResult<()>>;

/// Handle to a registered event. Never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EventId(u32);

struct ConditionEvent {
    id: EventId,
    condition: ConditionFn,
    actions: Vec<ActionFn>,
    active: bool,
}

/// Ordered set of condition events.
#[derive(Default)]
pub struct EventRegistry {
    events: Vec<ConditionEvent>,
    next_id: u32,
}

impl EventRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an active event with no actions yet.
    pub fn create<F>(&mut self, condition: F) -> EventId
    where
        F: FnMut(&World) -> bool + 'static,
    {
        let id = EventId(self.next_id);
        self.next_id += 1;
        self.events.push(ConditionEvent {
            id,
            condition: Box::new(condition),
            actions: Vec::new(),
            active: true,
        });
        id
    }

    fn find(&mut self, id: EventId) -> Option<&mut ConditionEvent> {
        self.events.iter_mut().find(|event| event.id == id)
    }

    /// Appends an action. Returns `false` if the event does not exist.
    pub fn add_action<F>(&mut self, id: EventId, action: F) -> bool
    where
        F: FnMut(&mut World) -> EcsResult<()> + 'static,
    {
        match self.find(id) {
            Some(event) => {
                event.actions.push(Box::new(action));
                true
            }
            None => false,
        }
    }

    /// Pauses or resumes an event. Returns `false` if it does not exist.
    pub fn set_active(&mut self, id: EventId, active: bool) -> bool {
        self.find(id).map(|event| event.active = active).is_some()
    }

    /// Removes an event. Returns `false` if it did not exist.
    pub fn destroy(&mut self, id: EventId) -> bool {
        let before = self.events.len();
        self.events.retain(|event| event.id != id);
        self.events.len() != before
    }

    /// Evaluates every active event and runs the actions of those that fire.
    ///
    /// Returns how many events fired.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first action error.
    pub fn dispatch(&mut self, world: &mut World) -> EcsResult<usize> {
        let mut fired = 0;
        for event in self.events.iter_mut().filter(|event| event.active) {
            if !(event.condition)(&*world) {
                continue;
            }
            fired += 1;
            for action in &mut event.actions {
                action(world)?;
            }
        }
        Ok(fired)
    }

    /// Number of registered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if no events are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
