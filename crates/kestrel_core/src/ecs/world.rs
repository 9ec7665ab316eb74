//! # ECS World
//!
//! The central container for entities, component storages and the group
//! cache. Every structural change (create, destroy, add, remove) goes
//! through the world so masks, storages and groups never disagree.

use std::any::TypeId;

use super::component::{component_name, Component, ComponentMask};
use super::entity::{Entity, EntityId, EntityRegistry};
use super::group::{GroupCache, GroupHandle};
use super::matcher::Matcher;
use super::storage::{ComponentStorage, ErasedStorage};
use crate::error::{EcsError, EcsResult};

struct StorageSlot {
    type_id: TypeId,
    storage: Box<dyn ErasedStorage>,
}

/// Counters describing a world, for debug overlays and logs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Live entities.
    pub live_entities: usize,
    /// Freed slots waiting for reuse.
    pub recycled: usize,
    /// Registered component storages.
    pub storages: usize,
    /// Cached groups.
    pub groups: usize,
    /// Component types with at least one dependent group.
    pub indexed_types: usize,
}

/// The ECS World - container for all game state.
///
/// # Example
///
/// ```rust,ignore
/// let mut world = World::new();
///
/// let entity = world.create_entity();
/// world.add_component(entity, Transform::at(10.0, 20.0))?;
///
/// let movers = world.query(&Matcher::all_of(ComponentMask::of::<Transform>()));
/// ```
pub struct World {
    registry: EntityRegistry,
    storages: Vec<Option<StorageSlot>>,
    groups: GroupCache,
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty world with room for `capacity` entity slots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            registry: EntityRegistry::with_capacity(capacity),
            storages: (0..ComponentMask::MAX_COMPONENTS).map(|_| None).collect(),
            groups: GroupCache::default(),
        }
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates an entity with no components.
    pub fn create_entity(&mut self) -> EntityId {
        let id = self.registry.create();
        self.groups.invalidate_empty_matching();
        tracing::trace!(entity = %id, "entity created");
        id
    }

    /// Destroys an entity: drops all its components, removes it from every
    /// group and returns its index to the free list.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidEntity`] if `id` is not live.
    pub fn destroy_entity(&mut self, id: EntityId) -> EcsResult<()> {
        let mask = self.registry.destroy(id)?;
        for component_id in mask.ids() {
            if let Some(slot) = &mut self.storages[usize::from(component_id)] {
                slot.storage.remove_entity(id);
            }
        }
        self.groups.invalidate_matching(mask);
        tracing::trace!(entity = %id, ?mask, "entity destroyed");
        Ok(())
    }

    /// Destroys every live entity.
    pub fn destroy_all_entities(&mut self) {
        let live: Vec<EntityId> = self.registry.iter_alive().map(|slot| slot.id).collect();
        let count = live.len();
        for id in live {
            // Ids were collected from live slots just above.
            let _ = self.destroy_entity(id);
        }
        tracing::debug!(count, "destroyed all entities");
    }

    /// Checks if an id refers to a live entity.
    #[inline]
    #[must_use]
    pub fn is_live(&self, id: EntityId) -> bool {
        self.registry.is_live(id)
    }

    /// Live entity slot for `id`.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.registry.slot(id)
    }

    /// Iterates live entity ids in ascending index order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.registry.iter_alive().map(|slot| slot.id)
    }

    /// Number of live entities.
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.registry.alive_count()
    }

    // =========================================================================
    // Components
    // =========================================================================

    fn check_id<C: Component>() -> EcsResult<usize> {
        let id = usize::from(C::ID);
        if id >= ComponentMask::MAX_COMPONENTS {
            return Err(EcsError::ComponentIdOutOfRange {
                id: C::ID,
                component: component_name::<C>(),
            });
        }
        Ok(id)
    }

    /// Storage for `C`, registering it on first use.
    fn storage_entry<C: Component>(&mut self) -> EcsResult<&mut ComponentStorage<C>> {
        let id = Self::check_id::<C>()?;
        let slot = self.storages[id].get_or_insert_with(|| {
            tracing::debug!(id = C::ID, component = component_name::<C>(), "storage registered");
            StorageSlot {
                type_id: TypeId::of::<C>(),
                storage: Box::new(ComponentStorage::<C>::new()),
            }
        });
        if slot.type_id != TypeId::of::<C>() {
            return Err(EcsError::ComponentIdConflict {
                id: C::ID,
                existing: slot.storage.type_name(),
                requested: component_name::<C>(),
            });
        }
        slot.storage
            .as_any_mut()
            .downcast_mut::<ComponentStorage<C>>()
            .ok_or(EcsError::ComponentIdConflict {
                id: C::ID,
                existing: "unknown",
                requested: component_name::<C>(),
            })
    }

    /// Attaches a component.
    ///
    /// # Errors
    ///
    /// - [`EcsError::InvalidEntity`] if `entity` is not live
    /// - [`EcsError::DuplicateComponent`] if it already has a `C`
    /// - [`EcsError::ComponentIdConflict`] if another type owns `C::ID`
    pub fn add_component<C: Component>(&mut self, entity: EntityId, value: C) -> EcsResult<()> {
        if !self.registry.is_live(entity) {
            return Err(EcsError::InvalidEntity(entity));
        }
        self.storage_entry::<C>()?.insert(entity, value)?;
        if let Some(slot) = self.registry.slot_mut(entity) {
            slot.add_component(C::ID);
        }
        self.groups.invalidate_type(C::ID);
        Ok(())
    }

    /// Detaches a component and returns it.
    ///
    /// # Errors
    ///
    /// - [`EcsError::InvalidEntity`] if `entity` is not live
    /// - [`EcsError::MissingComponent`] if it has no `C`
    pub fn remove_component<C: Component>(&mut self, entity: EntityId) -> EcsResult<C> {
        if !self.registry.is_live(entity) {
            return Err(EcsError::InvalidEntity(entity));
        }
        Self::check_id::<C>()?;
        let value = self
            .storage_mut::<C>()
            .ok_or(EcsError::MissingComponent {
                entity,
                component: component_name::<C>(),
            })?
            .remove(entity)?;
        if let Some(slot) = self.registry.slot_mut(entity) {
            slot.remove_component(C::ID);
        }
        self.groups.invalidate_type(C::ID);
        Ok(value)
    }

    /// Component of a live entity.
    #[must_use]
    pub fn get<C: Component>(&self, entity: EntityId) -> Option<&C> {
        self.storage::<C>()?.get(entity)
    }

    /// Mutable component of a live entity.
    pub fn get_mut<C: Component>(&mut self, entity: EntityId) -> Option<&mut C> {
        self.storage_mut::<C>()?.get_mut(entity)
    }

    /// Like [`World::get`], but reports why the component is unavailable.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidEntity`] or [`EcsError::MissingComponent`].
    pub fn component<C: Component>(&self, entity: EntityId) -> EcsResult<&C> {
        if !self.registry.is_live(entity) {
            return Err(EcsError::InvalidEntity(entity));
        }
        self.get::<C>(entity).ok_or(EcsError::MissingComponent {
            entity,
            component: component_name::<C>(),
        })
    }

    /// Like [`World::get_mut`], but reports why the component is unavailable.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidEntity`] or [`EcsError::MissingComponent`].
    pub fn component_mut<C: Component>(&mut self, entity: EntityId) -> EcsResult<&mut C> {
        if !self.registry.is_live(entity) {
            return Err(EcsError::InvalidEntity(entity));
        }
        self.get_mut::<C>(entity).ok_or(EcsError::MissingComponent {
            entity,
            component: component_name::<C>(),
        })
    }

    /// Checks if a live entity has a `C`.
    #[must_use]
    pub fn has<C: Component>(&self, entity: EntityId) -> bool {
        self.get::<C>(entity).is_some()
    }

    /// Read access to the storage of `C`, if any `C` was ever added.
    #[must_use]
    pub fn storage<C: Component>(&self) -> Option<&ComponentStorage<C>> {
        self.storages
            .get(usize::from(C::ID))?
            .as_ref()?
            .storage
            .as_any()
            .downcast_ref::<ComponentStorage<C>>()
    }

    /// In-place write access to the storage of `C`.
    ///
    /// Values can be mutated but not added or removed, so groups stay valid.
    pub fn storage_mut<C: Component>(&mut self) -> Option<&mut ComponentStorage<C>> {
        self.storages
            .get_mut(usize::from(C::ID))?
            .as_mut()?
            .storage
            .as_any_mut()
            .downcast_mut::<ComponentStorage<C>>()
    }

    // =========================================================================
    // Groups
    // =========================================================================

    /// Canonical group handle for `matcher`.
    pub fn group(&mut self, matcher: &Matcher) -> GroupHandle {
        self.groups.handle_for(matcher)
    }

    /// Current members of a group, rebuilt first if invalidated.
    pub fn group_entities(&mut self, handle: GroupHandle) -> &[EntityId] {
        self.groups.entities(handle, &self.registry)
    }

    /// Matcher behind a group handle.
    #[must_use]
    pub fn group_matcher(&self, handle: GroupHandle) -> Option<&Matcher> {
        self.groups.matcher(handle)
    }

    /// Whether a group's cached list is current.
    #[must_use]
    pub fn is_group_valid(&self, handle: GroupHandle) -> bool {
        self.groups.is_valid(handle)
    }

    /// Snapshot of the entities matching `matcher`.
    pub fn query(&mut self, matcher: &Matcher) -> Vec<EntityId> {
        let handle = self.group(matcher);
        self.group_entities(handle).to_vec()
    }

    /// Calls `f` for every entity matching `matcher` at call time.
    ///
    /// `f` may mutate the world. Entities destroyed by an earlier call are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error from `f`.
    pub fn for_each<F>(&mut self, matcher: &Matcher, mut f: F) -> EcsResult<()>
    where
        F: FnMut(&mut World, EntityId) -> EcsResult<()>,
    {
        for entity in self.query(matcher) {
            if self.is_live(entity) {
                f(self, entity)?;
            }
        }
        Ok(())
    }

    /// Counters for debug output.
    #[must_use]
    pub fn stats(&self) -> WorldStats {
        WorldStats {
            live_entities: self.registry.alive_count(),
            recycled: self.registry.recycled_count(),
            storages: self.storages.iter().filter(|slot| slot.is_some()).count(),
            groups: self.groups.len(),
            indexed_types: self.groups.indexed_types(),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Position(f32, f32);
    impl Component for Position {
        const ID: u8 = 0;
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Velocity(f32, f32);
    impl Component for Velocity {
        const ID: u8 = 1;
    }

    #[derive(Debug)]
    struct Impostor;
    impl Component for Impostor {
        const ID: u8 = 0;
    }

    #[derive(Debug)]
    struct TooHigh;
    impl Component for TooHigh {
        const ID: u8 = 64;
    }

    fn movers() -> Matcher {
        Matcher::all_of(ComponentMask::of::<Position>().with::<Velocity>())
    }

    #[test]
    fn test_add_get_remove() {
        let mut world = World::new();
        let e = world.create_entity();

        world.add_component(e, Position(1.0, 2.0)).unwrap();
        assert_eq!(world.get::<Position>(e), Some(&Position(1.0, 2.0)));
        assert!(world.has::<Position>(e));
        assert!(world.entity(e).unwrap().has_component(Position::ID));

        world.get_mut::<Position>(e).unwrap().0 = 5.0;
        assert_eq!(world.remove_component::<Position>(e), Ok(Position(5.0, 2.0)));
        assert!(!world.has::<Position>(e));
        assert!(!world.entity(e).unwrap().has_component(Position::ID));
    }

    #[test]
    fn test_errors() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, Position(0.0, 0.0)).unwrap();

        assert!(matches!(
            world.add_component(e, Position(1.0, 1.0)),
            Err(EcsError::DuplicateComponent { .. })
        ));
        assert!(matches!(
            world.remove_component::<Velocity>(e),
            Err(EcsError::MissingComponent { .. })
        ));
        assert!(matches!(
            world.component::<Velocity>(e),
            Err(EcsError::MissingComponent { .. })
        ));

        world.destroy_entity(e).unwrap();
        assert_eq!(world.destroy_entity(e), Err(EcsError::InvalidEntity(e)));
        assert_eq!(
            world.add_component(e, Velocity(0.0, 0.0)),
            Err(EcsError::InvalidEntity(e))
        );
        assert_eq!(world.component::<Position>(e), Err(EcsError::InvalidEntity(e)));
    }

    #[test]
    fn test_component_id_conflict() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, Position(0.0, 0.0)).unwrap();

        let err = world.add_component(e, Impostor).unwrap_err();
        assert!(matches!(err, EcsError::ComponentIdConflict { id: 0, .. }));
        assert!(matches!(
            world.add_component(e, TooHigh),
            Err(EcsError::ComponentIdOutOfRange { id: 64, .. })
        ));
    }

    #[test]
    fn test_destroy_clears_storages() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, Position(0.0, 0.0)).unwrap();
        world.add_component(e, Velocity(1.0, 1.0)).unwrap();

        world.destroy_entity(e).unwrap();
        assert!(world.storage::<Position>().unwrap().is_empty());
        assert!(world.storage::<Velocity>().unwrap().is_empty());

        let reused = world.create_entity();
        assert_eq!(reused.index(), e.index());
        assert!(!world.has::<Position>(reused));
    }

    #[test]
    fn test_group_tracks_mutations() {
        let mut world = World::new();
        let g = world.group(&movers());

        let a = world.create_entity();
        world.add_component(a, Position(0.0, 0.0)).unwrap();
        assert!(world.group_entities(g).is_empty());

        world.add_component(a, Velocity(1.0, 0.0)).unwrap();
        assert!(!world.is_group_valid(g));
        assert_eq!(world.group_entities(g), &[a]);
        assert!(world.is_group_valid(g));

        world.remove_component::<Position>(a).unwrap();
        assert!(world.group_entities(g).is_empty());
    }

    #[test]
    fn test_group_drops_destroyed_entity() {
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();
        for &e in &[a, b] {
            world.add_component(e, Position(0.0, 0.0)).unwrap();
            world.add_component(e, Velocity(0.0, 0.0)).unwrap();
        }
        let g = world.group(&movers());
        assert_eq!(world.group_entities(g), &[a, b]);

        world.destroy_entity(a).unwrap();
        assert_eq!(world.group_entities(g), &[b]);
    }

    #[test]
    fn test_none_of_group_sees_new_entities() {
        let mut world = World::new();
        let statics = Matcher::none_of(ComponentMask::of::<Velocity>());
        assert!(world.query(&statics).is_empty());

        let e = world.create_entity();
        assert_eq!(world.query(&statics), vec![e]);

        world.add_component(e, Velocity(0.0, 0.0)).unwrap();
        assert!(world.query(&statics).is_empty());
    }

    #[test]
    fn test_same_matcher_same_handle() {
        let mut world = World::new();
        let a = world.group(&movers());
        let b = world.group(&Matcher::all_of(
            ComponentMask::of::<Velocity>().with::<Position>(),
        ));
        assert_eq!(a, b);
        assert_eq!(world.stats().groups, 1);
    }

    #[test]
    fn test_for_each_mutates() {
        let mut world = World::new();
        for i in 0..3 {
            let e = world.create_entity();
            world.add_component(e, Position(i as f32, 0.0)).unwrap();
            world.add_component(e, Velocity(1.0, 0.0)).unwrap();
        }

        world
            .for_each(&movers(), |world, e| {
                let v = *world.component::<Velocity>(e)?;
                let p = world.component_mut::<Position>(e)?;
                p.0 += v.0;
                Ok(())
            })
            .unwrap();

        let xs: Vec<f32> = world
            .storage::<Position>()
            .unwrap()
            .values()
            .iter()
            .map(|p| p.0)
            .collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_destroy_all_and_stats() {
        let mut world = World::new();
        for _ in 0..5 {
            let e = world.create_entity();
            world.add_component(e, Position(0.0, 0.0)).unwrap();
        }
        world.group(&movers());

        world.destroy_all_entities();
        let stats = world.stats();
        assert_eq!(stats.live_entities, 0);
        assert_eq!(stats.recycled, 5);
        assert_eq!(stats.storages, 1);
        assert_eq!(stats.groups, 1);
        assert_eq!(stats.indexed_types, 2);
        assert!(world.storage::<Position>().unwrap().is_empty());
    }
}
