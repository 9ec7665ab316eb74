//! # Entity Management
//!
//! Entities are lightweight identifiers consisting of:
//! - An index into the sparse arrays of every component storage
//! - A generation counter so a recycled index never aliases a dead id
//!
//! The [`EntityRegistry`] owns the slots and the free list. Freed indices
//! are reused last-in, first-out.

use std::fmt;

use crate::ecs::component::ComponentMask;
use crate::error::{EcsError, EcsResult};

/// Unique identifier for an entity.
///
/// The ID is split into two parts:
/// - Lower 32 bits: Index into storage sparse arrays
/// - Upper 32 bits: Generation counter for detecting stale references
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new entity ID from index and generation.
    ///
    /// # Arguments
    ///
    /// * `index` - The slot index (0 to 2^32-2)
    /// * `generation` - The generation counter (0 to 2^32-1)
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the index portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Raw 64-bit value.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Null/invalid entity ID.
    pub const NULL: Self = Self(u64::MAX);

    /// Checks if this entity ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "null")
        } else {
            write!(f, "{}v{}", self.index(), self.generation())
        }
    }
}

/// Entity slot with its component mask.
///
/// The mask mirrors which storages hold a value for this entity, so group
/// matching never has to touch the storages themselves.
#[derive(Clone, Copy, Debug)]
pub struct Entity {
    /// The id currently (or last) issued for this slot.
    pub id: EntityId,
    /// Bitmask of attached components (up to 64 component types).
    pub component_mask: ComponentMask,
    /// Whether this entity slot is currently alive.
    pub alive: bool,
}

impl Entity {
    /// Creates a live entity slot with no components.
    #[inline]
    #[must_use]
    pub const fn new(id: EntityId) -> Self {
        Self {
            id,
            component_mask: ComponentMask::EMPTY,
            alive: true,
        }
    }

    /// Checks if this entity has a specific component.
    ///
    /// # Arguments
    ///
    /// * `component_id` - The component type ID (0-63)
    #[inline]
    #[must_use]
    pub const fn has_component(&self, component_id: u8) -> bool {
        self.component_mask.contains(component_id)
    }

    /// Adds a component flag to this entity.
    #[inline]
    pub fn add_component(&mut self, component_id: u8) {
        self.component_mask = self.component_mask.with_id(component_id);
    }

    /// Removes a component flag from this entity.
    #[inline]
    pub fn remove_component(&mut self, component_id: u8) {
        self.component_mask = self.component_mask.without_id(component_id);
    }
}

/// Issues and retires entity ids.
///
/// Single-threaded; owned by the [`World`](crate::World).
#[derive(Debug, Default)]
pub struct EntityRegistry {
    slots: Vec<Entity>,
    free_indices: Vec<u32>,
    alive_count: usize,
}

impl EntityRegistry {
    /// Creates an empty registry with room for `capacity` slots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_indices: Vec::new(),
            alive_count: 0,
        }
    }

    /// Issues an id: the most recently freed index with its generation
    /// bumped, otherwise the next never-used index.
    pub fn create(&mut self) -> EntityId {
        let id = if let Some(index) = self.free_indices.pop() {
            let slot = &mut self.slots[index as usize];
            let id = EntityId::new(index, slot.id.generation().wrapping_add(1));
            *slot = Entity::new(id);
            id
        } else {
            let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX - 1);
            let id = EntityId::new(index, 0);
            self.slots.push(Entity::new(id));
            id
        };
        self.alive_count += 1;
        id
    }

    /// Retires a live id, returning its final component mask.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidEntity`] if `id` is not live.
    pub fn destroy(&mut self, id: EntityId) -> EcsResult<ComponentMask> {
        let slot = self.slot_mut(id).ok_or(EcsError::InvalidEntity(id))?;
        let mask = slot.component_mask;
        slot.alive = false;
        slot.component_mask = ComponentMask::EMPTY;
        self.free_indices.push(id.index());
        self.alive_count -= 1;
        Ok(mask)
    }

    /// Checks if an id refers to a live entity.
    #[inline]
    #[must_use]
    pub fn is_live(&self, id: EntityId) -> bool {
        self.slot(id).is_some()
    }

    /// Live slot for `id`, or `None` if dead or stale.
    #[inline]
    #[must_use]
    pub fn slot(&self, id: EntityId) -> Option<&Entity> {
        if id.is_null() {
            return None;
        }
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.alive && slot.id == id)
    }

    /// Mutable live slot for `id`.
    #[inline]
    pub fn slot_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        if id.is_null() {
            return None;
        }
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.alive && slot.id == id)
    }

    /// Component mask of a live entity.
    #[must_use]
    pub fn mask(&self, id: EntityId) -> Option<ComponentMask> {
        self.slot(id).map(|slot| slot.component_mask)
    }

    /// Iterates over live entities in ascending index order.
    pub fn iter_alive(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().filter(|slot| slot.alive)
    }

    /// Number of live entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Number of freed indices waiting for reuse.
    #[inline]
    #[must_use]
    pub fn recycled_count(&self) -> usize {
        self.free_indices.len()
    }

    /// Slots ever allocated, live or dead.
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_roundtrip() {
        let id = EntityId::new(12345, 67890);
        assert_eq!(id.index(), 12345);
        assert_eq!(id.generation(), 67890);
        assert_eq!(id.to_string(), "12345v67890");
        assert_eq!(EntityId::NULL.to_string(), "null");
    }

    #[test]
    fn test_entity_component_mask() {
        let mut entity = Entity::new(EntityId::new(0, 0));
        assert!(!entity.has_component(5));

        entity.add_component(5);
        assert!(entity.has_component(5));

        entity.remove_component(5);
        assert!(!entity.has_component(5));
    }

    #[test]
    fn test_create_is_monotonic_without_frees() {
        let mut registry = EntityRegistry::default();
        let ids: Vec<_> = (0..4).map(|_| registry.create()).collect();
        let indices: Vec<_> = ids.iter().map(|id| id.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(registry.alive_count(), 4);
    }

    #[test]
    fn test_recycle_is_lifo() {
        let mut registry = EntityRegistry::default();
        let a = registry.create();
        let b = registry.create();
        let _c = registry.create();

        registry.destroy(a).unwrap();
        registry.destroy(b).unwrap();

        let first = registry.create();
        let second = registry.create();
        assert_eq!(first.index(), b.index());
        assert_eq!(second.index(), a.index());
        assert_eq!(first.generation(), b.generation() + 1);
    }

    #[test]
    fn test_stale_id_is_dead() {
        let mut registry = EntityRegistry::default();
        let a = registry.create();
        registry.destroy(a).unwrap();
        let reused = registry.create();

        assert_eq!(reused.index(), a.index());
        assert!(!registry.is_live(a));
        assert!(registry.is_live(reused));
        assert_eq!(registry.destroy(a), Err(EcsError::InvalidEntity(a)));
    }

    #[test]
    fn test_double_destroy() {
        let mut registry = EntityRegistry::default();
        let a = registry.create();
        assert!(registry.destroy(a).is_ok());
        assert_eq!(registry.destroy(a), Err(EcsError::InvalidEntity(a)));
        assert_eq!(registry.recycled_count(), 1);
        assert_eq!(registry.alive_count(), 0);
    }

    #[test]
    fn test_null_is_never_live() {
        let mut registry = EntityRegistry::default();
        registry.create();
        assert!(!registry.is_live(EntityId::NULL));
    }
}
