//! # Component Storage
//!
//! Sparse-set storage, one per component type.
//!
//! ```text
//! sparse:  [ 1, -, 0, -, 2 ]      indexed by EntityId::index()
//! packed:  [ e2, e0, e4 ]         owner of each dense slot
//! dense:   [ c2, c0, c4 ]         component values
//! ```
//!
//! Invariant: for every stored entity `e`, `packed[sparse[e.index()]] == e`.
//! Removal swaps the last dense slot into the hole, so iteration order is
//! insertion order perturbed by removals.

use std::any::Any;

use super::component::{component_name, Component};
use super::entity::EntityId;
use crate::error::{EcsError, EcsResult};

const ABSENT: u32 = u32::MAX;

/// Sparse-set storage for a single component type.
///
/// Values are added and removed through the [`World`](crate::World) so the
/// entity masks and group cache stay in sync. Read and in-place write access
/// is public.
#[derive(Debug)]
pub struct ComponentStorage<C> {
    dense: Vec<C>,
    packed: Vec<EntityId>,
    sparse: Vec<u32>,
}

impl<C: Component> ComponentStorage<C> {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dense: Vec::new(),
            packed: Vec::new(),
            sparse: Vec::new(),
        }
    }

    /// Creates a storage with room for `capacity` values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            dense: Vec::with_capacity(capacity),
            packed: Vec::with_capacity(capacity),
            sparse: Vec::with_capacity(capacity),
        }
    }

    /// Dense slot of `entity`, if stored.
    #[inline]
    #[must_use]
    pub fn dense_index(&self, entity: EntityId) -> Option<usize> {
        let slot = *self.sparse.get(entity.index() as usize)?;
        if slot == ABSENT {
            return None;
        }
        let slot = slot as usize;
        (self.packed.get(slot) == Some(&entity)).then_some(slot)
    }

    /// Checks if `entity` has a value here.
    #[inline]
    #[must_use]
    pub fn has(&self, entity: EntityId) -> bool {
        self.dense_index(entity).is_some()
    }

    /// Value for `entity`.
    #[inline]
    #[must_use]
    pub fn get(&self, entity: EntityId) -> Option<&C> {
        self.dense_index(entity).map(|slot| &self.dense[slot])
    }

    /// Mutable value for `entity`.
    #[inline]
    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut C> {
        self.dense_index(entity).map(move |slot| &mut self.dense[slot])
    }

    /// Inserts a value.
    ///
    /// # Errors
    ///
    /// [`EcsError::DuplicateComponent`] if `entity` already has one.
    pub(crate) fn insert(&mut self, entity: EntityId, value: C) -> EcsResult<()> {
        if self.has(entity) {
            return Err(EcsError::DuplicateComponent {
                entity,
                component: component_name::<C>(),
            });
        }
        let index = entity.index() as usize;
        if index >= self.sparse.len() {
            self.sparse.resize(index + 1, ABSENT);
        }
        // Dense length never exceeds the live entity count, which fits u32.
        self.sparse[index] = u32::try_from(self.dense.len()).unwrap_or(ABSENT);
        self.packed.push(entity);
        self.dense.push(value);
        Ok(())
    }

    /// Swap-removes the value for `entity` and returns it.
    ///
    /// # Errors
    ///
    /// [`EcsError::MissingComponent`] if `entity` has none.
    pub(crate) fn remove(&mut self, entity: EntityId) -> EcsResult<C> {
        let slot = self
            .dense_index(entity)
            .ok_or(EcsError::MissingComponent {
                entity,
                component: component_name::<C>(),
            })?;

        let last = self.dense.len() - 1;
        if slot != last {
            let moved = self.packed[last];
            self.sparse[moved.index() as usize] = self.sparse[entity.index() as usize];
        }
        self.sparse[entity.index() as usize] = ABSENT;
        self.packed.swap_remove(slot);
        Ok(self.dense.swap_remove(slot))
    }

    /// Number of stored values.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// True if nothing is stored.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Owners in dense order.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[EntityId] {
        &self.packed
    }

    /// Values in dense order.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[C] {
        &self.dense
    }

    /// Mutable values in dense order.
    #[inline]
    pub fn values_mut(&mut self) -> &mut [C] {
        &mut self.dense
    }

    /// Iterates `(owner, value)` in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &C)> {
        self.packed.iter().copied().zip(self.dense.iter())
    }

    /// Iterates `(owner, value)` mutably in dense order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut C)> {
        self.packed.iter().copied().zip(self.dense.iter_mut())
    }
}

impl<C: Component> Default for ComponentStorage<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view used by the world to manage storages it cannot name.
pub(crate) trait ErasedStorage: Any {
    /// Drops the value for `entity` if present.
    fn remove_entity(&mut self, entity: EntityId) -> bool;
    /// Number of stored values.
    fn stored(&self) -> usize;
    /// Name of the component type.
    fn type_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Component> ErasedStorage for ComponentStorage<C> {
    fn remove_entity(&mut self, entity: EntityId) -> bool {
        self.remove(entity).is_ok()
    }

    fn stored(&self) -> usize {
        self.len()
    }

    fn type_name(&self) -> &'static str {
        component_name::<C>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
