//! # Group Cache
//!
//! A group is the cached list of live entities satisfying a [`Matcher`].
//!
//! Groups are invalidated, never patched. Adding or removing a component of
//! type `T` marks every group that depends on `T` invalid; the next read
//! rebuilds it with a full scan of the registry. Rebuilds visit entities in
//! ascending index order, so group order is deterministic.

use std::collections::HashMap;

use super::component::ComponentMask;
use super::entity::{EntityId, EntityRegistry};
use super::matcher::Matcher;

/// Stable handle to a cached group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GroupHandle(usize);

impl GroupHandle {
    /// Position of the group in the cache.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct Group {
    matcher: Matcher,
    entities: Vec<EntityId>,
    valid: bool,
}

/// All groups of a world plus the indexes used to invalidate them.
#[derive(Debug)]
pub(crate) struct GroupCache {
    groups: Vec<Group>,
    /// Structural hash -> groups sharing it.
    by_hash: HashMap<u64, Vec<usize>>,
    /// Component id -> groups depending on it.
    by_type: Vec<Vec<usize>>,
    /// Groups that accept an entity with no components.
    empty_matching: Vec<usize>,
}

impl Default for GroupCache {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            by_hash: HashMap::new(),
            by_type: vec![Vec::new(); ComponentMask::MAX_COMPONENTS],
            empty_matching: Vec::new(),
        }
    }
}

impl GroupCache {
    /// Canonical group for `matcher`, creating an invalid one on first use.
    pub(crate) fn handle_for(&mut self, matcher: &Matcher) -> GroupHandle {
        let hash = matcher.structural_hash();
        let bucket = self.by_hash.entry(hash).or_default();
        if let Some(&index) = bucket.iter().find(|&&i| self.groups[i].matcher == *matcher) {
            return GroupHandle(index);
        }

        let index = self.groups.len();
        bucket.push(index);
        for id in matcher.dependencies().ids() {
            self.by_type[usize::from(id)].push(index);
        }
        if matcher.matches(ComponentMask::EMPTY) {
            self.empty_matching.push(index);
        }
        self.groups.push(Group {
            matcher: matcher.clone(),
            entities: Vec::new(),
            valid: false,
        });
        tracing::trace!(group = index, hash, ?matcher, "group created");
        GroupHandle(index)
    }

    /// Entities of a group, rebuilding it first if invalid.
    pub(crate) fn entities(&mut self, handle: GroupHandle, registry: &EntityRegistry) -> &[EntityId] {
        let group = &mut self.groups[handle.0];
        if !group.valid {
            group.entities.clear();
            group.entities.extend(
                registry
                    .iter_alive()
                    .filter(|slot| group.matcher.matches(slot.component_mask))
                    .map(|slot| slot.id),
            );
            group.valid = true;
        }
        &group.entities
    }

    pub(crate) fn matcher(&self, handle: GroupHandle) -> Option<&Matcher> {
        self.groups.get(handle.0).map(|g| &g.matcher)
    }

    pub(crate) fn is_valid(&self, handle: GroupHandle) -> bool {
        self.groups.get(handle.0).is_some_and(|g| g.valid)
    }

    /// A component of type `id` was added or removed somewhere.
    pub(crate) fn invalidate_type(&mut self, id: u8) {
        if let Some(dependents) = self.by_type.get(usize::from(id)) {
            for &index in dependents {
                self.groups[index].valid = false;
            }
        }
    }

    /// A fresh entity with no components appeared.
    pub(crate) fn invalidate_empty_matching(&mut self) {
        for &index in &self.empty_matching {
            self.groups[index].valid = false;
        }
    }

    /// An entity with `mask` disappeared.
    pub(crate) fn invalidate_matching(&mut self, mask: ComponentMask) {
        for group in &mut self.groups {
            if group.valid && group.matcher.matches(mask) {
                group.valid = false;
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.groups.len()
    }

    /// Number of component types with at least one dependent group.
    pub(crate) fn indexed_types(&self) -> usize {
        self.by_type.iter().filter(|groups| !groups.is_empty()).count()
    }
}
