//! # Component System
//!
//! Components are plain data attached to entities. Each component type gets
//! its own typed [`ComponentStorage`](super::ComponentStorage) and a bit in
//! the 64-bit [`ComponentMask`].

use std::fmt;

/// Marker trait for ECS components.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Copy, Debug, Default)]
/// struct Transform {
///     position: Vec2,
/// }
///
/// impl Component for Transform {
///     const ID: u8 = 0;
/// }
/// ```
pub trait Component: 'static {
    /// Unique identifier for this component type (0-63).
    ///
    /// This ID is used for the component bitmask in entities and as the
    /// invalidation key of the group cache.
    const ID: u8;
}

/// Set of component ids, one bit per id.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ComponentMask(u64);

impl ComponentMask {
    /// No components.
    pub const EMPTY: Self = Self(0);

    /// Highest id plus one.
    pub const MAX_COMPONENTS: usize = 64;

    /// Wraps raw bits.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    const fn bit(id: u8) -> u64 {
        if (id as usize) < Self::MAX_COMPONENTS {
            1 << id
        } else {
            0
        }
    }

    /// Mask holding a single component type.
    #[inline]
    #[must_use]
    pub const fn of<C: Component>() -> Self {
        Self(Self::bit(C::ID))
    }

    /// Builds a mask from raw ids. Ids of 64 and above are ignored.
    #[must_use]
    pub fn from_ids(ids: impl IntoIterator<Item = u8>) -> Self {
        ids.into_iter().fold(Self::EMPTY, Self::with_id)
    }

    /// Adds a component type.
    #[inline]
    #[must_use]
    pub const fn with<C: Component>(self) -> Self {
        self.with_id(C::ID)
    }

    /// Adds an id.
    #[inline]
    #[must_use]
    pub const fn with_id(self, id: u8) -> Self {
        Self(self.0 | Self::bit(id))
    }

    /// Removes an id.
    #[inline]
    #[must_use]
    pub const fn without_id(self, id: u8) -> Self {
        Self(self.0 & !Self::bit(id))
    }

    /// Checks membership of an id.
    #[inline]
    #[must_use]
    pub const fn contains(self, id: u8) -> bool {
        let bit = Self::bit(id);
        bit != 0 && self.0 & bit != 0
    }

    /// True if every id of `other` is in `self`.
    #[inline]
    #[must_use]
    pub const fn contains_all(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if `self` and `other` share an id.
    #[inline]
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Union of both masks.
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// True if no ids are set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of ids set.
    #[inline]
    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Set ids in ascending order.
    pub fn ids(self) -> impl Iterator<Item = u8> {
        (0..64u8).filter(move |&id| self.contains(id))
    }
}

impl fmt::Debug for ComponentMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.ids()).finish()
    }
}

/// Short name of a component type, for errors and logs.
#[must_use]
pub fn component_name<C: Component>() -> &'static str {
    std::any::type_name::<C>()
}
