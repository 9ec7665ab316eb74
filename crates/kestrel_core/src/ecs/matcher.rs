//! # Matchers
//!
//! A matcher is a predicate over an entity's [`ComponentMask`]. Groups are
//! keyed by matcher: equal matchers share one cached group.
//!
//! ## Hashing
//!
//! Each variant folds its component ids with XOR after multiplying by a
//! per-type prime, then XORs in `count * salt` where the salt is specific to
//! the variant. The hash is only a bucket key. Different matchers can
//! collide (`AllOf{1,2}` and `AnyOf{0}` both hash to 659), so the cache
//! always confirms a hit with structural equality.

use super::component::ComponentMask;

const COMPONENT_FACTOR: u64 = 647;
const ALL_OF_FACTOR: u64 = 653;
const ANY_OF_FACTOR: u64 = 659;
const NONE_OF_FACTOR: u64 = 661;
const COMPOUND_FACTOR: u64 = 673;

/// Predicate selecting entities by the component types they own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Matcher {
    /// Entity has every listed type.
    AllOf(ComponentMask),
    /// Entity has at least one listed type.
    AnyOf(ComponentMask),
    /// Entity has none of the listed types.
    NoneOf(ComponentMask),
    /// Every sub-matcher holds.
    Compound(Vec<Matcher>),
}

impl Matcher {
    /// `AllOf` over `mask`.
    #[must_use]
    pub const fn all_of(mask: ComponentMask) -> Self {
        Self::AllOf(mask)
    }

    /// `AnyOf` over `mask`.
    #[must_use]
    pub const fn any_of(mask: ComponentMask) -> Self {
        Self::AnyOf(mask)
    }

    /// `NoneOf` over `mask`.
    #[must_use]
    pub const fn none_of(mask: ComponentMask) -> Self {
        Self::NoneOf(mask)
    }

    /// Conjunction of several matchers.
    ///
    /// A single matcher is returned unwrapped so `compound([m])` and `m`
    /// share a group.
    #[must_use]
    pub fn compound(matchers: impl IntoIterator<Item = Matcher>) -> Self {
        let mut matchers: Vec<_> = matchers.into_iter().collect();
        if matchers.len() == 1 {
            matchers.swap_remove(0)
        } else {
            Self::Compound(matchers)
        }
    }

    /// Evaluates the matcher against an entity's mask.
    #[must_use]
    pub fn matches(&self, mask: ComponentMask) -> bool {
        match self {
            Self::AllOf(required) => mask.contains_all(*required),
            Self::AnyOf(wanted) => mask.intersects(*wanted),
            Self::NoneOf(excluded) => !mask.intersects(*excluded),
            Self::Compound(all) => all.iter().all(|m| m.matches(mask)),
        }
    }

    /// Every component type whose presence can change the result.
    #[must_use]
    pub fn dependencies(&self) -> ComponentMask {
        match self {
            Self::AllOf(mask) | Self::AnyOf(mask) | Self::NoneOf(mask) => *mask,
            Self::Compound(all) => all
                .iter()
                .fold(ComponentMask::EMPTY, |acc, m| acc.union(m.dependencies())),
        }
    }

    /// Bucket key for the group cache. Not collision-free.
    #[must_use]
    pub fn structural_hash(&self) -> u64 {
        match self {
            Self::AllOf(mask) => fold_ids(*mask, ALL_OF_FACTOR),
            Self::AnyOf(mask) => fold_ids(*mask, ANY_OF_FACTOR),
            Self::NoneOf(mask) => fold_ids(*mask, NONE_OF_FACTOR),
            Self::Compound(all) => {
                if let [single] = all.as_slice() {
                    return single.structural_hash();
                }
                let folded = all.iter().fold(0, |acc, m| acc ^ m.structural_hash());
                folded ^ (all.len() as u64).wrapping_mul(COMPOUND_FACTOR)
            }
        }
    }
}

fn fold_ids(mask: ComponentMask, factor: u64) -> u64 {
    let folded = mask
        .ids()
        .fold(0, |acc, id| acc ^ u64::from(id).wrapping_mul(COMPONENT_FACTOR));
    folded ^ u64::from(mask.len()).wrapping_mul(factor)
}
