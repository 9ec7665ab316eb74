//! # ECS Error Types
//!
//! All errors that can occur while mutating a [`World`](crate::World) or
//! running a tick.

use thiserror::Error;

use crate::ecs::EntityId;

/// Errors that can occur in the ECS.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The entity was never created or has already been destroyed.
    #[error("invalid entity: {0}")]
    InvalidEntity(EntityId),

    /// The entity already owns a component of this type.
    #[error("entity {entity} already has component {component}")]
    DuplicateComponent {
        /// Target entity.
        entity: EntityId,
        /// Component type name.
        component: &'static str,
    },

    /// The entity does not own a component of this type.
    #[error("entity {entity} has no component {component}")]
    MissingComponent {
        /// Target entity.
        entity: EntityId,
        /// Component type name.
        component: &'static str,
    },

    /// Two Rust types declare the same component id.
    #[error("component id {id} claimed by {requested}, already used by {existing}")]
    ComponentIdConflict {
        /// The contested id.
        id: u8,
        /// Type registered first.
        existing: &'static str,
        /// Type that tried to register.
        requested: &'static str,
    },

    /// Component ids must fit the 64-bit mask.
    #[error("component {component} has id {id}, ids must be below 64")]
    ComponentIdOutOfRange {
        /// The bad id.
        id: u8,
        /// Component type name.
        component: &'static str,
    },

    /// An executer reported a game-level failure.
    #[error("executer failed: {0}")]
    Executer(String),

    /// A system's executer failed and the tick was aborted.
    #[error("system '{system}' failed: {source}")]
    SystemFault {
        /// Name of the failing system.
        system: String,
        /// The executer's error.
        #[source]
        source: Box<EcsError>,
    },
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;
