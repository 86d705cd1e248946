use crate::entity::EntityId;
use crate::tile::{RoomId, TileRef};

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when building entities or manipulating a level.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The component type has no no-argument constructor.
    #[error("component type \"{0}\" cannot be constructed")]
    NotConstructible(String),

    /// A component type name was registered twice.
    #[error("component type already registered: \"{0}\"")]
    DuplicateComponentType(String),

    /// No blueprint exists for the requested entity class.
    #[error("unknown entity class: \"{0}\"")]
    UnknownEntityClass(String),

    /// A blueprint names a component type that is not registered.
    #[error("entity class \"{class}\" uses unknown component type \"{component}\"")]
    UnknownComponentType {
        /// The entity class being built.
        class: String,
        /// The unregistered component type name.
        component: String,
    },

    /// A blueprint's `base` chain loops back on itself.
    #[error("entity class \"{0}\" inherits from itself")]
    BlueprintCycle(String),

    /// An `entity` definition is missing required data.
    #[error("invalid entity definition: {0}")]
    InvalidBlueprint(String),

    /// A component was attached to an entity other than its owner.
    #[error("component \"{component}\" belongs to {owner}, not {entity}")]
    ForeignComponent {
        /// The component type name.
        component: String,
        /// The entity the component was created for.
        owner: EntityId,
        /// The entity it was attached to.
        entity: EntityId,
    },

    /// The requested entity does not exist in the level.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// The requested room does not exist in the level.
    #[error("room not found: {0}")]
    RoomNotFound(RoomId),

    /// The tile reference does not name a tile of the level.
    #[error("no such tile: {0}")]
    InvalidTile(TileRef),
}
