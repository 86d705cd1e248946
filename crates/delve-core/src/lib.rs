//! Core types for Delve: tile geometry, rooms, levels, entities, and
//! components.
//!
//! Entities are assembled by an [`EntityFactory`] from blueprints loaded as
//! `entity` definitions, with component properties bound from the same
//! markup. A [`Level`] owns rooms of tiles and the entities placed on them.

/// Components, their runtime type descriptors, and the component library.
pub mod component;
/// Entities and their identifiers.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// Blueprints and the entity factory.
pub mod factory;
/// The level: rooms plus the entities placed in them.
pub mod level;
/// Integer grid positions.
pub mod position;
/// Axis-aligned grid rectangles.
pub mod rect;
/// Rooms and their region edits.
pub mod room;
/// Tiles and tile references.
pub mod tile;

/// Re-export component types.
pub use component::{BoundComponent, Component, ComponentContext, ComponentLibrary, ComponentType, create_component};
/// Re-export entity types.
pub use entity::{Entity, EntityId};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export factory types.
pub use factory::{ENTITY_DEFINITION, EntityBlueprint, EntityFactory};
/// Re-export the level.
pub use level::Level;
/// Re-export geometry types.
pub use position::Position;
pub use rect::Rectangle;
pub use room::Room;
/// Re-export tile types.
pub use tile::{RoomId, Tile, TileRef, TileState};
