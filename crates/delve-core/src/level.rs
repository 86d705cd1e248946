use std::collections::{BTreeMap, HashMap};

use log::{debug, trace};

use crate::entity::{Entity, EntityId};
use crate::error::{CoreError, CoreResult};
use crate::factory::EntityFactory;
use crate::position::Position;
use crate::rect::Rectangle;
use crate::room::Room;
use crate::tile::{RoomId, Tile, TileRef};

/// The rooms of one dungeon level and the entities in them.
///
/// Rooms are addressed by [`RoomId`], entities by [`EntityId`]. Entities
/// refer to their tile by [`TileRef`]; the level keeps the reverse index.
#[derive(Debug, Default)]
pub struct Level {
    rooms: Vec<Room>,
    entities: BTreeMap<EntityId, Entity>,
    placements: HashMap<TileRef, Vec<EntityId>>,
    next_entity: u32,
}

impl Level {
    /// Create an empty level.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Rooms
    // -----------------------------------------------------------------------

    /// Create a void room covering `rect` in level coordinates.
    pub fn create_room(&mut self, rect: Rectangle) -> &mut Room {
        let id = RoomId(self.rooms.len());
        trace!("creating {id} at {rect}");
        self.rooms.push(Room::new(id, rect));
        let last = self.rooms.len() - 1;
        &mut self.rooms[last]
    }

    /// Look up a room.
    pub fn room(&self, id: RoomId) -> CoreResult<&Room> {
        self.rooms.get(id.0).ok_or(CoreError::RoomNotFound(id))
    }

    /// Look up a room for editing.
    pub fn room_mut(&mut self, id: RoomId) -> CoreResult<&mut Room> {
        self.rooms.get_mut(id.0).ok_or(CoreError::RoomNotFound(id))
    }

    /// All rooms in creation order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    /// Number of rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// The first-created room covering a level position.
    pub fn room_at(&self, global: Position) -> Option<&Room> {
        self.rooms.iter().find(|r| r.rect().contains(global))
    }

    /// The tile at a level position.
    pub fn tile_at(&self, global: Position) -> Option<&Tile> {
        self.room_at(global).and_then(|r| r.tile_at(global))
    }

    /// Reference to the tile at a level position.
    pub fn tile_ref_at(&self, global: Position) -> Option<TileRef> {
        self.tile_at(global).map(Tile::tile_ref)
    }

    /// Resolve a tile reference.
    pub fn tile(&self, tile: TileRef) -> Option<&Tile> {
        self.rooms.get(tile.room.0).and_then(|r| r.tile(tile.local))
    }

    /// Level coordinates of a tile reference.
    pub fn global_position(&self, tile: TileRef) -> Option<Position> {
        self.tile(tile)?;
        self.rooms.get(tile.room.0).map(|r| r.to_global(tile.local))
    }

    /// Smallest rectangle covering every room.
    pub fn bounds(&self) -> Rectangle {
        let mut rooms = self.rooms.iter().map(Room::rect);
        let Some(first) = rooms.next() else {
            return Rectangle::default();
        };
        rooms.fold(first, |acc, r| {
            Rectangle::from_edges(
                acc.left().min(r.left()),
                acc.top().min(r.top()),
                acc.right().max(r.right()),
                acc.bottom().max(r.bottom()),
            )
        })
    }

    // -----------------------------------------------------------------------
    // Entities
    // -----------------------------------------------------------------------

    /// Build an entity of `class` and add it to the level, unplaced.
    ///
    /// Components are initialized once the entity is complete.
    pub fn spawn(&mut self, factory: &EntityFactory, class: &str) -> CoreResult<EntityId> {
        let id = EntityId(self.next_entity);
        let mut entity = factory.create(class, id)?;
        self.next_entity += 1;
        entity.initialize();
        debug!("spawned {id} ({class})");
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Spawn an entity and place it on `tile`.
    ///
    /// Nothing is spawned if the tile does not exist.
    pub fn spawn_at(&mut self, factory: &EntityFactory, class: &str, tile: TileRef) -> CoreResult<EntityId> {
        if self.tile(tile).is_none() {
            return Err(CoreError::InvalidTile(tile));
        }
        let id = self.spawn(factory, class)?;
        self.place(id, tile)?;
        Ok(id)
    }

    /// Move an entity onto `tile`, removing it from its previous tile.
    pub fn place(&mut self, id: EntityId, tile: TileRef) -> CoreResult<()> {
        let position = self.global_position(tile).ok_or(CoreError::InvalidTile(tile))?;
        let entity = self.entities.get_mut(&id).ok_or(CoreError::EntityNotFound(id))?;

        if let Some(previous) = entity.tile() {
            unplace(&mut self.placements, id, previous);
        }

        entity.set_location(Some(tile), Some(position));
        self.placements.entry(tile).or_default().push(id);
        trace!("placed {id} on {tile}");
        Ok(())
    }

    /// Entities on `tile`, in placement order.
    pub fn entities_at(&self, tile: TileRef) -> &[EntityId] {
        self.placements.get(&tile).map(Vec::as_slice).unwrap_or_default()
    }

    /// Look up an entity.
    pub fn entity(&self, id: EntityId) -> CoreResult<&Entity> {
        self.entities.get(&id).ok_or(CoreError::EntityNotFound(id))
    }

    /// Look up an entity for editing.
    pub fn entity_mut(&mut self, id: EntityId) -> CoreResult<&mut Entity> {
        self.entities.get_mut(&id).ok_or(CoreError::EntityNotFound(id))
    }

    /// All entities in id order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Number of entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Remove an entity, running its components' `on_remove` hooks while it
    /// is still placed.
    pub fn remove_entity(&mut self, id: EntityId) -> CoreResult<Entity> {
        let mut entity = self.entities.remove(&id).ok_or(CoreError::EntityNotFound(id))?;
        entity.remove();
        if let Some(tile) = entity.tile() {
            unplace(&mut self.placements, id, tile);
        }
        entity.set_location(None, None);
        debug!("removed {id}");
        Ok(entity)
    }

    /// Advance every entity by one tick, in id order.
    pub fn think(&mut self, tick: u64) {
        for entity in self.entities.values_mut() {
            entity.think(tick);
        }
    }
}

fn unplace(placements: &mut HashMap<TileRef, Vec<EntityId>>, id: EntityId, tile: TileRef) {
    if let Some(list) = placements.get_mut(&tile) {
        list.retain(|e| *e != id);
        if list.is_empty() {
            placements.remove(&tile);
        }
    }
}
