use std::fmt;

use serde::{Deserialize, Serialize};

use crate::position::Position;

/// Identifier of a room within its level: the room's creation index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(pub usize);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room#{}", self.0)
    }
}

/// What occupies a grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileState {
    /// Nothing; outside the walkable map.
    #[default]
    Void,
    /// Solid wall.
    Wall,
    /// Walkable floor.
    Floor,
}

impl TileState {
    /// Returns true for walkable cells.
    pub fn is_walkable(self) -> bool {
        self == TileState::Floor
    }

    /// Single-character map symbol.
    pub fn symbol(self) -> char {
        match self {
            TileState::Void => ' ',
            TileState::Wall => '#',
            TileState::Floor => '.',
        }
    }
}

/// Non-owning reference to a tile: its room plus local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileRef {
    /// Owning room.
    pub room: RoomId,
    /// Coordinates within the room.
    pub local: Position,
}

impl fmt::Display for TileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.room, self.local)
    }
}

/// A single grid cell of a room.
///
/// Tiles are created with their room and change state only through the
/// room's region edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    room: RoomId,
    local: Position,
    state: TileState,
}

impl Tile {
    pub(crate) fn new(room: RoomId, local: Position) -> Self {
        Self {
            room,
            local,
            state: TileState::Void,
        }
    }

    /// The owning room.
    pub fn room(&self) -> RoomId {
        self.room
    }

    /// Coordinates within the owning room.
    pub fn local(&self) -> Position {
        self.local
    }

    /// Current state.
    pub fn state(&self) -> TileState {
        self.state
    }

    /// A reference that can be stored without borrowing the room.
    pub fn tile_ref(&self) -> TileRef {
        TileRef {
            room: self.room,
            local: self.local,
        }
    }

    pub(crate) fn set_state(&mut self, state: TileState) {
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_floor_is_walkable() {
        assert!(TileState::Floor.is_walkable());
        assert!(!TileState::Wall.is_walkable());
        assert!(!TileState::default().is_walkable());
    }

    #[test]
    fn tile_ref_display() {
        let r = TileRef {
            room: RoomId(5),
            local: Position::new(1, 2),
        };
        assert_eq!(r.to_string(), "room#5(1, 2)");
    }

    #[test]
    fn tiles_serialize_as_plain_data() {
        let tile = Tile::new(RoomId(2), Position::new(3, 4));
        let json = serde_json::to_value(&tile).unwrap();
        assert_eq!(json["room"], 2);
        assert_eq!(json["state"], "void");
        let back: Tile = serde_json::from_value(json).unwrap();
        assert_eq!(back, tile);
    }
}
