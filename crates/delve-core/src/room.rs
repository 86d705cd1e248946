use crate::position::Position;
use crate::rect::Rectangle;
use crate::tile::{RoomId, Tile, TileState};

/// A fixed-size grid of tiles placed at a rectangle of the level.
///
/// The grid is fully materialized on construction with every tile
/// [`TileState::Void`]. Region edits take rectangles in room-local
/// coordinates and are clipped to the room, so callers may pass rectangles
/// that overhang or miss the room entirely.
#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    rect: Rectangle,
    tiles: Vec<Tile>,
}

impl Room {
    /// Create a room covering `rect` in level coordinates.
    pub fn new(id: RoomId, rect: Rectangle) -> Self {
        let bounds = Rectangle::sized(rect.width.max(0), rect.height.max(0));
        let tiles = bounds.positions().map(|p| Tile::new(id, p)).collect();
        Self {
            id,
            rect: Rectangle::new(rect.x, rect.y, bounds.width, bounds.height),
            tiles,
        }
    }

    /// This room's identifier.
    pub fn id(&self) -> RoomId {
        self.id
    }

    /// Placement in level coordinates.
    pub fn rect(&self) -> Rectangle {
        self.rect
    }

    /// Room-local bounds: the room's size at the origin.
    pub fn bounds(&self) -> Rectangle {
        Rectangle::sized(self.rect.width, self.rect.height)
    }

    /// Width in tiles.
    pub fn width(&self) -> i32 {
        self.rect.width
    }

    /// Height in tiles.
    pub fn height(&self) -> i32 {
        self.rect.height
    }

    /// Left edge in level coordinates.
    pub fn left(&self) -> i32 {
        self.rect.left()
    }

    /// Top edge in level coordinates.
    pub fn top(&self) -> i32 {
        self.rect.top()
    }

    /// Right edge in level coordinates (exclusive).
    pub fn right(&self) -> i32 {
        self.rect.right()
    }

    /// Bottom edge in level coordinates (exclusive).
    pub fn bottom(&self) -> i32 {
        self.rect.bottom()
    }

    fn index(&self, local: Position) -> Option<usize> {
        self.bounds()
            .contains(local)
            .then(|| (local.y * self.rect.width + local.x) as usize)
    }

    /// The tile at room-local coordinates.
    pub fn tile(&self, local: Position) -> Option<&Tile> {
        self.index(local).map(|i| &self.tiles[i])
    }

    /// The tile at level coordinates, if it lies in this room.
    pub fn tile_at(&self, global: Position) -> Option<&Tile> {
        let origin = self.rect.top_left();
        let local = Position::new(global.x.checked_sub(origin.x)?, global.y.checked_sub(origin.y)?);
        self.tile(local)
    }

    /// Convert level coordinates to room-local coordinates.
    pub fn to_local(&self, global: Position) -> Position {
        global - self.rect.top_left()
    }

    /// Convert room-local coordinates to level coordinates.
    pub fn to_global(&self, local: Position) -> Position {
        local + self.rect.top_left()
    }

    /// Set every tile in `rect ∩ bounds` to `state`. Returns the number of
    /// tiles covered.
    pub fn fill(&mut self, rect: Rectangle, state: TileState) -> usize {
        let clipped = rect.intersection(&self.bounds());
        let mut covered = 0;
        for p in clipped.positions() {
            if let Some(i) = self.index(p) {
                self.tiles[i].set_state(state);
                covered += 1;
            }
        }
        covered
    }

    /// Turn every tile in `rect ∩ bounds` into floor.
    pub fn add_geometry(&mut self, rect: Rectangle) -> usize {
        self.fill(rect, TileState::Floor)
    }

    /// Clear every tile in `rect ∩ bounds` back to void.
    pub fn subtract_geometry(&mut self, rect: Rectangle) -> usize {
        self.fill(rect, TileState::Void)
    }

    /// All tiles, row by row from the top-left corner.
    pub fn tiles(&self) -> std::slice::Iter<'_, Tile> {
        self.tiles.iter()
    }

    /// Number of tiles in `state`.
    pub fn count(&self, state: TileState) -> usize {
        self.tiles.iter().filter(|t| t.state() == state).count()
    }

    /// One string per row using [`TileState::symbol`].
    pub fn rows(&self) -> Vec<String> {
        self.tiles
            .chunks(self.rect.width.max(1) as usize)
            .map(|row| row.iter().map(|t| t.state().symbol()).collect())
            .collect()
    }
}

impl<'a> IntoIterator for &'a Room {
    type Item = &'a Tile;
    type IntoIter = std::slice::Iter<'a, Tile>;

    fn into_iter(self) -> Self::IntoIter {
        self.tiles()
    }
}
