use chrono::Utc;
use delve_core::{EntityFactory, Level, Rectangle, Room, Tile, TileRef, TileState};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::GeneratorConfig;
use crate::error::GenResult;

/// Turn a caller seed into the seed actually used. Zero asks for a
/// time-derived seed; any other value, negative ones included, is kept
/// bit for bit.
pub fn resolve_seed(seed: i64) -> u64 {
    if seed != 0 {
        return seed as u64;
    }
    let derived = Utc::now().timestamp_micros().unsigned_abs();
    derived.max(1)
}

/// Which sides of a room have a neighbor in the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Neighbors {
    /// A room to the west.
    pub west: bool,
    /// A room to the north.
    pub north: bool,
    /// A room to the east.
    pub east: bool,
    /// A room to the south.
    pub south: bool,
}

/// Room-local doorway slots centered on each wall that has a neighbor.
pub fn doorway_slots(size: i32, neighbors: Neighbors) -> Vec<Rectangle> {
    let mid = size / 2 - 1;
    let far = size - 1;
    let mut slots = Vec::with_capacity(4);
    if neighbors.west {
        slots.push(Rectangle::new(0, mid, 1, 2));
    }
    if neighbors.north {
        slots.push(Rectangle::new(mid, 0, 2, 1));
    }
    if neighbors.east {
        slots.push(Rectangle::new(far, mid, 1, 2));
    }
    if neighbors.south {
        slots.push(Rectangle::new(mid, far, 2, 1));
    }
    slots
}

/// Builds levels as a grid of connected square rooms.
#[derive(Debug, Clone, Default)]
pub struct LevelGenerator {
    config: GeneratorConfig,
}

impl LevelGenerator {
    /// Create a generator with the given configuration.
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// The generator's configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a level.
    ///
    /// Rooms are created column by column: grid column `i` outer, row `j`
    /// inner. The random source is drawn once per floor tile, rooms in
    /// creation order and tiles row by row, so equal non-zero seeds give
    /// equal levels. Decorations come from `factory`.
    pub fn generate(&self, seed: i64, factory: &EntityFactory) -> GenResult<Level> {
        self.config.validate()?;
        let seed = resolve_seed(seed);
        info!(
            "generating {}x{} level with seed {seed}",
            self.config.grid_width, self.config.grid_height
        );

        let mut rng = StdRng::seed_from_u64(seed);
        let mut level = Level::new();
        let size = self.config.room_size;

        for i in 0..self.config.grid_width {
            for j in 0..self.config.grid_height {
                let neighbors = Neighbors {
                    west: i > 0,
                    north: j > 0,
                    east: i < self.config.grid_width - 1,
                    south: j < self.config.grid_height - 1,
                };
                let room = level.create_room(Rectangle::new(i * size, j * size, size, size));
                carve(room, neighbors);

                let floors: Vec<TileRef> = room
                    .tiles()
                    .filter(|t| t.state() == TileState::Floor)
                    .map(Tile::tile_ref)
                    .collect();
                let mut decorated = 0;
                for tile in floors {
                    if rng.random::<f64>() < self.config.decoration_chance {
                        level.spawn_at(factory, &self.config.decoration_class, tile)?;
                        decorated += 1;
                    }
                }
                debug!("room ({i}, {j}): {decorated} decoration(s)");
            }
        }

        Ok(level)
    }
}

/// Wall shell, floor interior, then floor doorways.
fn carve(room: &mut Room, neighbors: Neighbors) {
    let full = room.bounds();
    room.fill(full, TileState::Wall);
    room.add_geometry(full.inset(1));
    for slot in doorway_slots(room.width(), neighbors) {
        room.add_geometry(slot);
    }
}

#[cfg(test)]
mod tests {
    use delve_core::{Position, RoomId};

    use super::*;

    const ALL: Neighbors = Neighbors {
        west: true,
        north: true,
        east: true,
        south: true,
    };

    #[test]
    fn slots_for_default_room_size() {
        assert_eq!(
            doorway_slots(8, ALL),
            vec![
                Rectangle::new(0, 3, 1, 2),
                Rectangle::new(3, 0, 2, 1),
                Rectangle::new(7, 3, 1, 2),
                Rectangle::new(3, 7, 2, 1),
            ]
        );
        assert!(doorway_slots(8, Neighbors::default()).is_empty());
    }

    #[test]
    fn carve_builds_wall_ring_with_doorways() {
        let mut room = Room::new(RoomId(0), Rectangle::sized(8, 8));
        carve(
            &mut room,
            Neighbors {
                east: true,
                ..Neighbors::default()
            },
        );
        insta::assert_snapshot!(room.rows().join("\n"), @r"
        ########
        #......#
        #......#
        #.......
        #.......
        #......#
        #......#
        ########
        ");
        assert_eq!(room.count(TileState::Void), 0);
        assert_eq!(room.tile(Position::new(7, 3)).map(Tile::state), Some(TileState::Floor));
    }

    #[test]
    fn explicit_seeds_are_kept() {
        assert_eq!(resolve_seed(42), 42);
        assert_eq!(resolve_seed(i64::MAX), i64::MAX as u64);
        assert_ne!(resolve_seed(0), 0);
    }

    #[test]
    fn negative_seeds_are_kept_bitwise() {
        assert_eq!(resolve_seed(-1), u64::MAX);
        assert_eq!(resolve_seed(i64::MIN), 1 << 63);
        assert_ne!(resolve_seed(-1), resolve_seed(1));
    }

    #[test]
    fn invalid_config_fails_before_building() {
        let generator = LevelGenerator::new(GeneratorConfig::default().with_room_size(2));
        let factory = EntityFactory::default();
        assert!(generator.generate(1, &factory).is_err());
    }
}
