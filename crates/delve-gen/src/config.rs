use crate::error::{GenError, GenResult};

/// Configuration for level generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Rooms per grid row.
    pub grid_width: i32,
    /// Rooms per grid column.
    pub grid_height: i32,
    /// Side length of each square room, in tiles. Also the grid spacing.
    pub room_size: i32,
    /// Probability that a floor tile receives a decoration.
    pub decoration_chance: f64,
    /// Entity class spawned as decoration.
    pub decoration_class: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            grid_width: 4,
            grid_height: 4,
            room_size: 8,
            decoration_chance: 0.125,
            decoration_class: "dust".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Set the number of rooms per grid row.
    pub fn with_grid_width(mut self, width: i32) -> Self {
        self.grid_width = width;
        self
    }

    /// Set the number of rooms per grid column.
    pub fn with_grid_height(mut self, height: i32) -> Self {
        self.grid_height = height;
        self
    }

    /// Set the room side length.
    pub fn with_room_size(mut self, size: i32) -> Self {
        self.room_size = size;
        self
    }

    /// Set the per-tile decoration probability.
    pub fn with_decoration_chance(mut self, chance: f64) -> Self {
        self.decoration_chance = chance;
        self
    }

    /// Set the entity class used for decorations.
    pub fn with_decoration_class(mut self, class: impl Into<String>) -> Self {
        self.decoration_class = class.into();
        self
    }

    /// Check that the config describes a buildable level.
    pub fn validate(&self) -> GenResult<()> {
        if self.grid_width < 1 || self.grid_height < 1 {
            return Err(GenError::InvalidConfig(format!(
                "grid must be at least 1x1, got {}x{}",
                self.grid_width, self.grid_height
            )));
        }
        // Two wall tiles plus a two-tile doorway.
        if self.room_size < 4 {
            return Err(GenError::InvalidConfig(format!(
                "room size must be at least 4, got {}",
                self.room_size
            )));
        }
        if !(0.0..=1.0).contains(&self.decoration_chance) {
            return Err(GenError::InvalidConfig(format!(
                "decoration chance must be within 0..=1, got {}",
                self.decoration_chance
            )));
        }
        Ok(())
    }
}
