//! Seeded procedural level generation for Delve.
//!
//! A [`LevelGenerator`] lays out a grid of square rooms with wall shells,
//! floor interiors, and doorways between neighbors, then scatters
//! decoration entities on floor tiles. Equal non-zero seeds give equal
//! levels.

/// Generator configuration.
pub mod config;
/// Error types used throughout the crate.
pub mod error;
/// The generation algorithm.
pub mod generator;

/// Re-export configuration.
pub use config::GeneratorConfig;
/// Re-export error types.
pub use error::{GenError, GenResult};
/// Re-export the generator.
pub use generator::{LevelGenerator, Neighbors, doorway_slots, resolve_seed};
