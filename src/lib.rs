//! Monoman - a monochrome platformer where the world flips color
//!
//! Core modules:
//! - `level`: `.lvl` binary level format (decode, authoring encode, sources)
//! - `sim`: Deterministic simulation (entities, physics, flip, decoration)
//! - `lifecycle`: Level loading, death/regen, level transitions, run counters
//! - `snapshot`: Read-only render snapshots for an external renderer
//! - `audio`: Fire-and-forget sound triggers
//! - `tuning`: Data-driven gameplay constants
//! - `settings`: Player preferences

pub mod audio;
pub mod level;
pub mod lifecycle;
pub mod settings;
pub mod sim;
pub mod snapshot;
pub mod tuning;

pub use level::{LevelData, LevelDir, LevelError, LevelSource, MemoryLevels};
pub use lifecycle::{LevelPhase, RunSummary, Session, format_elapsed};
pub use settings::Settings;
pub use snapshot::{Snapshot, SpriteInstance};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Tile edge in pixels
    pub const TILE_SIZE: f32 = 16.0;

    /// Level grid
    pub const GRID_COLUMNS: usize = 32;
    pub const GRID_ROWS: usize = 16;
    pub const PLANE_CELLS: usize = GRID_COLUMNS * GRID_ROWS;
    /// BLACK, GREY and WHITE
    pub const PLANE_COUNT: usize = 3;

    /// Stage size in pixels
    pub const SCREEN_WIDTH: f32 = GRID_COLUMNS as f32 * TILE_SIZE;
    pub const SCREEN_HEIGHT: f32 = GRID_ROWS as f32 * TILE_SIZE;
}
