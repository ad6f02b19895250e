//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (and only for decoration)
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod decor;
pub mod entity;
pub mod flip;
pub mod geom;
pub mod physics;
pub mod state;
pub mod tick;
pub mod world;

pub use decor::{Decor, ScreenShake};
pub use entity::{
    Background, Capabilities, ContactEffect, Entity, EntityKind, Facing, GridCell, InvalidDirectionError, Placement,
    PlaneColor, SpikeDirection, UnstablePhase,
};
pub use flip::FlipOutcome;
pub use geom::Rect;
pub use state::{FlipState, PlayerAnim, PlayerState, SessionCounters, WorldState};
pub use tick::{TickEvent, TickInput, TickOutcome, TickReport, tick};
pub use world::{EntityArena, EntityId, Role, World};
