//! World and player state
//!
//! Shared mutable state for one level lives in `WorldState` and is passed by
//! reference into every pass of a tick. Nothing here is global.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Background, Facing, FrameCounter, GridCell, PlaneColor};
use super::geom::Rect;
use crate::consts::TILE_SIZE;
use crate::tuning::Tuning;

/// Player hitbox size in pixels
pub const PLAYER_SIZE: Vec2 = Vec2::new(TILE_SIZE, TILE_SIZE);

/// Flip availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipState {
    /// Cooldown has run out
    Ready,
    /// A flip happened or was denied recently
    Cooling,
}

/// Level-wide state read by physics and mutated by flips and regens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    /// Entities of this color are merged into the background and inert
    pub background: Background,
    /// Background the level was loaded with; restored on death
    pub initial_background: Background,
    /// Seconds until the next flip is allowed
    pub flip_cooldown: f32,
    /// Player wraps around the horizontal screen edges
    pub wrapping: bool,
}

impl WorldState {
    pub fn new(background: Background, wrapping: bool) -> Self {
        Self {
            background,
            initial_background: background,
            flip_cooldown: 0.0,
            wrapping,
        }
    }

    /// The color currently drawn and solid (the inverse of the background)
    pub fn active_color(&self) -> PlaneColor {
        self.background.inverse().color()
    }

    /// True if entities of `color` currently take part in the simulation
    pub fn is_active(&self, color: PlaneColor) -> bool {
        color != self.background.color()
    }

    pub fn flip_state(&self) -> FlipState {
        if self.flip_cooldown > 0.0 {
            FlipState::Cooling
        } else {
            FlipState::Ready
        }
    }

    /// Remaining cooldown as a fraction of the full duration, for display
    pub fn cooldown_ratio(&self, tuning: &Tuning) -> f32 {
        self.flip_cooldown.max(0.0) / tuning.flip_cooldown
    }
}

/// Player animation set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerAnim {
    #[default]
    Idle,
    Walking,
    Jumping,
    Falling,
}

/// Pose captured at spawn; restored on death
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPose {
    pub pos: Vec2,
    pub facing: Facing,
}

/// The player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Top-left corner in pixels
    pub pos: Vec2,
    /// Velocity in pixels per tick
    pub vel: Vec2,
    pub on_ground: bool,
    pub facing: Facing,
    /// Movement held this tick (drives the walking animation against walls)
    pub moving: bool,
    pub anim: PlayerAnim,
    pub frame: FrameCounter,
    pub spawn: SpawnPose,
}

impl PlayerState {
    pub fn spawn_at(cell: GridCell, facing: Facing) -> Self {
        let pos = cell.origin();
        Self {
            pos,
            vel: Vec2::ZERO,
            on_ground: true,
            facing,
            moving: false,
            anim: PlayerAnim::Idle,
            frame: FrameCounter::default(),
            spawn: SpawnPose { pos, facing },
        }
    }

    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: PLAYER_SIZE,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + PLAYER_SIZE * 0.5
    }

    pub fn set_left(&mut self, x: f32) {
        self.pos.x = x;
    }

    pub fn set_right(&mut self, x: f32) {
        self.pos.x = x - PLAYER_SIZE.x;
    }

    pub fn set_top(&mut self, y: f32) {
        self.pos.y = y;
    }

    pub fn set_bottom(&mut self, y: f32) {
        self.pos.y = y - PLAYER_SIZE.y;
    }

    /// Back to the spawn pose, at rest
    pub fn reset_to_spawn(&mut self) {
        self.pos = self.spawn.pos;
        self.facing = self.spawn.facing;
        self.vel = Vec2::ZERO;
    }

    /// Pick the animation set and advance the frame counter
    pub fn update_animation(&mut self, tuning: &Tuning) {
        self.anim = if !self.on_ground {
            if self.vel.y < 0.0 {
                PlayerAnim::Jumping
            } else {
                PlayerAnim::Falling
            }
        } else if self.moving {
            PlayerAnim::Walking
        } else {
            PlayerAnim::Idle
        };
        // Frame index is shared across animation sets and not reset on change
        self.frame.advance(tuning.frame_ticks);
    }
}

/// Counters kept across levels for the whole run
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionCounters {
    /// Seconds of play
    pub elapsed: f64,
    pub deaths: u32,
}
