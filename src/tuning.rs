//! Data-driven gameplay constants
//!
//! Defaults reproduce the shipped game feel. Any field may be omitted from a
//! tuning file; missing fields fall back to the default.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid tuning json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("tuning value out of range: {0}")]
    OutOfRange(&'static str),
}

/// Player physics, flip and obstacle timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player movement (px/tick) ===
    /// Horizontal velocity added per tick of held movement
    pub accel: f32,
    /// Horizontal velocity multiplier per tick
    pub friction: f32,
    /// |vel.x| below this snaps to zero
    pub velocity_epsilon: f32,
    pub jump_velocity: f32,
    pub spring_velocity: f32,
    pub gravity: f32,
    pub terminal_velocity: f32,
    /// |vel.y| above this clears the on-ground flag
    pub airborne_threshold: f32,

    // === Flip ===
    /// Seconds between flips
    pub flip_cooldown: f32,

    // === Unstable blocks ===
    /// Seconds an unstable block stays solid after being stepped on
    pub unstable_grace: f32,
    /// Seconds a broken block stays gone
    pub unstable_dead: f32,
    /// Opacity regained per tick while fading back in
    pub unstable_fade_step: u8,

    // === Deny flash ===
    pub flash_radius: f32,
    pub flash_peak: f32,
    pub flash_decay: f32,

    /// Ticks per animation frame
    pub frame_ticks: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            accel: 0.15,
            friction: 0.925,
            velocity_epsilon: 0.01,
            jump_velocity: -2.75,
            spring_velocity: -3.5,
            gravity: 0.1,
            terminal_velocity: 10.0,
            airborne_threshold: 0.5,

            flip_cooldown: 0.85,

            unstable_grace: 0.1,
            unstable_dead: 3.0,
            unstable_fade_step: 15,

            flash_radius: 96.0,
            flash_peak: 128.0,
            flash_decay: 5.0,

            frame_ticks: 10,
        }
    }
}

impl Tuning {
    pub fn from_json_str(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let tuning = Self::from_json_str(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values that would stall timers or divide by zero
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.flip_cooldown <= 0.0 {
            return Err(TuningError::OutOfRange("flip_cooldown must be positive"));
        }
        if self.flash_radius <= 0.0 {
            return Err(TuningError::OutOfRange("flash_radius must be positive"));
        }
        if self.unstable_fade_step == 0 {
            return Err(TuningError::OutOfRange("unstable_fade_step must be non-zero"));
        }
        if self.frame_ticks == 0 {
            return Err(TuningError::OutOfRange("frame_ticks must be non-zero"));
        }
        if !(0.0..=1.0).contains(&self.friction) {
            return Err(TuningError::OutOfRange("friction must be within 0..=1"));
        }
        Ok(())
    }
}
