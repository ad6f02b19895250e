//! Fixed timestep simulation tick
//!
//! Order within a tick:
//! 1. input intents (move, jump, flip)
//! 2. interaction, horizontal and vertical physics
//! 3. cooldown and animation bookkeeping
//! 4. entity timers (unstable blocks, flash, sprite animation)
//!
//! Death, exits and game completion are reported back to the caller, which
//! owns the level lifecycle.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Facing, PlaneColor, UnstableChange};
use super::flip::{self, FlipOutcome};
use super::geom::Rect;
use super::physics;
use super::state::PlayerState;
use super::world::{EntityId, World};
use crate::audio::SoundEvent;
use crate::tuning::Tuning;

/// Input intents for a single tick (deterministic)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TickInput {
    /// Held direction; `None` stops moving
    pub movement: Option<Facing>,
    /// Jump pressed this tick
    pub jump: bool,
    /// Flip pressed this tick
    pub flip: bool,
}

/// How the tick ended for the player
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TickOutcome {
    #[default]
    Continue,
    /// Touched a hazard or fell off the map
    Died { at: Vec2 },
    /// Touched a normal exit
    LevelComplete,
    /// Touched the RGB exit
    GameComplete,
}

/// Side effects produced during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickEvent {
    Sound(SoundEvent),
    /// An unstable block just vanished
    Crumbled { id: EntityId, rect: Rect, color: PlaneColor },
}

/// Everything a tick reports back
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub outcome: TickOutcome,
    /// Result of a flip request, if one was made
    pub flip: Option<FlipOutcome>,
    /// Player moved or jumped this tick
    pub moved: bool,
    pub events: Vec<TickEvent>,
}

impl TickReport {
    pub fn sounds(&self) -> impl Iterator<Item = SoundEvent> + '_ {
        self.events.iter().filter_map(|event| match event {
            TickEvent::Sound(sound) => Some(*sound),
            _ => None,
        })
    }
}

/// Apply move and jump intents
fn apply_input(player: &mut PlayerState, input: &TickInput, tuning: &Tuning, report: &mut TickReport) {
    match input.movement {
        Some(facing) => {
            player.moving = true;
            player.facing = facing;
            player.vel.x += facing.sign() * tuning.accel;
            report.moved = true;
        }
        None => player.moving = false,
    }

    if input.jump && player.on_ground {
        player.on_ground = false;
        player.vel.y = tuning.jump_velocity;
        report.events.push(TickEvent::Sound(SoundEvent::Jump));
        report.moved = true;
    }
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &TickInput, tuning: &Tuning, dt: f32) -> TickReport {
    let mut report = TickReport::default();

    if let Some(player) = world.player.as_mut() {
        apply_input(player, input, tuning, &mut report);

        if input.flip {
            let outcome = flip::flip(&mut world.state, player, &mut world.entities, tuning);
            let sound = if outcome.is_denied() {
                SoundEvent::Denied
            } else {
                SoundEvent::Flip
            };
            report.events.push(TickEvent::Sound(sound));
            report.flip = Some(outcome);
        }

        report.outcome = physics::step(player, &world.state, &mut world.entities, tuning, &mut report.events);
        player.update_animation(tuning);
    }

    flip::cool_down(&mut world.state, dt);

    for (id, change) in world.entities.advance_all(world.state.background, tuning, dt) {
        if change != UnstableChange::Broke {
            continue;
        }
        if let Some(entity) = world.entities.get(id) {
            report.events.push(TickEvent::Sound(SoundEvent::Break));
            report.events.push(TickEvent::Crumbled {
                id,
                rect: entity.rect,
                color: entity.color,
            });
        }
    }

    report
}
