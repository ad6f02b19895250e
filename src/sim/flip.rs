//! World-color flip and its cooldown
//!
//! `Ready` while the cooldown is spent, `Cooling` otherwise. A flip while
//! cooling is refused without touching the timer. A flip that would embed the
//! player in an obstacle of the background color is refused too, but the
//! cooldown still restarts and the offending obstacles flash.

use serde::{Deserialize, Serialize};

use super::state::{FlipState, PlayerState, WorldState};
use super::world::{EntityArena, EntityId, Role};
use crate::tuning::Tuning;

/// Result of a flip request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipOutcome {
    /// Background inverted; cooldown started
    Flipped,
    /// Refused while cooling; nothing changed
    Cooling,
    /// Refused because the player would end up inside a solid; cooldown started
    Blocked { flashed: usize },
}

impl FlipOutcome {
    pub fn is_denied(&self) -> bool {
        !matches!(self, FlipOutcome::Flipped)
    }
}

/// Request a flip
pub fn flip(state: &mut WorldState, player: &PlayerState, entities: &mut EntityArena, tuning: &Tuning) -> FlipOutcome {
    if state.flip_state() == FlipState::Cooling {
        log::debug!("flip denied: cooling ({:.2}s left)", state.flip_cooldown);
        return FlipOutcome::Cooling;
    }

    state.flip_cooldown = tuning.flip_cooldown;

    // After a flip the current background color becomes solid
    let target = state.background.color();
    let player_rect = player.rect();
    let targets: Vec<EntityId> = entities
        .with_role(Role::Collide)
        .filter(|(_, e)| e.color == target)
        .map(|(id, _)| id)
        .collect();

    let blocked = targets
        .iter()
        .filter_map(|&id| entities.get(id))
        .any(|e| e.rect.overlaps(&player_rect));

    if blocked {
        let origin = player.center();
        for &id in &targets {
            if let Some(entity) = entities.get_mut(id) {
                entity.flash_from(origin, tuning);
            }
        }
        log::debug!("flip denied: player inside {:?} obstacle", target);
        return FlipOutcome::Blocked {
            flashed: targets.len(),
        };
    }

    state.background = state.background.inverse();
    log::debug!("flipped, background now {:?}", state.background);
    FlipOutcome::Flipped
}

/// Run the cooldown down by one tick, never below zero
pub fn cool_down(state: &mut WorldState, dt: f32) {
    if state.flip_cooldown > 0.0 {
        state.flip_cooldown = (state.flip_cooldown - dt).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::entity::{Background, Entity, EntityKind, Facing, GridCell, PlaneColor};

    fn setup(background: Background) -> (WorldState, PlayerState, EntityArena, Tuning) {
        (
            WorldState::new(background, false),
            PlayerState::spawn_at(GridCell::new(4, 4), Facing::Right),
            EntityArena::new(),
            Tuning::default(),
        )
    }

    #[test]
    fn test_flip_toggles_and_starts_cooldown() {
        let (mut state, player, mut entities, tuning) = setup(Background::Black);
        assert_eq!(flip(&mut state, &player, &mut entities, &tuning), FlipOutcome::Flipped);
        assert_eq!(state.background, Background::White);
        assert_eq!(state.flip_cooldown, tuning.flip_cooldown);
        assert_eq!(state.flip_state(), FlipState::Cooling);
    }

    #[test]
    fn test_flip_while_cooling_keeps_decaying() {
        let (mut state, player, mut entities, tuning) = setup(Background::Black);
        state.flip_cooldown = 0.3;

        assert_eq!(flip(&mut state, &player, &mut entities, &tuning), FlipOutcome::Cooling);
        assert_eq!(state.background, Background::Black);
        assert_eq!(state.flip_cooldown, 0.3);

        cool_down(&mut state, SIM_DT);
        assert!((state.flip_cooldown - (0.3 - SIM_DT)).abs() < 1e-6);
    }

    #[test]
    fn test_blocked_flip_penalizes_and_flashes() {
        let (mut state, player, mut entities, tuning) = setup(Background::Black);
        // Black block under the player: inert now, solid after a flip
        let under = entities.spawn(Entity::new(EntityKind::Block, PlaneColor::Black, GridCell::new(4, 4)));
        let near = entities.spawn(Entity::new(EntityKind::Block, PlaneColor::Black, GridCell::new(6, 4)));
        let far = entities.spawn(Entity::new(EntityKind::Block, PlaneColor::Black, GridCell::new(20, 4)));
        let other = entities.spawn(Entity::new(EntityKind::Block, PlaneColor::White, GridCell::new(5, 4)));

        let outcome = flip(&mut state, &player, &mut entities, &tuning);
        assert_eq!(outcome, FlipOutcome::Blocked { flashed: 3 });
        assert!(outcome.is_denied());
        assert_eq!(state.background, Background::Black);
        assert_eq!(state.flip_cooldown, tuning.flip_cooldown);

        let flash = |id| entities.get(id).unwrap().flash;
        assert_eq!(flash(under), tuning.flash_peak);
        assert!(flash(near) > 0.0 && flash(near) < tuning.flash_peak);
        assert_eq!(flash(far), 0.0);
        assert_eq!(flash(other), 0.0);
    }

    #[test]
    fn test_only_background_color_blocks() {
        let (mut state, player, mut entities, tuning) = setup(Background::White);
        entities.spawn(Entity::new(EntityKind::Block, PlaneColor::Black, GridCell::new(4, 4)));
        assert_eq!(flip(&mut state, &player, &mut entities, &tuning), FlipOutcome::Flipped);
        assert_eq!(state.background, Background::Black);
    }

    #[test]
    fn test_cooldown_floors_at_zero() {
        let (mut state, ..) = setup(Background::Black);
        state.flip_cooldown = 0.01;
        cool_down(&mut state, SIM_DT);
        assert_eq!(state.flip_cooldown, 0.0);
        cool_down(&mut state, SIM_DT);
        assert_eq!(state.flip_cooldown, 0.0);
    }

    #[test]
    fn test_cooldown_monotonic_between_flips() {
        let (mut state, player, mut entities, tuning) = setup(Background::Black);
        flip(&mut state, &player, &mut entities, &tuning);
        let mut last = state.flip_cooldown;
        for _ in 0..120 {
            cool_down(&mut state, SIM_DT);
            assert!(state.flip_cooldown <= last);
            last = state.flip_cooldown;
        }
        assert_eq!(state.flip_state(), FlipState::Ready);
    }
}
