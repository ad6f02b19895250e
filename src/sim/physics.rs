//! Player physics and collision
//!
//! One tick runs three passes in order:
//! - interaction: touch effects of spikes, springs, exits and kill zones
//! - horizontal: integrate, friction, clamp against solids, wrap
//! - vertical: integrate, gravity, land or bonk against solids, fall death
//!
//! A death or exit in the interaction pass ends the tick's physics.

use super::entity::ContactEffect;
use super::geom::Rect;
use super::state::{PlayerState, WorldState};
use super::tick::{TickEvent, TickOutcome};
use super::world::{EntityArena, EntityId, Role};
use crate::audio::SoundEvent;
use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::tuning::Tuning;

/// Run all three passes for the player
pub fn step(
    player: &mut PlayerState,
    state: &WorldState,
    entities: &mut EntityArena,
    tuning: &Tuning,
    events: &mut Vec<TickEvent>,
) -> TickOutcome {
    if let Some(outcome) = interact(player, state, entities, tuning, events) {
        return outcome;
    }
    horizontal(player, state, entities, tuning);
    vertical(player, state, entities, tuning, events)
}

/// Apply touch effects. Returns early on death or exit.
pub fn interact(
    player: &mut PlayerState,
    state: &WorldState,
    entities: &EntityArena,
    tuning: &Tuning,
    events: &mut Vec<TickEvent>,
) -> Option<TickOutcome> {
    for id in entities.overlapping(Role::Interact, &player.rect(), state.background) {
        let Some(entity) = entities.get(id) else { continue };
        let Some(effect) = entity.capabilities().contact else { continue };

        match effect {
            ContactEffect::Kill => {
                events.push(TickEvent::Sound(SoundEvent::Die));
                return Some(TickOutcome::Died { at: player.center() });
            }
            ContactEffect::Launch => {
                events.push(TickEvent::Sound(SoundEvent::Spring));
                player.set_bottom(entity.rect.top());
                player.vel.y = tuning.spring_velocity;
            }
            ContactEffect::CompleteLevel => return Some(TickOutcome::LevelComplete),
            ContactEffect::EndGame => return Some(TickOutcome::GameComplete),
        }
    }
    None
}

/// Solid colliders overlapping `rect`, with their rects
fn solid_hits(entities: &EntityArena, state: &WorldState, rect: &Rect) -> Vec<(EntityId, Rect)> {
    entities
        .overlapping(Role::Collide, rect, state.background)
        .into_iter()
        .filter_map(|id| entities.get(id).map(|e| (id, e.rect)))
        .collect()
}

/// Horizontal integration and resolution
pub fn horizontal(player: &mut PlayerState, state: &WorldState, entities: &EntityArena, tuning: &Tuning) {
    let dx = player.vel.x;
    player.pos.x += dx;

    player.vel.x *= tuning.friction;
    if player.vel.x.abs() < tuning.velocity_epsilon {
        player.vel.x = 0.0;
    }

    for (_, block) in solid_hits(entities, state, &player.rect()) {
        if dx > 0.0 {
            player.set_right(block.left());
        } else if dx < 0.0 {
            player.set_left(block.right());
        }
        player.vel.x = 0.0;
    }

    if state.wrapping {
        let rect = player.rect();
        if rect.left() > SCREEN_WIDTH {
            player.set_left(0.0);
        } else if rect.right() < 0.0 {
            player.set_right(SCREEN_WIDTH);
        }
    }
}

/// Vertical integration and resolution. Returns `Died` on falling off the map.
pub fn vertical(
    player: &mut PlayerState,
    state: &WorldState,
    entities: &mut EntityArena,
    tuning: &Tuning,
    events: &mut Vec<TickEvent>,
) -> TickOutcome {
    player.pos.y += player.vel.y;
    player.vel.y = (player.vel.y + tuning.gravity).min(tuning.terminal_velocity);

    let falling = player.vel.y > 0.0;
    for (id, block) in solid_hits(entities, state, &player.rect()) {
        if player.vel.y > 0.0 {
            player.set_bottom(block.top());
            player.on_ground = true;
            player.vel.y = 0.0;
        } else if player.vel.y < 0.0 {
            player.set_top(block.bottom());
            player.vel.y = 0.0;
        }

        if !falling {
            continue;
        }
        if let Some(entity) = entities.get_mut(id) {
            if entity.trigger_break(tuning) {
                log::trace!("unstable block {:?} breaking", id);
            }
        }
    }

    if player.vel.y.abs() > tuning.airborne_threshold {
        player.on_ground = false;
    }

    if player.rect().top() > SCREEN_HEIGHT {
        events.push(TickEvent::Sound(SoundEvent::Die));
        return TickOutcome::Died { at: player.center() };
    }
    TickOutcome::Continue
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::sim::entity::{Background, Entity, EntityKind, Facing, GridCell, PlaneColor, SpikeDirection, UnstablePhase};

    struct Fixture {
        player: PlayerState,
        state: WorldState,
        entities: EntityArena,
        tuning: Tuning,
        events: Vec<TickEvent>,
    }

    impl Fixture {
        fn new(background: Background) -> Self {
            Self {
                player: PlayerState::spawn_at(GridCell::new(4, 4), Facing::Right),
                state: WorldState::new(background, false),
                entities: EntityArena::new(),
                tuning: Tuning::default(),
                events: Vec::new(),
            }
        }

        fn spawn(&mut self, kind: EntityKind, color: PlaneColor, column: i32, row: i32) -> EntityId {
            self.entities.spawn(Entity::new(kind, color, GridCell::new(column, row)))
        }

        fn step(&mut self) -> TickOutcome {
            step(&mut self.player, &self.state, &mut self.entities, &self.tuning, &mut self.events)
        }
    }

    #[test]
    fn test_landing_on_block() {
        let mut f = Fixture::new(Background::Black);
        f.spawn(EntityKind::Block, PlaneColor::White, 4, 6);
        // Bottom edge 2px above the block
        f.player.pos = Vec2::new(64.0, 96.0 - 16.0 - 2.0);
        f.player.vel.y = 5.0;
        f.player.on_ground = false;

        assert_eq!(f.step(), TickOutcome::Continue);
        assert!(f.player.on_ground);
        assert_eq!(f.player.vel.y, 0.0);
        assert_eq!(f.player.rect().bottom(), 96.0);
    }

    #[test]
    fn test_passes_through_inert_block() {
        let mut f = Fixture::new(Background::White);
        f.spawn(EntityKind::Block, PlaneColor::White, 4, 6);
        f.player.pos = Vec2::new(64.0, 78.0);
        f.player.vel.y = 5.0;
        f.player.on_ground = false;

        f.step();
        assert!(!f.player.on_ground);
        assert!(f.player.rect().bottom() > 96.0);
    }

    #[test]
    fn test_bonk_on_ceiling() {
        let mut f = Fixture::new(Background::Black);
        f.spawn(EntityKind::Block, PlaneColor::Grey, 4, 3);
        f.player.vel.y = -2.75;

        f.step();
        assert_eq!(f.player.rect().top(), 64.0);
        assert_eq!(f.player.vel.y, 0.0);
    }

    #[test]
    fn test_wall_clamps_leading_edge() {
        let mut f = Fixture::new(Background::Black);
        f.spawn(EntityKind::Block, PlaneColor::White, 5, 4);
        f.player.pos.x = 64.0 - 0.5;
        f.player.vel.x = 1.0;

        f.step();
        assert_eq!(f.player.rect().right(), 80.0);
        assert_eq!(f.player.vel.x, 0.0);

        let mut f = Fixture::new(Background::Black);
        f.spawn(EntityKind::Block, PlaneColor::White, 3, 4);
        f.player.pos.x = 64.0 + 0.5;
        f.player.vel.x = -1.0;

        f.step();
        assert_eq!(f.player.rect().left(), 64.0);
        assert_eq!(f.player.vel.x, 0.0);
    }

    #[test]
    fn test_friction_snaps_to_zero() {
        let mut f = Fixture::new(Background::Black);
        f.player.vel.x = 0.0105;
        f.step();
        assert_eq!(f.player.vel.x, 0.0);

        f.player.vel.x = 1.0;
        f.step();
        assert!((f.player.vel.x - 0.925).abs() < 1e-6);
    }

    #[test]
    fn test_gravity_clamped_to_terminal() {
        let mut f = Fixture::new(Background::Black);
        f.player.pos.y = -400.0;
        f.player.vel.y = 9.95;
        f.step();
        assert_eq!(f.player.vel.y, f.tuning.terminal_velocity);
        assert!(!f.player.on_ground);
    }

    #[test]
    fn test_wrapping_teleports() {
        let mut f = Fixture::new(Background::Black);
        f.state.wrapping = true;
        f.player.pos = Vec2::new(SCREEN_WIDTH + 0.5, -200.0);
        f.player.vel.x = 1.0;
        f.step();
        assert_eq!(f.player.rect().left(), 0.0);

        f.player.pos.x = -16.5;
        f.player.vel.x = -1.0;
        f.step();
        assert_eq!(f.player.rect().right(), SCREEN_WIDTH);
    }

    #[test]
    fn test_no_wrap_without_flag() {
        let mut f = Fixture::new(Background::Black);
        f.player.pos = Vec2::new(SCREEN_WIDTH + 0.5, -200.0);
        f.player.vel.x = 1.0;
        f.step();
        assert!(f.player.rect().left() > SCREEN_WIDTH);
    }

    #[test]
    fn test_spike_kills_and_short_circuits() {
        let mut f = Fixture::new(Background::Black);
        f.spawn(EntityKind::Spike { direction: SpikeDirection::Up }, PlaneColor::White, 4, 4);
        f.player.vel.x = 2.0;
        let before = f.player.pos;

        assert!(matches!(f.step(), TickOutcome::Died { .. }));
        assert_eq!(f.player.pos, before, "physics must not run after death");
        assert!(f.events.contains(&TickEvent::Sound(SoundEvent::Die)));
    }

    #[test]
    fn test_inert_spike_is_harmless() {
        let mut f = Fixture::new(Background::White);
        f.spawn(EntityKind::Spike { direction: SpikeDirection::Up }, PlaneColor::White, 4, 4);
        f.player.pos.y = -300.0;
        assert_eq!(f.step(), TickOutcome::Continue);
    }

    #[test]
    fn test_kill_zone_always_active() {
        for background in [Background::Black, Background::White] {
            let mut f = Fixture::new(background);
            f.spawn(EntityKind::Kill, PlaneColor::Black, 4, 4);
            assert!(matches!(f.step(), TickOutcome::Died { .. }));
        }
    }

    #[test]
    fn test_spring_launches() {
        let mut f = Fixture::new(Background::Black);
        f.spawn(EntityKind::Spring, PlaneColor::White, 4, 4);
        f.player.pos.y = 64.0 + 2.0;

        assert_eq!(f.step(), TickOutcome::Continue);
        assert!(f.events.contains(&TickEvent::Sound(SoundEvent::Spring)));
        // Launched from the spring top, then one tick of flight
        assert!(f.player.rect().bottom() < 72.0);
        assert!(f.player.vel.y < 0.0);
        assert!(!f.player.on_ground);
    }

    #[test]
    fn test_exits() {
        let mut f = Fixture::new(Background::Black);
        f.spawn(EntityKind::Exit, PlaneColor::White, 4, 4);
        assert_eq!(f.step(), TickOutcome::LevelComplete);

        let mut f = Fixture::new(Background::White);
        f.spawn(EntityKind::RgbExit, PlaneColor::Grey, 4, 4);
        assert_eq!(f.step(), TickOutcome::GameComplete);
    }

    #[test]
    fn test_falling_off_map_dies() {
        let mut f = Fixture::new(Background::Black);
        f.player.pos.y = SCREEN_HEIGHT + 0.5;
        assert!(matches!(f.step(), TickOutcome::Died { .. }));
    }

    #[test]
    fn test_landing_on_unstable_starts_break() {
        let mut f = Fixture::new(Background::Black);
        let id = f.spawn(EntityKind::Unstable, PlaneColor::White, 4, 5);
        f.player.vel.y = 1.0;
        f.player.on_ground = false;

        f.step();
        assert!(f.player.on_ground);
        assert!(matches!(
            f.entities.get(id).unwrap().unstable,
            UnstablePhase::Breaking { .. }
        ));
    }

    #[test]
    fn test_bonk_does_not_break_unstable() {
        let mut f = Fixture::new(Background::Black);
        let id = f.spawn(EntityKind::Unstable, PlaneColor::White, 4, 3);
        f.player.pos.y = 57.0;
        f.player.vel.y = -2.75;

        f.step();
        assert_eq!(f.entities.get(id).unwrap().unstable, UnstablePhase::Intact);
    }
}
