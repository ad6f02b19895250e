//! Read-only render snapshots
//!
//! Everything an external renderer needs for one frame, flattened into
//! `SpriteInstance`s that can be uploaded as-is (`bytemuck::Pod`). Drawing
//! order is back to front: clouds, entities, player, particles, overlays.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use serde::Serialize;

use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH, TILE_SIZE};
use crate::level::LevelSource;
use crate::lifecycle::Session;
use crate::settings::Settings;
use crate::sim::decor::{Decor, FadingText, ParticleKind};
use crate::sim::entity::{Background, EntityKind, Facing, PlaneColor};
use crate::sim::geom::Rect;
use crate::sim::state::{PlayerAnim, PlayerState, WorldState};
use crate::sim::world::World;
use crate::tuning::Tuning;

/// Segments in the flip cooldown indicator
pub const INDICATOR_SEGMENTS: u32 = 16;

/// Width of the wrap markers drawn at both screen edges
const WRAP_MARKER_WIDTH: f32 = 2.0;
const WRAP_MARKER_ALPHA: u8 = 100;

/// Sprite sheet selector
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpriteKind {
    Cloud = 0,
    Block = 1,
    Unstable = 2,
    Spike = 3,
    Spring = 4,
    Exit = 5,
    RgbExit = 6,
    Kill = 7,
    Player = 8,
    Particle = 9,
    /// Cooldown bar; `variant` is the filled segment count
    FlipIndicator = 10,
    WrapMarker = 11,
}

impl From<&EntityKind> for SpriteKind {
    fn from(kind: &EntityKind) -> Self {
        match kind {
            EntityKind::Player { .. } => SpriteKind::Player,
            EntityKind::Block => SpriteKind::Block,
            EntityKind::Unstable => SpriteKind::Unstable,
            EntityKind::Spike { .. } => SpriteKind::Spike,
            EntityKind::Spring => SpriteKind::Spring,
            EntityKind::Exit => SpriteKind::Exit,
            EntityKind::RgbExit => SpriteKind::RgbExit,
            EntityKind::Kill => SpriteKind::Kill,
        }
    }
}

/// One textured quad
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// x, y, width, height in stage pixels
    pub rect: [f32; 4],
    /// RGBA
    pub color: [u8; 4],
    /// `SpriteKind` discriminant
    pub sprite: u32,
    /// Animation frame (0-3)
    pub frame: u32,
    /// Kind-specific: spike direction, exit inset, player pose, indicator fill
    pub variant: u32,
}

impl SpriteInstance {
    pub fn new(rect: Rect, color: [u8; 4], sprite: SpriteKind) -> Self {
        Self {
            rect: rect.to_array(),
            color,
            sprite: sprite as u32,
            frame: 0,
            variant: 0,
        }
    }

    pub fn with_frame(mut self, frame: usize, variant: u32) -> Self {
        self.frame = frame as u32;
        self.variant = variant;
        self
    }
}

/// A line of text to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLine {
    pub text: String,
    pub pos: Vec2,
    pub color: [u8; 4],
}

/// Everything drawn for one frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub clear_color: [u8; 4],
    /// Screen shake offset for the whole stage
    pub offset: Vec2,
    pub sprites: Vec<SpriteInstance>,
    pub texts: Vec<TextLine>,
    /// Fade to the end screen, 0-255
    pub fade_alpha: u8,
}

fn shade(color: PlaneColor, alpha: u8) -> [u8; 4] {
    let l = color.luminance();
    [l, l, l, alpha]
}

/// Player pose index: animation state, doubled, plus one when facing left
fn player_pose(player: &PlayerState) -> u32 {
    let anim = match player.anim {
        PlayerAnim::Idle => 0,
        PlayerAnim::Walking => 1,
        PlayerAnim::Jumping => 2,
        PlayerAnim::Falling => 3,
    };
    anim * 2 + u32::from(player.facing == Facing::Left)
}

/// Filled segments of the flip indicator; full when a flip is ready
pub fn indicator_fill(state: &WorldState, tuning: &Tuning) -> u32 {
    let remaining = 1.0 - state.cooldown_ratio(tuning);
    ((INDICATOR_SEGMENTS as f32 * remaining).ceil() as u32).min(INDICATOR_SEGMENTS)
}

impl Snapshot {
    /// Capture the current frame of a session
    pub fn capture<S: LevelSource>(session: &Session<S>, settings: &Settings) -> Self {
        Self::build(
            session.world(),
            session.decor(),
            session.tuning(),
            settings,
            session.fade_alpha(),
        )
    }

    pub fn build(world: Option<&World>, decor: &Decor, tuning: &Tuning, settings: &Settings, fade_alpha: u8) -> Self {
        let background = world.map_or(Background::Black, |w| w.state.background);
        let active = background.inverse().color();
        let mut snapshot = Self {
            clear_color: shade(background.color(), u8::MAX),
            offset: if settings.effective_screen_shake() {
                decor.shake_offset
            } else {
                Vec2::ZERO
            },
            fade_alpha,
            ..Self::default()
        };

        for cloud in &decor.clouds {
            snapshot
                .sprites
                .push(SpriteInstance::new(cloud.rect(), shade(active, cloud.alpha()), SpriteKind::Cloud));
        }

        if let Some(world) = world {
            snapshot.push_world(world, tuning);
        }

        if settings.particles {
            snapshot.push_particles(decor, background);
        }

        let texts = decor
            .title
            .as_ref()
            .map(|title| &title.text)
            .into_iter()
            .chain(decor.move_hint.as_ref())
            .chain(decor.flip_hint.as_ref());
        for text in texts {
            snapshot.push_text(text, active);
        }

        snapshot
    }

    fn push_world(&mut self, world: &World, tuning: &Tuning) {
        let background = world.state.background;
        let active = background.inverse().color();

        for (_, entity) in world.entities.iter() {
            // Inactive obstacles only show while flashing
            let alpha = if entity.is_active(background) {
                entity.opacity()
            } else {
                entity.flash.clamp(0.0, 255.0) as u8
            };
            if alpha == 0 {
                continue;
            }
            let color = match entity.kind {
                EntityKind::RgbExit => {
                    let [r, g, b] = entity.palette_color();
                    [r, g, b, alpha]
                }
                _ => shade(entity.color, alpha),
            };
            let variant = match entity.kind {
                EntityKind::Spike { direction } => direction as u32,
                EntityKind::Exit | EntityKind::RgbExit => u32::from(entity.exit_inset()),
                _ => 0,
            };
            self.sprites.push(
                SpriteInstance::new(entity.rect, color, SpriteKind::from(&entity.kind))
                    .with_frame(entity.frame.index, variant),
            );
        }

        if let Some(player) = world.player.as_ref() {
            let rect = player.rect();
            self.sprites.push(
                SpriteInstance::new(rect, shade(active, u8::MAX), SpriteKind::Player)
                    .with_frame(player.frame.index, player_pose(player)),
            );

            let fill = indicator_fill(&world.state, tuning);
            let bar = Rect::new(rect.left(), rect.top() - 4.0, TILE_SIZE, 2.0);
            self.sprites.push(
                SpriteInstance::new(bar, shade(active, u8::MAX), SpriteKind::FlipIndicator).with_frame(0, fill),
            );
        }

        if world.state.wrapping {
            for x in [0.0, SCREEN_WIDTH - WRAP_MARKER_WIDTH] {
                let marker = Rect::new(x, 0.0, WRAP_MARKER_WIDTH, SCREEN_HEIGHT);
                self.sprites
                    .push(SpriteInstance::new(marker, shade(active, WRAP_MARKER_ALPHA), SpriteKind::WrapMarker));
            }
        }
    }

    fn push_particles(&mut self, decor: &Decor, background: Background) {
        let active = background.inverse().color();
        for particle in &decor.particles {
            let alpha = particle.alpha.clamp(0.0, 255.0) as u8;
            let color = match particle.kind {
                ParticleKind::Death => shade(active, alpha),
                ParticleKind::Crumble { color } if color == background.color() => continue,
                ParticleKind::Crumble { color } => shade(color, alpha),
                ParticleKind::Sparkle { rgb: [r, g, b], .. } => [r, g, b, alpha],
            };
            self.sprites
                .push(SpriteInstance::new(particle.rect(), color, SpriteKind::Particle));
        }
    }

    fn push_text(&mut self, text: &FadingText, active: PlaneColor) {
        if text.alpha == 0 {
            return;
        }
        self.texts.push(TextLine {
            text: text.text.clone(),
            pos: text.pos,
            color: shade(active, text.alpha),
        });
    }

    /// Sprite buffer as raw bytes for upload
    pub fn sprite_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.sprites)
    }

    pub fn count(&self, sprite: SpriteKind) -> usize {
        self.sprites.iter().filter(|s| s.sprite == sprite as u32).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelData;
    use crate::sim::entity::{GridCell, Placement};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn world(wrapping: bool, extra: Vec<Placement>) -> World {
        let mut placements = vec![Placement::new(
            GridCell::new(4, 5),
            PlaneColor::Black,
            EntityKind::Player {
                facing: Facing::Left,
                wrapping,
            },
        )];
        placements.extend(extra);
        World::from_level(&LevelData {
            title: "snap".into(),
            background: Background::Black,
            wrapping,
            placements,
        })
    }

    fn decor() -> Decor {
        Decor::new(Pcg32::seed_from_u64(3))
    }

    fn sprites_of(snapshot: &Snapshot, sprite: SpriteKind) -> Vec<SpriteInstance> {
        snapshot
            .sprites
            .iter()
            .copied()
            .filter(|s| s.sprite == sprite as u32)
            .collect()
    }

    #[test]
    fn test_sprite_buffer_layout() {
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 32);
        let w = world(true, vec![]);
        let snapshot = Snapshot::build(Some(&w), &decor(), &Tuning::default(), &Settings::default(), 0);
        assert_eq!(snapshot.sprite_bytes().len(), snapshot.sprites.len() * 32);
    }

    #[test]
    fn test_only_active_entities_are_drawn() {
        let w = world(
            true,
            vec![
                Placement::new(GridCell::new(1, 1), PlaneColor::White, EntityKind::Block),
                Placement::new(GridCell::new(2, 1), PlaneColor::Black, EntityKind::Block),
                Placement::new(GridCell::new(3, 1), PlaneColor::Grey, EntityKind::Kill),
            ],
        );
        let snapshot = Snapshot::build(Some(&w), &decor(), &Tuning::default(), &Settings::default(), 0);
        assert_eq!(snapshot.clear_color, [0, 0, 0, 255]);

        let blocks = sprites_of(&snapshot, SpriteKind::Block);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].color, [255, 255, 255, 255]);
        assert_eq!(snapshot.count(SpriteKind::Kill), 1);
    }

    #[test]
    fn test_flashing_obstacle_is_drawn_faintly() {
        let mut w = world(true, vec![Placement::new(GridCell::new(4, 6), PlaneColor::Black, EntityKind::Block)]);
        let (id, _) = w.entities.iter().next().unwrap();
        w.entities.get_mut(id).unwrap().flash = 64.0;
        let snapshot = Snapshot::build(Some(&w), &decor(), &Tuning::default(), &Settings::default(), 0);
        let blocks = sprites_of(&snapshot, SpriteKind::Block);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].color, [0, 0, 0, 64]);
    }

    #[test]
    fn test_indicator_fill() {
        let tuning = Tuning::default();
        let mut state = WorldState::new(Background::Black, false);
        assert_eq!(indicator_fill(&state, &tuning), INDICATOR_SEGMENTS);

        state.flip_cooldown = tuning.flip_cooldown;
        assert_eq!(indicator_fill(&state, &tuning), 0);

        state.flip_cooldown = tuning.flip_cooldown / 2.0;
        assert_eq!(indicator_fill(&state, &tuning), 8);
    }

    #[test]
    fn test_player_pose_and_indicator() {
        let w = world(false, vec![]);
        let snapshot = Snapshot::build(Some(&w), &decor(), &Tuning::default(), &Settings::default(), 0);
        let player = sprites_of(&snapshot, SpriteKind::Player);
        assert_eq!(player.len(), 1);
        assert_eq!(player[0].rect, [64.0, 80.0, 16.0, 16.0]);
        // Idle, facing left
        assert_eq!(player[0].variant, 1);
        assert_eq!(sprites_of(&snapshot, SpriteKind::FlipIndicator)[0].variant, INDICATOR_SEGMENTS);
    }

    #[test]
    fn test_wrap_markers_only_when_wrapping() {
        let tuning = Tuning::default();
        let settings = Settings::default();
        let wrapped = Snapshot::build(Some(&world(true, vec![])), &decor(), &tuning, &settings, 0);
        let walled = Snapshot::build(Some(&world(false, vec![])), &decor(), &tuning, &settings, 0);
        assert_eq!(wrapped.count(SpriteKind::WrapMarker), 2);
        assert_eq!(walled.count(SpriteKind::WrapMarker), 0);
    }

    #[test]
    fn test_shake_and_particles_follow_settings() {
        let mut d = decor();
        d.shake_offset = Vec2::new(2.0, -1.0);
        d.spawn_death(Vec2::new(100.0, 100.0));
        d.spawn_crumble(Vec2::new(50.0, 50.0), PlaneColor::Black);
        let w = world(true, vec![]);
        let tuning = Tuning::default();

        let on = Snapshot::build(Some(&w), &d, &tuning, &Settings::default(), 0);
        assert_eq!(on.offset, Vec2::new(2.0, -1.0));
        // Black crumbles vanish against the black background
        assert_eq!(on.count(SpriteKind::Particle), crate::sim::decor::DEATH_PARTICLES);

        let calm = Settings {
            reduced_motion: true,
            particles: false,
            ..Settings::default()
        };
        let off = Snapshot::build(Some(&w), &d, &tuning, &calm, 0);
        assert_eq!(off.offset, Vec2::ZERO);
        assert_eq!(off.count(SpriteKind::Particle), 0);
    }

    #[test]
    fn test_texts_and_fade() {
        let mut d = decor();
        d.show_title("Level Title");
        d.add_hints();
        let snapshot = Snapshot::build(None, &d, &Tuning::default(), &Settings::default(), 77);
        // The flip hint starts transparent
        let texts: Vec<&str> = snapshot.texts.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Level Title", crate::sim::decor::MOVE_HINT]);
        assert_eq!(snapshot.fade_alpha, 77);
        assert_eq!(snapshot.count(SpriteKind::Player), 0);
    }
}
