//! Cosmetic decoration
//!
//! Nothing here feeds back into physics. Randomness comes from a seeded
//! `Pcg32`, so a replayed session produces the same decoration.
//!
//! Level-scoped decoration (particles, title card, hints) is dropped when a
//! level is destroyed. Clouds and screen shake persist across levels.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Background, PlaneColor};
use super::geom::Rect;
use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Death burst size
pub const DEATH_PARTICLES: usize = 25;
/// Crumble burst size
pub const CRUMBLE_PARTICLES: usize = 10;
/// Sparkles spawned per RGB exit frame
pub const SPARKLES_PER_FRAME: usize = 2;
/// Background clouds at session start
pub const CLOUD_COUNT: usize = 20;

/// Alpha lost per tick by burst particles
const BURST_FADE: f32 = 15.0;
/// Sparkle start distance from the exit center and alpha ramp per tick
const SPARKLE_DISTANCE: u32 = 24;
const SPARKLE_RAMP: f32 = 31.875;

/// Small text glyph size
pub const CHAR_SIZE: f32 = 8.0;

/// Hint that shows until the player moves
pub const MOVE_HINT: &str = "use wasd to move";
/// Hint that shows until the player flips
pub const FLIP_HINT: &str = "use space to flip";
/// Player x from which the flip hint appears
pub const FLIP_HINT_X: f32 = 96.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParticleKind {
    /// Player death burst; drawn in the active color
    Death,
    /// Unstable block debris; hidden while its color matches the background
    Crumble { color: PlaneColor },
    /// Converges on the RGB exit
    Sparkle { rgb: [u8; 3], distance: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Top-left corner
    pub pos: Vec2,
    /// Pixels per tick
    pub vel: Vec2,
    pub size: f32,
    /// 0-255
    pub alpha: f32,
    pub kind: ParticleKind,
}

impl Particle {
    fn burst(origin: Vec2, speed: f32, angle_deg: f32, size: f32, kind: ParticleKind) -> Self {
        let angle = angle_deg.to_radians();
        Self {
            pos: origin,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            size,
            alpha: 255.0,
            kind,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: Vec2::splat(self.size),
        }
    }

    /// Returns false once the particle is gone
    fn update(&mut self) -> bool {
        self.pos += self.vel;
        match &mut self.kind {
            ParticleKind::Death | ParticleKind::Crumble { .. } => {
                self.alpha -= BURST_FADE;
                self.alpha > 0.0
            }
            ParticleKind::Sparkle { distance, .. } => {
                *distance = distance.saturating_sub(1);
                if *distance >= 16 {
                    self.alpha = (self.alpha + SPARKLE_RAMP).min(255.0);
                } else if *distance < 8 {
                    self.alpha = (self.alpha - SPARKLE_RAMP).max(0.0);
                }
                *distance > 0
            }
        }
    }
}

/// Text that fades in or out on command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FadingText {
    pub text: String,
    pub pos: Vec2,
    pub alpha: u8,
    pub step: u8,
    pub fade: Fade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fade {
    Hold,
    In,
    Out,
}

impl FadingText {
    pub fn new(text: impl Into<String>, pos: Vec2, alpha: u8, step: u8) -> Self {
        Self {
            text: text.into(),
            pos,
            alpha,
            step,
            fade: Fade::Hold,
        }
    }

    pub fn show(&mut self) {
        self.fade = Fade::In;
    }

    pub fn hide(&mut self) {
        self.fade = Fade::Out;
    }

    /// Returns false once fully faded out
    fn update(&mut self) -> bool {
        match self.fade {
            Fade::Hold => true,
            Fade::In => {
                self.alpha = self.alpha.saturating_add(self.step);
                true
            }
            Fade::Out => {
                self.alpha = self.alpha.saturating_sub(self.step);
                self.alpha > 0
            }
        }
    }
}

/// Level title: pops in, holds, then fades out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleCard {
    pub text: FadingText,
    pub hold_ticks: u32,
}

impl TitleCard {
    pub const HOLD_TICKS: u32 = 60;
    pub const FADE_STEP: u8 = 5;

    pub fn new(title: &str) -> Self {
        Self {
            text: FadingText::new(title, Vec2::splat(CHAR_SIZE), u8::MAX, Self::FADE_STEP),
            hold_ticks: Self::HOLD_TICKS,
        }
    }

    fn update(&mut self) -> bool {
        if self.hold_ticks > 0 {
            self.hold_ticks -= 1;
        } else {
            self.text.hide();
        }
        self.text.update()
    }
}

/// Drifting background square
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cloud {
    pub pos: Vec2,
    pub small: bool,
}

impl Cloud {
    pub fn size(&self) -> f32 {
        if self.small { 8.0 } else { 16.0 }
    }

    pub fn speed(&self) -> f32 {
        if self.small { 0.2 } else { 0.4 }
    }

    pub fn alpha(&self) -> u8 {
        if self.small { 100 } else { 150 }
    }

    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: Vec2::splat(self.size()),
        }
    }
}

/// Frame shake counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScreenShake {
    pub remaining: u32,
}

impl ScreenShake {
    pub const DEATH: u32 = 10;
    pub const FLIP: u32 = 15;
    pub const ADVANCE: u32 = 25;
    pub const FINALE: u32 = 40;

    pub fn start(&mut self, ticks: u32) {
        self.remaining = ticks;
    }

    /// Max pixel offset for the current shake
    pub fn intensity(&self) -> i32 {
        match self.remaining {
            0 => 0,
            r if r > 25 => 4,
            r if r > 15 => 2,
            _ => 1,
        }
    }
}

/// All decoration for a session
#[derive(Debug, Clone, PartialEq)]
pub struct Decor {
    pub particles: Vec<Particle>,
    pub clouds: Vec<Cloud>,
    pub title: Option<TitleCard>,
    pub move_hint: Option<FadingText>,
    pub flip_hint: Option<FadingText>,
    pub shake: ScreenShake,
    /// Offset applied to the stage this frame
    pub shake_offset: Vec2,
    rng: Pcg32,
}

impl Decor {
    pub fn new(rng: Pcg32) -> Self {
        let mut decor = Self {
            particles: Vec::new(),
            clouds: Vec::new(),
            title: None,
            move_hint: None,
            flip_hint: None,
            shake: ScreenShake::default(),
            shake_offset: Vec2::ZERO,
            rng,
        };
        for _ in 0..CLOUD_COUNT {
            let pos = Vec2::new(
                decor.rng.random_range(0..=SCREEN_WIDTH as i32) as f32,
                decor.rng.random_range(0..=SCREEN_HEIGHT as i32) as f32,
            );
            decor.add_cloud(pos);
        }
        decor
    }

    /// Add a cloud unless it would overlap an existing one
    fn add_cloud(&mut self, pos: Vec2) {
        let cloud = Cloud {
            pos,
            small: self.rng.random_bool(0.5),
        };
        let rect = cloud.rect();
        if self.clouds.iter().all(|c| !c.rect().overlaps(&rect)) {
            self.clouds.push(cloud);
        }
    }

    /// Show the instruction hints
    pub fn add_hints(&mut self) {
        self.move_hint = Some(FadingText::new(MOVE_HINT, Vec2::new(16.0, 160.0), u8::MAX, 15));
        self.flip_hint = Some(FadingText::new(FLIP_HINT, Vec2::new(100.0, 160.0), 0, 15));
    }

    pub fn show_title(&mut self, title: &str) {
        self.title = Some(TitleCard::new(title));
    }

    /// Drop level-scoped decoration
    pub fn clear_level(&mut self) {
        self.particles.clear();
        self.title = None;
        self.move_hint = None;
        self.flip_hint = None;
    }

    pub fn spawn_death(&mut self, center: Vec2) {
        for _ in 0..DEATH_PARTICLES {
            let speed = self.rng.random_range(2..=3) as f32;
            let angle = self.rng.random_range(0..=360) as f32;
            self.particles
                .push(Particle::burst(center, speed, angle, 8.0, ParticleKind::Death));
        }
    }

    pub fn spawn_crumble(&mut self, center: Vec2, color: PlaneColor) {
        for _ in 0..CRUMBLE_PARTICLES {
            let speed = self.rng.random_range(1..=2) as f32;
            let angle = self.rng.random_range(0..=360) as f32;
            self.particles
                .push(Particle::burst(center, speed, angle, 4.0, ParticleKind::Crumble { color }));
        }
    }

    /// Sparkles that start on a ring around `center` and drift inward
    pub fn spawn_sparkles(&mut self, center: Vec2) {
        for _ in 0..SPARKLES_PER_FRAME {
            let angle = (self.rng.random_range(0..=360) as f32).to_radians();
            let dir = Vec2::new(angle.cos(), angle.sin());
            let rgb = [self.rng.random(), self.rng.random(), self.rng.random()];
            self.particles.push(Particle {
                pos: center + dir * SPARKLE_DISTANCE as f32,
                vel: -dir,
                size: 4.0,
                alpha: 0.0,
                kind: ParticleKind::Sparkle {
                    rgb,
                    distance: SPARKLE_DISTANCE,
                },
            });
        }
    }

    /// Drive hint visibility from tutorial progress
    pub fn update_hints(&mut self, has_moved: bool, has_flipped: bool, player_x: f32) {
        if !has_moved {
            if let Some(hint) = self.move_hint.as_mut() {
                hint.show();
            }
            return;
        }
        if let Some(hint) = self.move_hint.as_mut() {
            hint.hide();
        }
        if let Some(hint) = self.flip_hint.as_mut() {
            if has_flipped {
                hint.hide();
            } else if player_x >= FLIP_HINT_X {
                hint.show();
            }
        }
    }

    /// Advance all decoration one tick
    pub fn update(&mut self, background: Background) {
        self.particles.retain_mut(Particle::update);

        let speed_sign = match background {
            Background::Black => 1.0,
            Background::White => -1.0,
        };
        let mut respawn = Vec::new();
        self.clouds.retain_mut(|cloud| {
            cloud.pos.x += cloud.speed() * speed_sign;
            let gone = cloud.pos.x > SCREEN_WIDTH + 16.0 || cloud.pos.x < -16.0;
            if gone {
                respawn.push(if speed_sign > 0.0 { -16.0 } else { SCREEN_WIDTH + 16.0 });
            }
            !gone
        });
        for x in respawn {
            let y = self.rng.random_range(0..=SCREEN_HEIGHT as i32) as f32;
            self.add_cloud(Vec2::new(x, y));
        }

        if self.title.as_mut().is_some_and(|title| !title.update()) {
            self.title = None;
        }
        if self.move_hint.as_mut().is_some_and(|hint| !hint.update()) {
            self.move_hint = None;
        }
        if self.flip_hint.as_mut().is_some_and(|hint| !hint.update()) {
            self.flip_hint = None;
        }

        let intensity = self.shake.intensity();
        self.shake_offset = if intensity > 0 {
            Vec2::new(
                self.rng.random_range(-intensity..=intensity) as f32,
                self.rng.random_range(-intensity..=intensity) as f32,
            )
        } else {
            Vec2::ZERO
        };
        self.shake.remaining = self.shake.remaining.saturating_sub(1);
    }
}
