//! Level lifecycle
//!
//! A `Session` owns the level source, the loaded `World`, decoration and the
//! run counters. It moves through `LevelPhase`s:
//! - `Loading`: nothing loaded yet
//! - `Active`: a level is being played
//! - `Completing`: the RGB exit was reached on the last level; idle, then fade out
//! - `Ended`: fade finished, the run is over
//!
//! Loading always decodes the next level before tearing down the current one,
//! so a bad level file leaves the running level untouched.

use std::fmt;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::audio::SoundEvent;
use crate::consts::SIM_DT;
use crate::level::{LevelError, LevelSource};
use crate::sim::decor::{Decor, ScreenShake};
use crate::sim::entity::{Background, EntityKind};
use crate::sim::flip::FlipOutcome;
use crate::sim::state::SessionCounters;
use crate::sim::tick::{TickEvent, TickInput, TickOutcome, TickReport, tick};
use crate::sim::world::World;
use crate::tuning::Tuning;

/// Ticks to hold still after the final RGB exit before fading out
pub const COMPLETION_IDLE_TICKS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LevelPhase {
    #[default]
    Loading,
    Active,
    Completing {
        idle_ticks: u32,
        /// 0-255; 255 is fully faded
        fade_alpha: u8,
    },
    Ended,
}

/// End-of-run numbers
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSummary {
    /// Index of the level being played (or last played)
    pub level_index: usize,
    pub level_count: usize,
    pub deaths: u32,
    pub elapsed: f64,
    pub completed: bool,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "level {}/{}, {} deaths, time {}{}",
            self.level_index + 1,
            self.level_count,
            self.deaths,
            format_elapsed(self.elapsed),
            if self.completed { ", complete" } else { "" }
        )
    }
}

/// `MM:SS`, or `HH:MM:SS` from one hour on
pub fn format_elapsed(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let (hours, minutes, secs) = (total / 3600, total / 60 % 60, total % 60);
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

/// One play-through over a level source
#[derive(Debug, Clone, PartialEq)]
pub struct Session<S: LevelSource> {
    source: S,
    tuning: Tuning,
    seed: u64,
    world: Option<World>,
    decor: Decor,
    counters: SessionCounters,
    phase: LevelPhase,
    level_index: usize,
    title: String,
    /// The last level has been completed
    terminal: bool,
    has_moved: bool,
    has_flipped: bool,
}

impl<S: LevelSource> Session<S> {
    pub fn new(source: S, tuning: Tuning, seed: u64) -> Self {
        Self {
            source,
            tuning,
            seed,
            world: None,
            decor: Decor::new(Pcg32::seed_from_u64(seed)),
            counters: SessionCounters::default(),
            phase: LevelPhase::Loading,
            level_index: 0,
            title: String::new(),
            terminal: false,
            has_moved: false,
            has_flipped: false,
        }
    }

    /// Reset the run and load the first level
    pub fn start(&mut self) -> Result<(), LevelError> {
        self.counters = SessionCounters::default();
        self.decor = Decor::new(Pcg32::seed_from_u64(self.seed));
        self.terminal = false;
        self.has_moved = false;
        self.has_flipped = false;
        self.generate(0)?;
        self.decor.add_hints();
        log::info!("Session started with {} levels (seed {})", self.source.len(), self.seed);
        Ok(())
    }

    /// Load level `index`, replacing the current one
    pub fn generate(&mut self, index: usize) -> Result<(), LevelError> {
        let level = match self.source.load(index) {
            Ok(level) => level,
            Err(e) => {
                log::error!("Aborting load of level {}: {}", index, e);
                return Err(e);
            }
        };

        self.destroy();
        let world = World::from_level(&level);
        log::info!(
            "Generated level {} '{}': background {:?}, wrapping {}, {} entities",
            index,
            level.title,
            level.background,
            level.wrapping,
            world.entities.len()
        );
        self.decor.show_title(&level.title);
        self.world = Some(world);
        self.level_index = index;
        self.title = level.title;
        self.phase = LevelPhase::Active;
        Ok(())
    }

    /// Player death: restore the level in place and count it
    pub fn regen(&mut self) {
        let Some(world) = self.world.as_mut() else {
            return;
        };
        world.regen();
        self.counters.deaths += 1;
        self.decor.shake.start(ScreenShake::DEATH);
        log::debug!("Regenerated level {} (deaths: {})", self.level_index, self.counters.deaths);
    }

    /// Advance to the next level, or mark the run terminal after the last one
    pub fn complete(&mut self) -> Result<(), LevelError> {
        let next = self.level_index + 1;
        if next < self.source.len() {
            log::info!("Level {} complete", self.level_index);
            self.decor.shake.start(ScreenShake::ADVANCE);
            self.generate(next)
        } else {
            log::info!(
                "Final level complete: {} deaths in {}",
                self.counters.deaths,
                format_elapsed(self.counters.elapsed)
            );
            self.decor.shake.start(ScreenShake::FINALE);
            self.terminal = true;
            Ok(())
        }
    }

    /// Remove the current level's entities and level-scoped decoration
    pub fn destroy(&mut self) {
        if let Some(world) = self.world.as_mut() {
            world.clear();
        }
        self.world = None;
        self.decor.clear_level();
    }

    /// Advance one fixed timestep
    pub fn step(&mut self, input: &TickInput) -> Result<TickReport, LevelError> {
        match self.phase {
            LevelPhase::Loading | LevelPhase::Ended => return Ok(TickReport::default()),
            LevelPhase::Completing { idle_ticks, fade_alpha } => {
                self.phase = if idle_ticks < COMPLETION_IDLE_TICKS {
                    LevelPhase::Completing {
                        idle_ticks: idle_ticks + 1,
                        fade_alpha,
                    }
                } else if fade_alpha < u8::MAX {
                    LevelPhase::Completing {
                        idle_ticks,
                        fade_alpha: fade_alpha + 1,
                    }
                } else {
                    log::info!("Run ended");
                    LevelPhase::Ended
                };
            }
            LevelPhase::Active => {}
        }
        let active = self.phase == LevelPhase::Active;

        let Some(world) = self.world.as_mut() else {
            return Ok(TickReport::default());
        };
        if active && world.player.is_some() {
            self.counters.elapsed += f64::from(SIM_DT);
        }

        let input = if active { *input } else { TickInput::default() };
        let mut report = tick(world, &input, &self.tuning, SIM_DT);

        if report.moved {
            self.has_moved = true;
        }
        if report.flip == Some(FlipOutcome::Flipped) {
            self.has_flipped = true;
            self.decor.shake.start(ScreenShake::FLIP);
        }

        for event in &report.events {
            if let TickEvent::Crumbled { rect, color, .. } = event {
                self.decor.spawn_crumble(rect.center(), *color);
            }
        }
        for (_, entity) in world.entities.iter() {
            if entity.kind == EntityKind::RgbExit && entity.frame.ticks == 0 {
                self.decor.spawn_sparkles(entity.rect.center());
            }
        }
        if let Some(player) = world.player.as_ref() {
            self.decor.update_hints(self.has_moved, self.has_flipped, player.pos.x);
        }

        match report.outcome {
            TickOutcome::Continue => {}
            TickOutcome::Died { at } => {
                self.decor.spawn_death(at);
                self.regen();
            }
            TickOutcome::LevelComplete => {
                report.events.push(TickEvent::Sound(SoundEvent::Exit));
                self.complete()?;
            }
            TickOutcome::GameComplete => {
                report.events.push(TickEvent::Sound(SoundEvent::Exit));
                world.player = None;
                self.complete()?;
                if self.terminal {
                    self.phase = LevelPhase::Completing {
                        idle_ticks: 0,
                        fade_alpha: 0,
                    };
                }
            }
        }

        self.decor.update(self.background());
        Ok(report)
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    pub fn decor(&self) -> &Decor {
        &self.decor
    }

    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    pub fn phase(&self) -> LevelPhase {
        self.phase
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn level_count(&self) -> usize {
        self.source.len()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Current background; black before any level is loaded
    pub fn background(&self) -> Background {
        self.world
            .as_ref()
            .map_or(Background::Black, |world| world.state.background)
    }

    /// Screen fade toward the end screen, 0-255
    pub fn fade_alpha(&self) -> u8 {
        match self.phase {
            LevelPhase::Completing { fade_alpha, .. } => fade_alpha,
            LevelPhase::Ended => u8::MAX,
            _ => 0,
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            level_index: self.level_index,
            level_count: self.source.len(),
            deaths: self.counters.deaths,
            elapsed: self.counters.elapsed,
            completed: self.terminal,
        }
    }
}
