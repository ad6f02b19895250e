//! Entity kinds, capabilities and per-entity state
//!
//! Every placed object carries a plane color. Whether it takes part in the
//! simulation is decided by comparing that color with the world background:
//! an entity whose color matches the background is merged into it and inert.
//! GREY never matches a BLACK or WHITE background, so GREY entities are always
//! active.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geom::Rect;
use crate::consts::TILE_SIZE;
use crate::tuning::Tuning;

/// Frames in every looping sprite animation
pub const FRAME_COUNT: usize = 4;

/// Inset (px) of the exit outline for each animation frame
pub const EXIT_INSETS: [u8; FRAME_COUNT] = [4, 5, 7, 5];

/// Colors the RGB exit cycles through
pub const RGB_EXIT_PALETTE: [[u8; 3]; 7] = [
    [255, 0, 0],
    [255, 128, 0],
    [255, 192, 0],
    [16, 200, 32],
    [0, 32, 255],
    [0, 128, 255],
    [128, 0, 255],
];

/// One of the three tile planes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaneColor {
    Black,
    #[default]
    Grey,
    White,
}

impl PlaneColor {
    /// Planes in `.lvl` stream order
    pub const PLANES: [PlaneColor; 3] = [PlaneColor::Black, PlaneColor::Grey, PlaneColor::White];

    /// Gray level used when drawing this color
    pub fn luminance(self) -> u8 {
        match self {
            PlaneColor::Black => 0,
            PlaneColor::Grey => 128,
            PlaneColor::White => 255,
        }
    }

    /// Index of this color's plane in the `.lvl` stream
    pub fn plane_index(self) -> usize {
        match self {
            PlaneColor::Black => 0,
            PlaneColor::Grey => 1,
            PlaneColor::White => 2,
        }
    }
}

/// The world background. Only BLACK and WHITE can be backgrounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    Black,
    White,
}

impl Background {
    pub fn color(self) -> PlaneColor {
        match self {
            Background::Black => PlaneColor::Black,
            Background::White => PlaneColor::White,
        }
    }

    pub fn inverse(self) -> Self {
        match self {
            Background::Black => Background::White,
            Background::White => Background::Black,
        }
    }

    /// `None` for GREY, which can never be a background
    pub fn from_color(color: PlaneColor) -> Option<Self> {
        match color {
            PlaneColor::Black => Some(Background::Black),
            PlaneColor::White => Some(Background::White),
            PlaneColor::Grey => None,
        }
    }
}

/// Horizontal facing of the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    #[default]
    Right,
    Left,
}

impl Facing {
    /// Sign of movement along x
    pub fn sign(self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }
}

/// Raised when a spike direction is built from an out-of-range value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid spike direction {0}, expected 0..=3")]
pub struct InvalidDirectionError(pub u8);

/// Which way a spike bed points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpikeDirection {
    Up = 0,
    Left = 1,
    Down = 2,
    Right = 3,
}

impl TryFrom<u8> for SpikeDirection {
    type Error = InvalidDirectionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SpikeDirection::Up),
            1 => Ok(SpikeDirection::Left),
            2 => Ok(SpikeDirection::Down),
            3 => Ok(SpikeDirection::Right),
            other => Err(InvalidDirectionError(other)),
        }
    }
}

/// A cell on the level grid. Columns -1 and 32 hold generated walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub column: i32,
    pub row: i32,
}

impl GridCell {
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Top-left corner of the cell in pixels
    pub fn origin(self) -> Vec2 {
        Vec2::new(self.column as f32 * TILE_SIZE, self.row as f32 * TILE_SIZE)
    }
}

/// What kind of object sits in a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityKind {
    Player { facing: Facing, wrapping: bool },
    Block,
    Unstable,
    Spike { direction: SpikeDirection },
    Spring,
    Exit,
    RgbExit,
    Kill,
}

/// Effect applied to the player on contact with an interactable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactEffect {
    /// Spikes and kill zones
    Kill,
    /// Springs
    Launch,
    /// Normal exits advance to the next level
    CompleteLevel,
    /// The RGB exit ends the run
    EndGame,
}

/// Role table entry for an entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Blocks player motion
    pub collides: bool,
    /// Tested in the interaction pass
    pub interacts: bool,
    /// Reset when the player dies
    pub regenerates: bool,
    /// Runs the shared 4-frame animation
    pub animated: bool,
    /// Effect on touch, for interactables
    pub contact: Option<ContactEffect>,
}

impl Capabilities {
    const NONE: Self = Self {
        collides: false,
        interacts: false,
        regenerates: false,
        animated: false,
        contact: None,
    };

    const fn interactable(effect: ContactEffect, animated: bool) -> Self {
        Self {
            collides: false,
            interacts: true,
            regenerates: false,
            animated,
            contact: Some(effect),
        }
    }
}

impl EntityKind {
    /// 3-bit type field of the `.lvl` entity token
    pub fn type_code(&self) -> u8 {
        match self {
            EntityKind::Player { .. } => 0,
            EntityKind::Block => 1,
            EntityKind::Unstable => 2,
            EntityKind::Spike { .. } => 3,
            EntityKind::Spring => 4,
            EntityKind::Exit => 5,
            EntityKind::RgbExit => 6,
            EntityKind::Kill => 7,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        match self {
            EntityKind::Player { .. } => Capabilities::NONE,
            EntityKind::Block => Capabilities {
                collides: true,
                ..Capabilities::NONE
            },
            EntityKind::Unstable => Capabilities {
                collides: true,
                regenerates: true,
                ..Capabilities::NONE
            },
            EntityKind::Spike { .. } => Capabilities::interactable(ContactEffect::Kill, true),
            EntityKind::Spring => Capabilities::interactable(ContactEffect::Launch, true),
            EntityKind::Exit => Capabilities::interactable(ContactEffect::CompleteLevel, true),
            EntityKind::RgbExit => Capabilities::interactable(ContactEffect::EndGame, true),
            EntityKind::Kill => Capabilities::interactable(ContactEffect::Kill, false),
        }
    }

    /// Kinds that ignore their plane and always live on GREY
    pub fn forced_color(&self) -> Option<PlaneColor> {
        match self {
            EntityKind::Kill | EntityKind::RgbExit => Some(PlaneColor::Grey),
            _ => None,
        }
    }

    /// Pixel footprint of this kind when placed in `cell`
    pub fn footprint(&self, cell: GridCell) -> Rect {
        let origin = cell.origin();
        let full = TILE_SIZE;
        let half = TILE_SIZE / 2.0;
        let (offset, w, h) = match self {
            EntityKind::Unstable => (Vec2::ZERO, full, half),
            EntityKind::Spring => (Vec2::new(0.0, half), full, half),
            EntityKind::Spike { direction } => match direction {
                SpikeDirection::Up => (Vec2::new(0.0, half), full, half),
                SpikeDirection::Down => (Vec2::ZERO, full, half),
                SpikeDirection::Left => (Vec2::new(half, 0.0), half, full),
                SpikeDirection::Right => (Vec2::ZERO, half, full),
            },
            _ => (Vec2::ZERO, full, full),
        };
        Rect {
            pos: origin + offset,
            size: Vec2::new(w, h),
        }
    }
}

/// A kind placed in a cell on a given plane, as read from or written to `.lvl`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    #[serde(flatten)]
    pub cell: GridCell,
    #[serde(default)]
    pub color: PlaneColor,
    #[serde(flatten)]
    pub kind: EntityKind,
}

impl Placement {
    pub fn new(cell: GridCell, color: PlaneColor, kind: EntityKind) -> Self {
        Self {
            cell,
            color: kind.forced_color().unwrap_or(color),
            kind,
        }
    }
}

/// Tick counter driving a looping 4-frame animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameCounter {
    pub ticks: u32,
    pub index: usize,
}

impl FrameCounter {
    /// Count one tick. Returns true when the frame index changed.
    pub fn advance(&mut self, ticks_per_frame: u32) -> bool {
        self.ticks += 1;
        if self.ticks >= ticks_per_frame {
            self.ticks = 0;
            self.index = (self.index + 1) % FRAME_COUNT;
            true
        } else {
            false
        }
    }
}

/// Lifecycle of an unstable block
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum UnstablePhase {
    #[default]
    Intact,
    /// Stepped on; still solid until the grace timer runs out
    Breaking { grace: f32 },
    /// Gone: invisible and not collidable
    Broken { dead: f32 },
    /// Reappearing; collidable again only at full opacity
    FadingIn { opacity: u8 },
}

impl UnstablePhase {
    pub fn is_collidable(&self) -> bool {
        matches!(self, UnstablePhase::Intact | UnstablePhase::Breaking { .. })
    }

    pub fn opacity(&self) -> u8 {
        match self {
            UnstablePhase::Intact | UnstablePhase::Breaking { .. } => u8::MAX,
            UnstablePhase::Broken { .. } => 0,
            UnstablePhase::FadingIn { opacity } => *opacity,
        }
    }
}

/// Collision-relevant change produced by advancing an entity one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnstableChange {
    /// Grace period ended; the block vanished
    Broke,
    /// Fully faded back in
    Restored,
}

/// A placed, non-player object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub color: PlaneColor,
    pub cell: GridCell,
    pub rect: Rect,
    /// Cosmetic highlight shown after a blocked flip (0 = none)
    pub flash: f32,
    pub frame: FrameCounter,
    /// Only leaves `Intact` for unstable blocks
    pub unstable: UnstablePhase,
    /// RGB exit palette position
    pub palette_index: usize,
}

impl Entity {
    pub fn new(kind: EntityKind, color: PlaneColor, cell: GridCell) -> Self {
        Self {
            kind,
            color: kind.forced_color().unwrap_or(color),
            cell,
            rect: kind.footprint(cell),
            flash: 0.0,
            frame: FrameCounter::default(),
            unstable: UnstablePhase::Intact,
            palette_index: 0,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.kind.capabilities()
    }

    /// Not merged into the background
    pub fn is_active(&self, background: Background) -> bool {
        self.color != background.color()
    }

    /// Takes part in collision right now
    pub fn is_solid(&self, background: Background) -> bool {
        self.capabilities().collides && self.unstable.is_collidable() && self.is_active(background)
    }

    /// Drawn opacity before background suppression
    pub fn opacity(&self) -> u8 {
        self.unstable.opacity()
    }

    /// Start breaking an intact unstable block. Returns true if it started.
    pub fn trigger_break(&mut self, tuning: &Tuning) -> bool {
        if self.kind == EntityKind::Unstable && self.unstable == UnstablePhase::Intact {
            self.unstable = UnstablePhase::Breaking {
                grace: tuning.unstable_grace,
            };
            true
        } else {
            false
        }
    }

    /// Back to the freshly loaded state
    pub fn regen(&mut self) {
        self.unstable = UnstablePhase::Intact;
    }

    /// Light up relative to `origin`: full strength at distance 0, none past the radius
    pub fn flash_from(&mut self, origin: Vec2, tuning: &Tuning) {
        let distance = self.rect.center().distance(origin);
        if distance > tuning.flash_radius {
            return;
        }
        self.flash = (tuning.flash_radius - distance) / tuning.flash_radius * tuning.flash_peak;
    }

    /// Inset of the exit outline for the current frame
    pub fn exit_inset(&self) -> u8 {
        EXIT_INSETS[self.frame.index]
    }

    /// Current RGB exit color
    pub fn palette_color(&self) -> [u8; 3] {
        RGB_EXIT_PALETTE[self.palette_index % RGB_EXIT_PALETTE.len()]
    }

    /// Advance timers, animation and flash by one tick
    pub fn advance(&mut self, background: Background, tuning: &Tuning, dt: f32) -> Option<UnstableChange> {
        let change = self.advance_unstable(tuning, dt);

        let stepped = self.capabilities().animated && self.frame.advance(tuning.frame_ticks);
        if stepped && self.kind == EntityKind::RgbExit && self.frame.index == FRAME_COUNT - 1 {
            self.palette_index = (self.palette_index + 1) % RGB_EXIT_PALETTE.len();
        }

        if self.is_active(background) {
            self.flash = 0.0;
        }
        if self.flash > 0.0 {
            self.flash = (self.flash - tuning.flash_decay).max(0.0);
        }

        change
    }

    fn advance_unstable(&mut self, tuning: &Tuning, dt: f32) -> Option<UnstableChange> {
        match self.unstable {
            UnstablePhase::Intact => None,
            UnstablePhase::Breaking { grace } => {
                let grace = grace - dt;
                if grace <= 0.0 {
                    self.unstable = UnstablePhase::Broken {
                        dead: tuning.unstable_dead - dt,
                    };
                    Some(UnstableChange::Broke)
                } else {
                    self.unstable = UnstablePhase::Breaking { grace };
                    None
                }
            }
            UnstablePhase::Broken { dead } => {
                let dead = dead - dt;
                if dead > 0.0 {
                    self.unstable = UnstablePhase::Broken { dead };
                    None
                } else {
                    self.fade_in(0, tuning)
                }
            }
            UnstablePhase::FadingIn { opacity } => self.fade_in(opacity, tuning),
        }
    }

    fn fade_in(&mut self, opacity: u8, tuning: &Tuning) -> Option<UnstableChange> {
        let opacity = opacity.saturating_add(tuning.unstable_fade_step);
        if opacity == u8::MAX {
            self.unstable = UnstablePhase::Intact;
            Some(UnstableChange::Restored)
        } else {
            self.unstable = UnstablePhase::FadingIn { opacity };
            None
        }
    }
}
