//! `.lvl` level format
//!
//! - `decode`: bytes to `LevelData`
//! - `encode`: authoring pipeline, `LevelData` to bytes
//! - `source`: indexed level collections (directory or memory)

pub mod decode;
pub mod encode;
pub mod error;
pub mod source;
pub mod token;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use decode::decode;
pub use encode::encode;
pub use error::{FormatError, LevelError};
pub use source::{LevelDir, LevelSource, MemoryLevels};
pub use token::Token;

use crate::sim::entity::{Background, EntityKind, Placement};

/// A decoded level: header plus every placement, player included
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub title: String,
    pub background: Background,
    #[serde(default)]
    pub wrapping: bool,
    pub placements: Vec<Placement>,
}

impl LevelData {
    pub fn player(&self) -> Option<&Placement> {
        self.placements
            .iter()
            .find(|p| matches!(p.kind, EntityKind::Player { .. }))
    }

    /// Placement count per kind name, for summaries
    pub fn kind_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for placement in &self.placements {
            *counts.entry(kind_name(&placement.kind)).or_insert(0) += 1;
        }
        counts
    }
}

pub fn kind_name(kind: &EntityKind) -> &'static str {
    match kind {
        EntityKind::Player { .. } => "player",
        EntityKind::Block => "block",
        EntityKind::Unstable => "unstable",
        EntityKind::Spike { .. } => "spike",
        EntityKind::Spring => "spring",
        EntityKind::Exit => "exit",
        EntityKind::RgbExit => "rgb_exit",
        EntityKind::Kill => "kill",
    }
}
