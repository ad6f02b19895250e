//! Level loading errors

use std::path::PathBuf;

use thiserror::Error;

use crate::sim::entity::{GridCell, InvalidDirectionError};

/// Malformed `.lvl` data, on either side of the codec
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("missing `lvl` magic")]
    BadMagic,
    #[error("title is not NUL-terminated")]
    UnterminatedTitle,
    #[error("title must be Latin-1 without NUL bytes")]
    InvalidTitle,
    #[error("level has no player")]
    MissingPlayer,
    #[error("second player at {second:?} (first at {first:?})")]
    DuplicatePlayer { first: GridCell, second: GridCell },
    #[error("player placed on the grey plane")]
    PlayerOnGreyPlane,
    #[error("invalid spike direction {0}")]
    InvalidDirection(u8),
    #[error("empty run of {0} cells exceeds 128")]
    RunTooLong(usize),
    #[error("empty run of zero cells")]
    EmptyRun,
    #[error("cell ({column}, {row}) is outside the 32x16 grid")]
    OutOfGrid { column: i32, row: i32 },
    #[error("cell ({column}, {row}) is already occupied on this plane")]
    CellOccupied { column: i32, row: i32 },
}

impl From<InvalidDirectionError> for FormatError {
    fn from(err: InvalidDirectionError) -> Self {
        FormatError::InvalidDirection(err.0)
    }
}

/// Failure to produce a level from a source
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level {index} is malformed: {source}")]
    Format {
        index: usize,
        #[source]
        source: FormatError,
    },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no level with index {0}")]
    NotFound(usize),
}
