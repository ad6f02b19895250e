//! `.lvl` authoring encoder
//!
//! Three stages, mirroring the decoder in reverse:
//! 1. place: sort placements into per-plane grids, validating the player
//! 2. compress: turn each plane into tokens, folding empty cells into runs
//! 3. serialize: header plus token bytes

use super::LevelData;
use super::decode::MAGIC;
use super::error::FormatError;
use super::token::{MAX_RUN, Token};
use crate::consts::{GRID_COLUMNS, GRID_ROWS, PLANE_CELLS, PLANE_COUNT};
use crate::sim::entity::{EntityKind, GridCell, PlaneColor};

/// One plane's cells, row-major
pub type PlaneGrid = Vec<Option<EntityKind>>;

/// Stage 1: per-plane grids in stream order (BLACK, GREY, WHITE)
///
/// The player always goes on the background plane with the level's wrapping
/// flag; Kill and RgbExit always go on GREY.
pub fn place(level: &LevelData) -> Result<[PlaneGrid; PLANE_COUNT], FormatError> {
    let mut planes: [PlaneGrid; PLANE_COUNT] = std::array::from_fn(|_| vec![None; PLANE_CELLS]);
    let mut player: Option<GridCell> = None;

    for placement in &level.placements {
        let GridCell { column, row } = placement.cell;
        if !(0..GRID_COLUMNS as i32).contains(&column) || !(0..GRID_ROWS as i32).contains(&row) {
            return Err(FormatError::OutOfGrid { column, row });
        }

        let (color, kind) = match placement.kind {
            EntityKind::Player { facing, .. } => {
                if let Some(first) = player {
                    return Err(FormatError::DuplicatePlayer {
                        first,
                        second: placement.cell,
                    });
                }
                player = Some(placement.cell);
                (
                    level.background.color(),
                    EntityKind::Player {
                        facing,
                        wrapping: level.wrapping,
                    },
                )
            }
            kind => (kind.forced_color().unwrap_or(placement.color), kind),
        };

        let slot = &mut planes[color.plane_index()][row as usize * GRID_COLUMNS + column as usize];
        if slot.is_some() {
            return Err(FormatError::CellOccupied { column, row });
        }
        *slot = Some(kind);
    }

    if player.is_none() {
        return Err(FormatError::MissingPlayer);
    }
    Ok(planes)
}

/// Stage 2: tokens for one plane; runs never exceed 128 and end with the plane
pub fn compress(plane: &[Option<EntityKind>]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut run = 0;

    for cell in plane {
        match cell {
            None => {
                run += 1;
                if run == MAX_RUN {
                    tokens.push(Token::Empty(run));
                    run = 0;
                }
            }
            Some(kind) => {
                if run > 0 {
                    tokens.push(Token::Empty(run));
                    run = 0;
                }
                tokens.push(Token::Entity(*kind));
            }
        }
    }
    if run > 0 {
        tokens.push(Token::Empty(run));
    }
    tokens
}

/// Stage 3: header and token bytes
pub fn serialize(title: &str, planes: &[Vec<Token>]) -> Result<Vec<u8>, FormatError> {
    let mut bytes = MAGIC.to_vec();
    for ch in title.chars() {
        let code = u32::from(ch);
        if code == 0 || code > 0xFF {
            return Err(FormatError::InvalidTitle);
        }
        bytes.push(code as u8);
    }
    bytes.push(0);

    for token in planes.iter().flatten() {
        bytes.push(token.to_byte()?);
    }
    Ok(bytes)
}

/// Encode a level into `.lvl` bytes
pub fn encode(level: &LevelData) -> Result<Vec<u8>, FormatError> {
    let planes = place(level)?;
    let tokens: Vec<Vec<Token>> = planes.iter().map(|plane| compress(plane)).collect();
    let bytes = serialize(&level.title, &tokens)?;
    log::debug!(
        "encoded '{}': {} placements, {} bytes",
        level.title,
        level.placements.len(),
        bytes.len()
    );
    Ok(bytes)
}
