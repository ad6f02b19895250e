//! `.lvl` decoder
//!
//! Layout: `lvl` magic, NUL-terminated Latin-1 title, then three planes
//! (BLACK, GREY, WHITE) of tokens. Each plane is read until its 32x16 cells
//! are covered or the stream runs out; bytes after the third plane are
//! ignored.

use super::LevelData;
use super::error::FormatError;
use super::token::Token;
use crate::consts::{GRID_COLUMNS, GRID_ROWS};
use crate::sim::entity::{Background, EntityKind, GridCell, Placement, PlaneColor};

pub const MAGIC: &[u8; 3] = b"lvl";

/// Cursor over one plane's cells, row-major
struct PlaneCursor {
    column: usize,
    row: usize,
}

impl PlaneCursor {
    fn new() -> Self {
        Self { column: 0, row: 0 }
    }

    fn cell(&self) -> GridCell {
        GridCell::new(self.column as i32, self.row as i32)
    }

    /// Skip `cells`. Returns false once the plane is full.
    fn advance(&mut self, cells: usize) -> bool {
        self.column += cells;
        self.row += self.column / GRID_COLUMNS;
        self.column %= GRID_COLUMNS;
        self.row < GRID_ROWS
    }
}

/// Decode a `.lvl` byte stream
pub fn decode(bytes: &[u8]) -> Result<LevelData, FormatError> {
    let body = bytes.strip_prefix(MAGIC).ok_or(FormatError::BadMagic)?;
    let nul = body
        .iter()
        .position(|&b| b == 0)
        .ok_or(FormatError::UnterminatedTitle)?;
    let title: String = body[..nul].iter().map(|&b| b as char).collect();

    let mut stream = body[nul + 1..].iter();
    let mut placements = Vec::new();
    let mut player: Option<(GridCell, Background, bool)> = None;

    for color in PlaneColor::PLANES {
        let mut cursor = PlaneCursor::new();
        let mut complete = false;

        for &byte in stream.by_ref() {
            let cells = match Token::from_byte(byte)? {
                Token::Empty(run) => run,
                Token::Entity(kind) => {
                    let cell = cursor.cell();
                    if let EntityKind::Player { wrapping, .. } = kind {
                        if let Some((first, ..)) = player {
                            return Err(FormatError::DuplicatePlayer { first, second: cell });
                        }
                        let background = Background::from_color(color).ok_or(FormatError::PlayerOnGreyPlane)?;
                        player = Some((cell, background, wrapping));
                    }
                    placements.push(Placement::new(cell, color, kind));
                    1
                }
            };
            if !cursor.advance(cells) {
                complete = true;
                break;
            }
        }

        if !complete {
            log::warn!(
                "level '{}': {:?} plane ends early at ({}, {}); remaining cells left empty",
                title,
                color,
                cursor.column,
                cursor.row
            );
        }
    }

    let (_, background, wrapping) = player.ok_or(FormatError::MissingPlayer)?;
    Ok(LevelData {
        title,
        background,
        wrapping,
        placements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Facing, SpikeDirection};

    /// Header plus one full plane holding only what `first` puts at cell 0
    fn single_plane(first: u8) -> Vec<u8> {
        let mut bytes = b"lvlA\0".to_vec();
        bytes.push(first);
        // 511 remaining cells: 3 runs of 128 and one of 127
        bytes.extend([127, 127, 127, 126]);
        bytes
    }

    fn empty_plane() -> [u8; 4] {
        [127; 4]
    }

    #[test]
    fn test_minimal_level() {
        let mut bytes = single_plane(0x80);
        bytes.extend(empty_plane());
        bytes.extend(empty_plane());

        let level = decode(&bytes).unwrap();
        assert_eq!(level.title, "A");
        assert_eq!(level.background, Background::Black);
        assert!(!level.wrapping);
        assert_eq!(level.placements.len(), 1);
        assert_eq!(level.placements[0].cell, GridCell::new(0, 0));
        assert_eq!(
            level.placements[0].kind,
            EntityKind::Player {
                facing: Facing::Right,
                wrapping: false
            }
        );
    }

    #[test]
    fn test_bad_magic() {
        assert_eq!(decode(b"lv"), Err(FormatError::BadMagic));
        assert_eq!(decode(b"LVLx\0\x80"), Err(FormatError::BadMagic));
    }

    #[test]
    fn test_unterminated_title() {
        assert_eq!(decode(b"lvlabc"), Err(FormatError::UnterminatedTitle));
    }

    #[test]
    fn test_missing_player() {
        let mut bytes = b"lvl\0".to_vec();
        bytes.push(0x90);
        assert_eq!(decode(&bytes), Err(FormatError::MissingPlayer));
    }

    #[test]
    fn test_duplicate_player_fails() {
        let bytes = b"lvl\0\x80\x00\x88".to_vec();
        assert_eq!(
            decode(&bytes),
            Err(FormatError::DuplicatePlayer {
                first: GridCell::new(0, 0),
                second: GridCell::new(2, 0),
            })
        );
    }

    #[test]
    fn test_player_on_grey_plane() {
        let mut bytes = b"lvl\0".to_vec();
        bytes.extend([127; 4]);
        bytes.push(0x80);
        assert_eq!(decode(&bytes), Err(FormatError::PlayerOnGreyPlane));
    }

    #[test]
    fn test_run_boundaries() {
        // 127 -> 128 cells, 0 -> 1 cell
        let mut bytes = b"lvl\0".to_vec();
        bytes.extend([127, 0x90, 0, 0x84]);
        let level = decode(&bytes).unwrap();
        assert_eq!(level.placements[0].cell, GridCell::new(0, 4));
        assert_eq!(level.placements[1].cell, GridCell::new(2, 4));
        assert!(level.wrapping);
    }

    #[test]
    fn test_plane_colors_and_background() {
        let mut bytes = b"lvlT\0".to_vec();
        // Black plane: one block, rest empty
        bytes.push(0x90);
        bytes.extend([127, 127, 127, 126]);
        // Grey plane: kill zone
        bytes.push(0xF0);
        bytes.extend([127, 127, 127, 126]);
        // White plane: the player, facing left, then a spike
        bytes.extend([0x88, 0xB4]);
        let level = decode(&bytes).unwrap();

        assert_eq!(level.background, Background::White);
        let colors: Vec<PlaneColor> = level.placements.iter().map(|p| p.color).collect();
        assert_eq!(
            colors,
            vec![PlaneColor::Black, PlaneColor::Grey, PlaneColor::White, PlaneColor::White]
        );
        assert_eq!(
            level.placements[3].kind,
            EntityKind::Spike {
                direction: SpikeDirection::Left
            }
        );
    }

    #[test]
    fn test_run_past_plane_end_truncates() {
        let mut bytes = b"lvl\0\x80".to_vec();
        // 4 runs of 128 cover 512 cells starting at cell 1: the last overshoots
        bytes.extend([127; 4]);
        // Next byte belongs to the grey plane
        bytes.push(0x90);
        let level = decode(&bytes).unwrap();
        assert_eq!(level.placements.len(), 2);
        assert_eq!(level.placements[1].color, PlaneColor::Grey);
        assert_eq!(level.placements[1].cell, GridCell::new(0, 0));
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut bytes = single_plane(0x80);
        bytes.extend(empty_plane());
        bytes.extend(empty_plane());
        bytes.extend([0x90, 0x90, 0xFF]);
        assert_eq!(decode(&bytes).unwrap().placements.len(), 1);
    }

    #[test]
    fn test_latin1_title() {
        let mut bytes = b"lvl".to_vec();
        bytes.extend([b'c', 0xE9, 0]);
        bytes.push(0x80);
        assert_eq!(decode(&bytes).unwrap().title, "c\u{e9}");
    }
}
