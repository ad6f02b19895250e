//! Single-byte `.lvl` tokens
//!
//! - `0xxxxxxx`: run of `x + 1` empty cells (1..=128)
//! - `1tttxxxx`: entity of type `t`; the low nibble `x` is type-specific
//!   (player: bit 3 facing left, bit 2 wrapping; spike: bits 3..2 direction)

use super::error::FormatError;
use crate::sim::entity::{EntityKind, Facing, SpikeDirection};

pub const ENTITY_FLAG: u8 = 0x80;
pub const PLAYER_FACING_LEFT: u8 = 0x08;
pub const PLAYER_WRAPPING: u8 = 0x04;

/// Longest empty run one token can encode
pub const MAX_RUN: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Skip this many cells
    Empty(usize),
    /// Occupy one cell
    Entity(EntityKind),
}

impl Token {
    pub fn from_byte(byte: u8) -> Result<Self, FormatError> {
        if byte & ENTITY_FLAG == 0 {
            return Ok(Token::Empty(byte as usize + 1));
        }
        let kind = match (byte >> 4) & 0b111 {
            0 => EntityKind::Player {
                facing: if byte & PLAYER_FACING_LEFT != 0 {
                    Facing::Left
                } else {
                    Facing::Right
                },
                wrapping: byte & PLAYER_WRAPPING != 0,
            },
            1 => EntityKind::Block,
            2 => EntityKind::Unstable,
            3 => EntityKind::Spike {
                direction: SpikeDirection::try_from((byte >> 2) & 0b11)?,
            },
            4 => EntityKind::Spring,
            5 => EntityKind::Exit,
            6 => EntityKind::RgbExit,
            _ => EntityKind::Kill,
        };
        Ok(Token::Entity(kind))
    }

    pub fn to_byte(&self) -> Result<u8, FormatError> {
        match *self {
            Token::Empty(0) => Err(FormatError::EmptyRun),
            Token::Empty(run) if run > MAX_RUN => Err(FormatError::RunTooLong(run)),
            Token::Empty(run) => Ok((run - 1) as u8),
            Token::Entity(kind) => {
                let mut byte = ENTITY_FLAG | (kind.type_code() << 4);
                match kind {
                    EntityKind::Player { facing, wrapping } => {
                        if facing == Facing::Left {
                            byte |= PLAYER_FACING_LEFT;
                        }
                        if wrapping {
                            byte |= PLAYER_WRAPPING;
                        }
                    }
                    EntityKind::Spike { direction } => byte |= (direction as u8) << 2,
                    _ => {}
                }
                Ok(byte)
            }
        }
    }
}
