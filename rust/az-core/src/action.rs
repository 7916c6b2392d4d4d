//! Move definition, index mapping and text notation.
//!
//! Move space size: `MOVE_SPACE = 6 * 6 * 5 = 180`
//! - source bin: 0..=4 factory bins, 5 = pool
//! - target: 0..=4 staging rows, 5 = floor
//! - color: Blue..White

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::color::{Color, COLOR_COUNT};
use crate::state::{BIN_COUNT, POOL, WALL_SIZE};

/// Number of source slots (factory bins + pool).
pub const SOURCE_SLOTS: usize = BIN_COUNT + 1;
/// Number of target slots (staging rows + floor).
pub const TARGET_SLOTS: usize = WALL_SIZE + 1;
/// Target index meaning "straight to the floor".
pub const FLOOR_TARGET: u8 = WALL_SIZE as u8;
pub const POOL_SOURCE: u8 = POOL as u8;
pub const MOVE_SPACE: usize = SOURCE_SLOTS * TARGET_SLOTS * COLOR_COUNT; // 180

/// Take every tile of `color` from `source_bin` and put them on `target_queue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub source_bin: u8,
    pub color: Color,
    pub target_queue: u8,
}

impl Move {
    pub fn new(source_bin: u8, color: Color, target_queue: u8) -> Self {
        Self {
            source_bin,
            color,
            target_queue,
        }
    }

    pub fn is_from_pool(&self) -> bool {
        self.source_bin == POOL_SOURCE
    }

    pub fn is_to_floor(&self) -> bool {
        self.target_queue == FLOOR_TARGET
    }

    /// True if all fields are within the move space.
    pub fn in_range(&self) -> bool {
        (self.source_bin as usize) < SOURCE_SLOTS
            && (self.target_queue as usize) < TARGET_SLOTS
            && self.color.is_tile()
    }
}

/// Convert a `Move` to its compact index (0..180).
///
/// # Panics
/// Panics if the move is out of range (see [`Move::in_range`]).
pub fn move_to_index(m: Move) -> u16 {
    assert!(m.in_range(), "Move out of range: {:?}", m);
    (m.source_bin as u16) * (TARGET_SLOTS * COLOR_COUNT) as u16
        + (m.target_queue as u16) * COLOR_COUNT as u16
        + m.color.slot() as u16
}

/// Convert a compact index (0..180) back to a `Move`.
///
/// # Panics
/// Panics if `idx >= MOVE_SPACE`.
pub fn index_to_move(idx: u16) -> Move {
    assert!((idx as usize) < MOVE_SPACE, "Move index out of range: {}", idx);
    let per_source = (TARGET_SLOTS * COLOR_COUNT) as u16;
    let source_bin = (idx / per_source) as u8;
    let rem = idx % per_source;
    let target_queue = (rem / COLOR_COUNT as u16) as u8;
    let color = Color::from_slot((rem % COLOR_COUNT as u16) as usize);
    Move::new(source_bin, color, target_queue)
}

/// `"<bin><color><target>"`, e.g. `3K1`.
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.source_bin,
            self.color.to_char(),
            self.target_queue
        )
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseMoveError {
    #[error("move notation must be 3 characters, got {0:?}")]
    Length(String),
    #[error("invalid source bin {0:?}")]
    Source(char),
    #[error("invalid color {0:?}")]
    Color(char),
    #[error("invalid target {0:?}")]
    Target(char),
}

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.trim().chars().collect();
        if chars.len() != 3 {
            return Err(ParseMoveError::Length(s.to_string()));
        }
        let source_bin = chars[0]
            .to_digit(10)
            .filter(|&d| (d as usize) < SOURCE_SLOTS)
            .ok_or(ParseMoveError::Source(chars[0]))? as u8;
        let color = Color::from_char(chars[1])
            .filter(|c| c.is_tile())
            .ok_or(ParseMoveError::Color(chars[1]))?;
        let target_queue = chars[2]
            .to_digit(10)
            .filter(|&d| (d as usize) < TARGET_SLOTS)
            .ok_or(ParseMoveError::Target(chars[2]))? as u8;
        Ok(Move::new(source_bin, color, target_queue))
    }
}
