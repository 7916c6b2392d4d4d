//! Wall layout and scoring rules.

use crate::color::{Color, COLOR_COUNT};
use crate::state::{PlayerBoard, Wall, WALL_SIZE};

/// Penalty per floor tile; tiles beyond the seventh are free.
pub const FLOOR_PENALTIES: [u32; 7] = [1, 1, 2, 2, 2, 3, 3];
pub const SCORE_PER_ROW: u32 = 2;
pub const SCORE_PER_COLUMN: u32 = 7;
pub const SCORE_PER_COLOR: u32 = 10;

/// Fixed color of wall slot `(row, col)`: every row is the color sequence shifted right by one.
#[inline]
pub fn wall_slot_color(row: usize, col: usize) -> Color {
    debug_assert!(row < WALL_SIZE && col < WALL_SIZE);
    Color::from_slot((col + COLOR_COUNT - row % COLOR_COUNT) % COLOR_COUNT)
}

/// Column where `color` belongs on wall row `row`. Inverse of [`wall_slot_color`].
#[inline]
pub fn wall_column_by_color(row: usize, color: Color) -> usize {
    (color.slot() + row) % COLOR_COUNT
}

/// Points for a tile just placed at `(row, col)`.
///
/// Counts the contiguous horizontal and vertical runs through the tile; a run of length 1
/// contributes nothing, and an isolated tile scores 1.
pub fn tile_score(wall: &Wall, row: usize, col: usize) -> u32 {
    let run = |dr: isize, dc: isize| -> u32 {
        let mut n = 0;
        let (mut r, mut c) = (row as isize + dr, col as isize + dc);
        while (0..WALL_SIZE as isize).contains(&r)
            && (0..WALL_SIZE as isize).contains(&c)
            && wall[r as usize][c as usize].is_tile()
        {
            n += 1;
            r += dr;
            c += dc;
        }
        n
    };

    let row_run = run(0, -1) + run(0, 1) + 1;
    let col_run = run(-1, 0) + run(1, 0) + 1;
    let row_pts = if row_run > 1 { row_run } else { 0 };
    let col_pts = if col_run > 1 { col_run } else { 0 };

    (row_pts + col_pts).max(1)
}

/// Total penalty for `floor_count` tiles on the floor line.
pub fn floor_penalty(floor_count: u8) -> u32 {
    FLOOR_PENALTIES
        .iter()
        .take(floor_count as usize)
        .sum()
}

/// End-of-game bonus: full rows, full columns and completed colors.
pub fn end_game_bonus(board: &PlayerBoard) -> u32 {
    let rows = (0..WALL_SIZE).filter(|&r| board.is_row_full(r)).count() as u32;
    let cols = (0..WALL_SIZE).filter(|&c| board.is_col_full(c)).count() as u32;
    let colors = Color::TILES
        .iter()
        .filter(|&&color| board.wall_color_count(color) == WALL_SIZE)
        .count() as u32;

    rows * SCORE_PER_ROW + cols * SCORE_PER_COLUMN + colors * SCORE_PER_COLOR
}
