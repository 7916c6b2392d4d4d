//! Legal move enumeration.

use crate::action::{Move, FLOOR_TARGET};
use crate::color::Color;
use crate::state::{GameState, PlayerBoard, WALL_SIZE};

/// Whether `color` may be queued on staging row `row` of `board`.
///
/// - the color is not already on that wall row
/// - the row has space left (capacity `row + 1`)
/// - the row is empty or already holds the same color
#[inline]
pub fn can_queue(board: &PlayerBoard, row: usize, color: Color) -> bool {
    let q = board.queue[row];
    !board.row_has_color(row, color)
        && (q.count as usize) < row + 1
        && (q.color == Color::Empty || q.color == color)
}

/// Enumerate all legal moves for `next_player`.
///
/// Order is bin-major, then color, then target (rows, then floor).
pub fn enumerate_moves(s: &GameState) -> Vec<Move> {
    let board = s.current_player();
    let mut moves = Vec::new();

    for (bin, counts) in s.bins.iter().enumerate() {
        for color in Color::TILES {
            if counts[color.slot()] == 0 {
                continue;
            }
            for row in 0..WALL_SIZE {
                if can_queue(board, row, color) {
                    moves.push(Move::new(bin as u8, color, row as u8));
                }
            }
            // Dumping onto the floor is always allowed.
            moves.push(Move::new(bin as u8, color, FLOOR_TARGET));
        }
    }

    moves
}
