//! Plain-text rendering of a game state.
//!
//! Layout per player: staging rows right-aligned, the floor line under the penalty scale,
//! then the wall with empty slots shown as the lowercase slot color.

use std::fmt;

use crate::color::Color;
use crate::scoring::{wall_slot_color, FLOOR_PENALTIES};
use crate::state::{GameState, BIN_COUNT, BIN_SIZE, POOL, WALL_SIZE};

fn bin_tiles(counts: &[u8]) -> String {
    let mut out = String::new();
    for (slot, &count) in counts.iter().enumerate() {
        for _ in 0..count {
            out.push(Color::from_slot(slot).to_char());
        }
    }
    out
}

impl GameState {
    fn fmt_table(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "### Table ###")?;
        writeln!(f, "# Bins")?;
        for bin in 0..BIN_COUNT {
            let line = bin_tiles(&self.bins[bin]);
            writeln!(f, "  [{bin}]{:_>width$}", line, width = BIN_SIZE)?;
        }
        let marker = if self.pool_was_touched { ' ' } else { '1' };
        writeln!(f, "# Pool [{marker}]")?;
        writeln!(f, "  [{POOL}]{}", bin_tiles(&self.bins[POOL]))
    }

    fn fmt_player(&self, f: &mut fmt::Formatter<'_>, index: usize) -> fmt::Result {
        let board = &self.players[index];
        let next = if self.next_player as usize == index {
            " (NEXT)"
        } else {
            ""
        };
        writeln!(f, "### Player {index}{next} ### score {}", board.score)?;

        writeln!(f, "# Queue")?;
        for (row, q) in board.queue.iter().enumerate() {
            let tiles: String = std::iter::repeat(q.color.to_char())
                .take(q.count as usize)
                .collect();
            let slots = format!("{:_>width$}", tiles, width = row + 1);
            writeln!(f, "  [{row}]{:>width$}", slots, width = WALL_SIZE)?;
        }

        writeln!(f, "# Floor")?;
        let scale: String = FLOOR_PENALTIES.iter().map(|p| p.to_string()).collect();
        writeln!(f, "# {scale}")?;
        let floor: String = "X".repeat(board.floor_count as usize);
        writeln!(f, "  {:_<width$}", floor, width = FLOOR_PENALTIES.len())?;

        writeln!(f, "# Wall")?;
        for (row, cells) in board.wall.iter().enumerate() {
            let line: String = cells
                .iter()
                .enumerate()
                .map(|(col, &c)| {
                    if c.is_tile() {
                        c.to_char()
                    } else {
                        wall_slot_color(row, col).to_char().to_ascii_lowercase()
                    }
                })
                .collect();
            writeln!(f, "  {line}")?;
        }
        Ok(())
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} Round {} Turn {} {}",
            "=".repeat(20),
            self.round_index + 1,
            self.turn_index + 1,
            "=".repeat(20)
        )?;
        self.fmt_table(f)?;
        for index in 0..self.players.len() {
            self.fmt_player(f, index)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Color, GameState, POOL};

    #[test]
    fn renders_bins_queue_and_lowercase_wall_slots() {
        let mut s = GameState::new();
        s.set_bin(0, Color::Red, 2);
        s.set_bin(0, Color::Blue, 1);
        s.set_bin(POOL, Color::White, 3);
        s.players[0].queue[2] = crate::QueueRow::new(Color::Black, 2);
        s.players[0].wall[0][0] = Color::Blue;
        s.players[1].floor_count = 2;

        let text = s.to_string();
        assert!(text.contains("  [0]_URR"), "{text}");
        assert!(text.contains("# Pool [1]"), "{text}");
        assert!(text.contains("  [5]WWW"), "{text}");
        assert!(text.contains("  [2]  _KK"), "{text}");
        // Player 0 wall row 0: Blue placed, the rest lowercase slot colors.
        assert!(text.contains("  Uyrkw"), "{text}");
        assert!(text.contains("  XX_____"), "{text}");
        assert!(text.contains("### Player 0 (NEXT) ###"), "{text}");
    }
}
