//! Canonical game state definitions and reward helpers.

use crate::color::{Color, COLOR_COUNT};

/// Tiles of each color in a full set.
pub const TILES_PER_COLOR: u8 = 20;
pub const PLAYER_COUNT: usize = 2;
/// Factory bins, not counting the pool.
pub const BIN_COUNT: usize = 5;
/// Tiles dealt into each factory bin.
pub const BIN_SIZE: usize = 4;
/// Tiles drawn from the bag per round.
pub const DRAW_SIZE: usize = BIN_COUNT * BIN_SIZE;
pub const WALL_SIZE: usize = 5;
/// Index of the pool in `GameState::bins`.
pub const POOL: usize = BIN_COUNT;

/// One staging row: a color and how many tiles of it are queued.
///
/// Row `i` holds at most `i + 1` tiles. `color == Empty` iff `count == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct QueueRow {
    pub color: Color,
    pub count: u8,
}

impl QueueRow {
    pub const EMPTY: QueueRow = QueueRow {
        color: Color::Empty,
        count: 0,
    };

    pub fn new(color: Color, count: u8) -> Self {
        Self { color, count }
    }
}

pub type Wall = [[Color; WALL_SIZE]; WALL_SIZE];

/// A player's private area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PlayerBoard {
    /// Placed tiles. A set cell always equals the slot color for that position.
    pub wall: Wall,
    pub queue: [QueueRow; WALL_SIZE],
    /// Tiles on the floor line, including the first-player marker.
    pub floor_count: u8,
    pub score: u32,
}

impl PlayerBoard {
    pub fn is_row_full(&self, row: usize) -> bool {
        self.wall[row].iter().all(|c| c.is_tile())
    }

    pub fn is_col_full(&self, col: usize) -> bool {
        (0..WALL_SIZE).all(|row| self.wall[row][col].is_tile())
    }

    pub fn row_has_color(&self, row: usize, color: Color) -> bool {
        self.wall[row].iter().any(|&c| c == color)
    }

    /// Number of wall cells holding `color`.
    pub fn wall_color_count(&self, color: Color) -> usize {
        self.wall.iter().flatten().filter(|&&c| c == color).count()
    }

    /// Tiles of `color` on the wall or in the staging rows.
    pub fn visible_tiles(&self, color: Color) -> u8 {
        let queued: u8 = self
            .queue
            .iter()
            .filter(|q| q.color == color)
            .map(|q| q.count)
            .sum();
        queued + self.wall_color_count(color) as u8
    }
}

/// Full shared snapshot of a two-player game.
///
/// Plain `Copy` value: every rules operation returns a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameState {
    /// Undrawn tiles per color.
    pub bag: [u8; COLOR_COUNT],
    /// Factory bins followed by the pool (index `POOL`).
    pub bins: [[u8; COLOR_COUNT]; BIN_COUNT + 1],
    /// Tiles that left play (floor line, completed-row surplus). Returned to the bag on refill.
    pub discard: [u8; COLOR_COUNT],
    pub players: [PlayerBoard; PLAYER_COUNT],
    pub next_player: u8,
    /// Who starts the next round.
    pub first_player: u8,
    /// Whether the pool has been drawn from this round.
    pub pool_was_touched: bool,
    pub round_index: u32,
    pub turn_index: u32,
}

impl GameState {
    /// Standard initial state: full bag, nothing dealt, player 0 starts.
    pub fn new() -> Self {
        Self {
            bag: [TILES_PER_COLOR; COLOR_COUNT],
            bins: [[0; COLOR_COUNT]; BIN_COUNT + 1],
            discard: [0; COLOR_COUNT],
            players: [PlayerBoard::default(); PLAYER_COUNT],
            next_player: 0,
            first_player: 0,
            pool_was_touched: false,
            round_index: 0,
            turn_index: 0,
        }
    }

    pub fn bin_count(&self, bin: usize, color: Color) -> u8 {
        self.bins[bin][color.slot()]
    }

    pub fn set_bin(&mut self, bin: usize, color: Color, count: u8) {
        self.bins[bin][color.slot()] = count;
    }

    pub fn bag_total(&self) -> usize {
        self.bag.iter().map(|&c| c as usize).sum()
    }

    pub fn current_player(&self) -> &PlayerBoard {
        &self.players[self.next_player as usize]
    }

    /// Total tiles of `color` across bag, bins, discard, staging rows and walls.
    ///
    /// Always `TILES_PER_COLOR` for states produced by the rules engine.
    pub fn tile_total(&self, color: Color) -> u32 {
        let s = color.slot();
        let in_bins: u32 = self.bins.iter().map(|b| b[s] as u32).sum();
        let on_boards: u32 = self
            .players
            .iter()
            .map(|p| p.visible_tiles(color) as u32)
            .sum();
        self.bag[s] as u32 + in_bins + self.discard[s] as u32 + on_boards
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

/// Reward of a finished game from the POV of `player`.
///
/// 1.0 if `player` strictly outscores every opponent, else 0.0. Draws count as losses.
/// Unfinished games (no full wall row yet) and seats outside the table score 0.0.
pub fn playout_reward(s: &GameState, player: u8) -> f64 {
    if player as usize >= PLAYER_COUNT || !crate::engine::is_game_end(s) {
        return 0.0;
    }
    let mine = s.players[player as usize].score;
    let beats_all = s
        .players
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != player as usize)
        .all(|(_, p)| mine > p.score);
    if beats_all {
        1.0
    } else {
        0.0
    }
}
