//! az-core: Azul rules, scoring, state representation, and configuration.

pub mod action;
pub mod chance;
pub mod color;
pub mod config;
pub mod engine;
pub mod legal;
pub mod render;
pub mod scoring;
pub mod state;

pub use action::{
    index_to_move, move_to_index, Move, ParseMoveError, FLOOR_TARGET, MOVE_SPACE, POOL_SOURCE,
};
pub use chance::{deal_into_bins, sample_tiles};
pub use color::{Color, COLOR_COUNT};
pub use config::{Config, ConfigError, OpponentKind};
pub use engine::{
    apply_move, initial_state, is_game_end, is_round_end, refill_bag, score_game, score_round,
    Azul, EngineError, MoveOutcome, DEFAULT_MAX_ROUND_TIMEOUT,
};
pub use legal::{can_queue, enumerate_moves};
pub use scoring::{
    end_game_bonus, floor_penalty, tile_score, wall_column_by_color, wall_slot_color,
    FLOOR_PENALTIES,
};
pub use state::{
    playout_reward, GameState, PlayerBoard, QueueRow, Wall, BIN_COUNT, BIN_SIZE, DRAW_SIZE,
    PLAYER_COUNT, POOL, TILES_PER_COLOR, WALL_SIZE,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod scoring_tests;
