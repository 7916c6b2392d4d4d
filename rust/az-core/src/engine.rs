//! Game rules engine: state transitions for the standard two-player ruleset.
//!
//! Deterministic transitions are free functions over `GameState`. Anything that draws
//! tiles goes through [`Azul`], which owns the single random stream.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;
use thiserror::Error;

use crate::action::{Move, FLOOR_TARGET};
use crate::chance::{deal_into_bins, sample_counts, sample_tiles};
use crate::color::{Color, COLOR_COUNT};
use crate::legal::enumerate_moves;
use crate::scoring::{end_game_bonus, floor_penalty, tile_score, wall_column_by_color};
use crate::state::{GameState, BIN_COUNT, DRAW_SIZE, PLAYER_COUNT, POOL, TILES_PER_COLOR, WALL_SIZE};

/// Default bound on rounds simulated by [`Azul::playout`].
pub const DEFAULT_MAX_ROUND_TIMEOUT: u32 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("move {mv} is outside the move space")]
    InvalidMove { mv: Move },
    #[error("move {mv} takes zero tiles")]
    EmptyDraw { mv: Move },
    #[error("round has not ended")]
    RoundNotOver,
    #[error("game has not ended")]
    GameNotOver,
    #[error("fixed sample must hold {expected} tiles, got {got}")]
    BadSample { expected: usize, got: usize },
    #[error("fixed sample contains an Empty tile")]
    EmptyTileInSample,
    #[error("bag has no {color:?} tile left to draw")]
    BagUnderflow { color: Color },
    #[error("simulation did not terminate within {rounds} rounds")]
    PlayoutTimeout { rounds: u32 },
}

/// Result of applying a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub state: GameState,
    pub is_round_end: bool,
    pub is_game_end: bool,
    /// True if producing `state` involved drawing tiles from the bag.
    pub is_random: bool,
}

impl MoveOutcome {
    fn deterministic(state: GameState) -> Self {
        Self {
            is_round_end: is_round_end(&state),
            is_game_end: is_game_end(&state),
            is_random: false,
            state,
        }
    }
}

/// True when every factory bin and the pool are empty.
pub fn is_round_end(s: &GameState) -> bool {
    s.bins.iter().flatten().all(|&c| c == 0)
}

/// True when some player has completed a wall row.
pub fn is_game_end(s: &GameState) -> bool {
    s.players
        .iter()
        .any(|p| (0..WALL_SIZE).any(|row| p.is_row_full(row)))
}

/// Apply a move for `next_player`, producing the next state. The round is not scored.
pub fn apply_move(s: &GameState, mv: Move) -> Result<MoveOutcome, EngineError> {
    if !mv.in_range() {
        return Err(EngineError::InvalidMove { mv });
    }
    let src = mv.source_bin as usize;
    let slot = mv.color.slot();
    let taken = s.bins[src][slot];
    if taken == 0 {
        return Err(EngineError::EmptyDraw { mv });
    }

    let mut next = *s;
    let actor = next.next_player as usize;

    // The first player to dip into the pool takes the first-player marker onto their floor.
    if src == POOL && !next.pool_was_touched {
        next.pool_was_touched = true;
        next.first_player = next.next_player;
        next.players[actor].floor_count = next.players[actor].floor_count.saturating_add(1);
    }

    next.next_player = ((actor + 1) % PLAYER_COUNT) as u8;

    next.bins[src][slot] = 0;
    if src < BIN_COUNT {
        let leftovers = next.bins[src];
        for (pool, left) in next.bins[POOL].iter_mut().zip(leftovers) {
            *pool += left;
        }
        next.bins[src] = [0; COLOR_COUNT];
    }

    let board = &mut next.players[actor];
    let dropped = if mv.target_queue == FLOOR_TARGET {
        taken
    } else {
        let row = mv.target_queue as usize;
        let capacity = row as u8 + 1;
        let new_count = board.queue[row].count + taken;
        board.queue[row].color = mv.color;
        board.queue[row].count = new_count.min(capacity);
        new_count.saturating_sub(capacity)
    };
    board.floor_count = board.floor_count.saturating_add(dropped);
    next.discard[slot] += dropped;

    next.turn_index += 1;

    Ok(MoveOutcome::deterministic(next))
}

/// Move completed staging rows to the wall, score them, and charge floor penalties.
pub fn score_round(s: &GameState) -> Result<GameState, EngineError> {
    if !is_round_end(s) {
        return Err(EngineError::RoundNotOver);
    }

    let mut next = *s;
    for board in next.players.iter_mut() {
        for row in 0..WALL_SIZE {
            let q = board.queue[row];
            if q.count as usize != row + 1 {
                continue;
            }
            let col = wall_column_by_color(row, q.color);
            board.wall[row][col] = q.color;
            board.queue[row] = Default::default();
            next.discard[q.color.slot()] += q.count - 1;
            board.score += tile_score(&board.wall, row, col);
        }

        board.score = board.score.saturating_sub(floor_penalty(board.floor_count));
        board.floor_count = 0;
    }
    next.round_index += 1;

    Ok(next)
}

/// Add end-of-game bonuses to every player.
pub fn score_game(s: &GameState) -> Result<GameState, EngineError> {
    if !is_game_end(s) {
        return Err(EngineError::GameNotOver);
    }

    let mut next = *s;
    for board in next.players.iter_mut() {
        board.score += end_game_bonus(board);
    }
    Ok(next)
}

/// Return discarded tiles to the bag.
///
/// Per color, the bag becomes the full set minus every tile still visible in a staging
/// row or on a wall.
pub fn refill_bag(s: &mut GameState) {
    for color in Color::TILES {
        let visible: u8 = s.players.iter().map(|p| p.visible_tiles(color)).sum();
        s.bag[color.slot()] = TILES_PER_COLOR - visible;
    }
    s.discard = [0; COLOR_COUNT];
}

/// Rules engine with its own random stream for tile draws and random playouts.
pub struct Azul {
    rng: ChaCha8Rng,
}

impl Azul {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// The engine's random stream, e.g. to seed derived streams.
    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    /// Deal a new round into the factory bins.
    ///
    /// `fixed_sample`, if given, must hold exactly `DRAW_SIZE` tiles available in the bag.
    pub fn deal_round(
        &mut self,
        s: &GameState,
        fixed_sample: Option<&[Color]>,
    ) -> Result<GameState, EngineError> {
        if !is_round_end(s) {
            return Err(EngineError::RoundNotOver);
        }

        let mut next = *s;
        if next.bag_total() < DRAW_SIZE {
            refill_bag(&mut next);
        }

        let sample = match fixed_sample {
            Some(tiles) => {
                if tiles.len() != DRAW_SIZE {
                    return Err(EngineError::BadSample {
                        expected: DRAW_SIZE,
                        got: tiles.len(),
                    });
                }
                if tiles.iter().any(|c| !c.is_tile()) {
                    return Err(EngineError::EmptyTileInSample);
                }
                tiles.to_vec()
            }
            None => sample_tiles(&next.bag, DRAW_SIZE, &mut self.rng),
        };

        let drawn = sample_counts(&sample);
        for color in Color::TILES {
            let slot = color.slot();
            next.bag[slot] = next.bag[slot]
                .checked_sub(drawn[slot])
                .ok_or(EngineError::BagUnderflow { color })?;
        }

        let dealt = deal_into_bins(&sample);
        next.bins[..BIN_COUNT].copy_from_slice(&dealt);
        next.bins[POOL] = [0; COLOR_COUNT];

        next.pool_was_touched = false;
        next.next_player = next.first_player;

        Ok(next)
    }

    /// Apply a move and resolve the end of the round it may close.
    ///
    /// If the round ended it is scored; then the game is either scored (game over) or a new
    /// round is dealt from the bag, which makes the outcome random.
    pub fn play_move(&mut self, s: &GameState, mv: Move) -> Result<MoveOutcome, EngineError> {
        let outcome = apply_move(s, mv)?;
        if !outcome.is_round_end {
            return Ok(outcome);
        }

        let scored = score_round(&outcome.state)?;
        if is_game_end(&scored) {
            return Ok(MoveOutcome::deterministic(score_game(&scored)?));
        }

        let dealt = self.deal_round(&scored, None)?;
        Ok(MoveOutcome {
            is_random: true,
            ..MoveOutcome::deterministic(dealt)
        })
    }

    /// Pick a uniformly random legal move, if any.
    pub fn random_move(&mut self, s: &GameState) -> Option<Move> {
        let moves = enumerate_moves(s);
        if moves.is_empty() {
            None
        } else {
            Some(moves[self.rng.gen_range(0..moves.len())])
        }
    }

    /// Play uniformly random moves until the game ends, then score it.
    ///
    /// Fails with `PlayoutTimeout` once more than `max_round_timeout` rounds were played.
    pub fn playout(
        &mut self,
        s: &GameState,
        max_round_timeout: u32,
    ) -> Result<GameState, EngineError> {
        let mut state = *s;
        let mut rounds: u32 = 0;

        while !is_game_end(&state) {
            // We may start in the middle of a round.
            if is_round_end(&state) {
                state = self.deal_round(&state, None)?;
            }

            while let Some(mv) = self.random_move(&state) {
                state = apply_move(&state, mv)?.state;
            }

            state = score_round(&state)?;
            rounds += 1;

            if rounds > max_round_timeout {
                return Err(EngineError::PlayoutTimeout {
                    rounds: max_round_timeout,
                });
            }
        }

        score_game(&state)
    }
}

/// Standard initial state with the first round already dealt.
pub fn initial_state(engine: &mut Azul) -> Result<GameState, EngineError> {
    engine.deal_round(&GameState::new(), None)
}
