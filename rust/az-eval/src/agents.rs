//! Move-choosing agents: uniform random, greedy fill, and the MCTS bot.

use std::time::Instant;

use az_core::{enumerate_moves, Azul, GameState, Move, FLOOR_TARGET};
use az_mcts::{state_key, MctsBot, MctsConfig, SearchStats, StateKey};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;

use crate::EvalError;

/// What the MCTS agent saw when it picked its move.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSummary {
    pub state_key: StateKey,
    pub budget: u32,
    /// Wall time of the whole decision, search setup included.
    pub decide_us: u64,
    pub stats: SearchStats,
    /// `(move, plays, mean reward)` per root child.
    pub root_edges: Vec<(Move, u32, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub mv: Move,
    pub search: Option<SearchSummary>,
}

impl Choice {
    fn plain(mv: Move) -> Self {
        Self { mv, search: None }
    }
}

pub trait Agent {
    fn name(&self) -> &'static str;

    /// Pick a move for `state.next_player`.
    fn choose(&mut self, state: &GameState) -> Result<Choice, EvalError>;
}

pub struct RandomAgent {
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &'static str {
        "random"
    }

    fn choose(&mut self, state: &GameState) -> Result<Choice, EvalError> {
        let moves = enumerate_moves(state);
        let mv = moves
            .choose(&mut self.rng)
            .copied()
            .ok_or(EvalError::NoLegalMove {
                turn: state.turn_index,
            })?;
        Ok(Choice::plain(mv))
    }
}

/// Fills staging rows as tightly as possible.
///
/// Ranks moves by, in order: fewest tiles dropped on the floor, most tiles queued, least
/// space left over in the target row. Ties keep the first move in enumeration order.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyAgent;

impl GreedyAgent {
    fn rank(state: &GameState, mv: Move) -> (u32, i32, u32) {
        let available = state.bins[mv.source_bin as usize][mv.color.slot()] as u32;
        if mv.target_queue == FLOOR_TARGET {
            return (available, 0, 0);
        }
        let row = mv.target_queue as usize;
        let queued = state.current_player().queue[row].count as u32;
        let space = row as u32 + 1 - queued;

        let moved = available.min(space);
        let dropped = available.saturating_sub(space);
        let extra = space.saturating_sub(available);
        (dropped, -(moved as i32), extra)
    }
}

impl Agent for GreedyAgent {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn choose(&mut self, state: &GameState) -> Result<Choice, EvalError> {
        let moves = enumerate_moves(state);
        let mut best: Option<((u32, i32, u32), Move)> = None;
        for mv in moves {
            let r = Self::rank(state, mv);
            if best.map_or(true, |(br, _)| r < br) {
                best = Some((r, mv));
            }
        }
        best.map(|(_, mv)| Choice::plain(mv))
            .ok_or(EvalError::NoLegalMove {
                turn: state.turn_index,
            })
    }
}

/// Runs a fresh search of `budget` steps for every decision.
pub struct MctsAgent {
    cfg: MctsConfig,
    budget: u32,
    rng: ChaCha8Rng,
}

impl MctsAgent {
    pub fn new(cfg: MctsConfig, budget: u32, seed: u64) -> Result<Self, EvalError> {
        if budget == 0 {
            return Err(EvalError::InvalidConfig("mcts.budget must be > 0"));
        }
        Ok(Self {
            cfg,
            budget,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }
}

impl Agent for MctsAgent {
    fn name(&self) -> &'static str {
        "mcts"
    }

    fn choose(&mut self, state: &GameState) -> Result<Choice, EvalError> {
        let t0 = Instant::now();
        let engine = Azul::new(self.rng.gen());
        let mut bot = MctsBot::new(engine, *state, state.next_player, self.cfg)?;
        let mv = bot.step_n(self.budget)?;
        let decide_us = t0.elapsed().as_micros() as u64;
        Ok(Choice {
            mv,
            search: Some(SearchSummary {
                state_key: state_key(state),
                budget: self.budget,
                decide_us,
                stats: bot.stats().clone(),
                root_edges: bot.root_edges(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use az_core::{initial_state, Color};

    #[test]
    fn greedy_fills_a_row_exactly() {
        let mut s = GameState::new();
        s.set_bin(0, Color::Red, 3);
        s.set_bin(1, Color::Blue, 1);

        let choice = GreedyAgent.choose(&s).unwrap();
        assert_eq!(choice.mv, Move::new(0, Color::Red, 2));
        assert!(choice.search.is_none());
    }

    #[test]
    fn greedy_prefers_floor_only_when_forced() {
        let mut s = GameState::new();
        s.set_bin(0, Color::Red, 2);
        for row in 0..5 {
            s.players[0].queue[row] = az_core::QueueRow::new(Color::Blue, 1);
        }
        // Every row holds Blue, so Red can only go to the floor.
        let choice = GreedyAgent.choose(&s).unwrap();
        assert_eq!(choice.mv, Move::new(0, Color::Red, FLOOR_TARGET));
    }

    #[test]
    fn agents_pick_legal_moves() {
        let mut engine = Azul::new(4);
        let s = initial_state(&mut engine).unwrap();
        let legal = enumerate_moves(&s);

        let mut random = RandomAgent::new(1);
        for _ in 0..20 {
            assert!(legal.contains(&random.choose(&s).unwrap().mv));
        }
        assert!(legal.contains(&GreedyAgent.choose(&s).unwrap().mv));

        let mut mcts = MctsAgent::new(MctsConfig::default(), 20, 9).unwrap();
        let choice = mcts.choose(&s).unwrap();
        assert!(legal.contains(&choice.mv));
        let search = choice.search.unwrap();
        assert_eq!(search.stats.steps, 20);
        assert_eq!(search.state_key, state_key(&s));
    }

    #[test]
    fn agents_fail_without_moves() {
        let s = GameState::new();
        assert!(matches!(
            RandomAgent::new(0).choose(&s),
            Err(EvalError::NoLegalMove { .. })
        ));
        assert!(GreedyAgent.choose(&s).is_err());
    }

    #[test]
    fn zero_budget_is_rejected() {
        assert!(MctsAgent::new(MctsConfig::default(), 0, 0).is_err());
    }
}
