//! Single-threaded UCT search with chance nodes and progressive widening.

use crate::arena::Arena;
use crate::node::{Node, NodeId, NodeKind};
use az_core::{
    enumerate_moves, is_game_end, playout_reward, Azul, Config, EngineError, GameState, Move,
    DEFAULT_MAX_ROUND_TIMEOUT, PLAYER_COUNT,
};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;
use thiserror::Error;

/// Offset added to the play count when ranking root children in [`MctsBot::best_move`].
const BEST_MOVE_EPSILON: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MctsConfig {
    /// Maximum number of sampled outcomes per chance node.
    pub sampling_width: u32,
    /// Weight `w` of the UCT exploration term.
    pub exploration_weight: f64,
    /// Round bound for each simulation playout.
    pub max_round_timeout: u32,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            sampling_width: 10,
            exploration_weight: std::f64::consts::FRAC_1_SQRT_2,
            max_round_timeout: DEFAULT_MAX_ROUND_TIMEOUT,
        }
    }
}

impl MctsConfig {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            sampling_width: cfg.mcts.sampling_width,
            exploration_weight: cfg.mcts.exploration_weight,
            max_round_timeout: cfg.playout.max_round_timeout,
        }
    }
}

#[derive(Debug, Error)]
pub enum MctsError {
    #[error("invalid config: {msg}")]
    InvalidConfig { msg: &'static str },
    #[error("search tree root has no children")]
    EmptyTree,
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchStats {
    pub node_count: usize,
    pub steps: u32,
    pub expansions: u32,
    /// Outcomes sampled under chance nodes (at expansion and by widening).
    pub chance_samples: u32,
    /// Simulations that started from an already finished game.
    pub terminal_hits: u32,
}

/// MCTS bot searching on behalf of one player.
///
/// Rewards are always taken from `player`'s point of view, at every depth of the tree.
pub struct MctsBot {
    cfg: MctsConfig,
    engine: Azul,
    rng: ChaCha8Rng,
    player: u8,
    arena: Arena,
    root_id: NodeId,
    stats: SearchStats,
}

impl MctsBot {
    /// The bot takes over `engine` for expansion and playouts. Its own selection stream is
    /// seeded from the engine's stream, so one engine seed fixes the whole search.
    pub fn new(
        mut engine: Azul,
        root_state: GameState,
        player: u8,
        cfg: MctsConfig,
    ) -> Result<Self, MctsError> {
        if cfg.sampling_width == 0 {
            return Err(MctsError::InvalidConfig {
                msg: "sampling_width must be > 0",
            });
        }
        if !(cfg.exploration_weight.is_finite() && cfg.exploration_weight >= 0.0) {
            return Err(MctsError::InvalidConfig {
                msg: "exploration_weight must be finite and >= 0",
            });
        }
        if cfg.max_round_timeout == 0 {
            return Err(MctsError::InvalidConfig {
                msg: "max_round_timeout must be > 0",
            });
        }
        if player as usize >= PLAYER_COUNT {
            return Err(MctsError::InvalidConfig {
                msg: "player out of range",
            });
        }

        let rng = ChaCha8Rng::seed_from_u64(engine.rng_mut().gen());
        let mut arena = Arena::new();
        let root_id = arena.push(Node::decision(root_state, None, None));
        let stats = SearchStats {
            node_count: arena.len(),
            ..SearchStats::default()
        };

        Ok(Self {
            cfg,
            engine,
            rng,
            player,
            arena,
            root_id,
            stats,
        })
    }

    pub fn player(&self) -> u8 {
        self.player
    }

    pub fn config(&self) -> &MctsConfig {
        &self.cfg
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn root_id(&self) -> NodeId {
        self.root_id
    }

    pub fn root_state(&self) -> &GameState {
        self.decision_state(self.root_id)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        self.arena.get(id)
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Root children as `(move, plays, mean reward)`, in expansion order.
    pub fn root_edges(&self) -> Vec<(Move, u32, f64)> {
        self.arena
            .get(self.root_id)
            .children
            .iter()
            .filter_map(|&c| {
                let n = self.arena.get(c);
                n.incoming_move().map(|mv| (mv, n.plays, n.mean()))
            })
            .collect()
    }

    /// One select → expand → simulate → backpropagate iteration.
    pub fn step(&mut self) -> Result<(), MctsError> {
        let frontier = self.select()?;
        let leaf = self.expand(frontier)?;
        let reward = self.simulate(leaf)?;
        self.backpropagate(leaf, reward);

        self.stats.steps += 1;
        self.stats.node_count = self.arena.len();
        Ok(())
    }

    /// Run `n` steps, then return the best move.
    pub fn step_n(&mut self, n: u32) -> Result<Move, MctsError> {
        for _ in 0..n {
            self.step()?;
        }
        self.best_move()
    }

    /// Move of the root child with the highest `score / (plays + ε)`.
    ///
    /// Ties keep the earliest child.
    pub fn best_move(&self) -> Result<Move, MctsError> {
        let root = self.arena.get(self.root_id);
        let mut best: Option<(f64, Move)> = None;
        for &c in &root.children {
            let child = self.arena.get(c);
            let Some(mv) = child.incoming_move() else {
                continue;
            };
            let value = child.score / (child.plays as f64 + BEST_MOVE_EPSILON);
            if best.map_or(true, |(v, _)| value > v) {
                best = Some((value, mv));
            }
        }
        best.map(|(_, mv)| mv).ok_or(MctsError::EmptyTree)
    }

    fn decision_state(&self, id: NodeId) -> &GameState {
        self.arena
            .get(id)
            .state()
            .expect("decision node holds a state")
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[self.rng.gen_range(0..items.len())]
    }

    fn select(&mut self) -> Result<NodeId, MctsError> {
        let mut id = self.root_id;
        loop {
            let node = self.arena.get(id);
            match node.kind {
                NodeKind::Decision { .. } => {
                    if node.children.is_empty() || node.plays == 0 {
                        return Ok(id);
                    }
                    id = self.select_uct(id);
                }
                NodeKind::Chance { pending } => {
                    if node.children.len() < self.cfg.sampling_width as usize {
                        id = self.sample_outcome(id, pending)?;
                    } else {
                        let children = node.children.clone();
                        id = self.pick(&children);
                    }
                }
            }
        }
    }

    /// UCT child of a visited decision node. Unvisited children come first; ties are
    /// broken uniformly at random.
    fn select_uct(&mut self, id: NodeId) -> NodeId {
        let node = self.arena.get(id);
        let unvisited: Vec<NodeId> = node
            .children
            .iter()
            .copied()
            .filter(|&c| self.arena.get(c).plays == 0)
            .collect();
        if !unvisited.is_empty() {
            return self.pick(&unvisited);
        }

        let ln_parent = (node.plays as f64).ln();
        let w = self.cfg.exploration_weight;
        let mut best_value = f64::NEG_INFINITY;
        let mut best: Vec<NodeId> = Vec::new();
        for &c in &node.children {
            let child = self.arena.get(c);
            let plays = child.plays as f64;
            let value = child.score / plays + w * (ln_parent / plays).sqrt();
            if value > best_value {
                best_value = value;
                best.clear();
                best.push(c);
            } else if value == best_value {
                best.push(c);
            }
        }
        self.pick(&best)
    }

    /// Replay the chance node's move on its parent state and add the outcome as a child.
    fn sample_outcome(&mut self, chance_id: NodeId, pending: Move) -> Result<NodeId, MctsError> {
        let parent = self
            .arena
            .get(chance_id)
            .parent
            .expect("chance node has a parent");
        let state = *self.decision_state(parent);
        let outcome = self.engine.play_move(&state, pending)?;

        self.stats.chance_samples += 1;
        Ok(self
            .arena
            .push_child(Node::decision(outcome.state, None, Some(chance_id))))
    }

    /// Add one child per legal move and return a random new leaf. Terminal or already
    /// expanded nodes are returned unchanged.
    fn expand(&mut self, id: NodeId) -> Result<NodeId, MctsError> {
        let node = self.arena.get(id);
        if !node.children.is_empty() {
            return Ok(id);
        }
        let state = match node.kind {
            NodeKind::Decision { state, .. } => state,
            NodeKind::Chance { .. } => return Ok(id),
        };
        if is_game_end(&state) {
            return Ok(id);
        }
        let moves = enumerate_moves(&state);
        if moves.is_empty() {
            return Ok(id);
        }

        for mv in moves {
            let outcome = self.engine.play_move(&state, mv)?;
            if outcome.is_random {
                let chance = self.arena.push_child(Node::chance(mv, id));
                self.arena
                    .push_child(Node::decision(outcome.state, None, Some(chance)));
                self.stats.chance_samples += 1;
            } else {
                self.arena
                    .push_child(Node::decision(outcome.state, Some(mv), Some(id)));
            }
        }
        self.stats.expansions += 1;

        let children = self.arena.get(id).children.clone();
        let child = self.pick(&children);
        if self.arena.get(child).is_chance() {
            let outcomes = self.arena.get(child).children.clone();
            return Ok(self.pick(&outcomes));
        }
        Ok(child)
    }

    fn simulate(&mut self, id: NodeId) -> Result<f64, MctsError> {
        let state = *self.decision_state(id);
        let terminal = if is_game_end(&state) {
            self.stats.terminal_hits += 1;
            state
        } else {
            self.engine.playout(&state, self.cfg.max_round_timeout)?
        };
        Ok(playout_reward(&terminal, self.player))
    }

    fn backpropagate(&mut self, leaf: NodeId, reward: f64) {
        let mut cur = Some(leaf);
        while let Some(id) = cur {
            let n = self.arena.get_mut(id);
            n.plays += 1;
            n.score += reward;
            cur = n.parent;
        }
    }
}
