//! az-eval: full games between agents + stats aggregation for MCTS vs baseline matches.

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod agents;

use az_core::{
    apply_move, enumerate_moves, is_game_end, is_round_end, move_to_index, score_game,
    score_round, Azul, Config, EngineError, GameState, Move, OpponentKind,
};
use az_logging::{
    now_ms, try_git_hash, GameEndEventV1, MatchEndEventV1, MatchStartEventV1, NdjsonError,
    NdjsonWriter, RootEdgeV1, SearchEventV1, VersionInfoV1,
};
use az_mcts::{state_key_hex, MctsConfig, MctsError};
use thiserror::Error;

pub use agents::{Agent, Choice, GreedyAgent, MctsAgent, RandomAgent, SearchSummary};

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("invalid match config: {0}")]
    InvalidConfig(&'static str),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("search error: {0}")]
    Search(#[from] MctsError),
    #[error("event log error: {0}")]
    Log(#[from] NdjsonError),
    #[error("no legal move at turn {turn}")]
    NoLegalMove { turn: u32 },
    #[error("agent chose illegal move {mv}")]
    IllegalMove { mv: Move },
    #[error("game did not finish within {rounds} rounds")]
    GameTimeout { rounds: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSpec {
    pub game_id: u32,
    pub seed: u64,
    /// Seat of the MCTS agent; alternates between games.
    pub mcts_seat: u8,
}

/// Build a deterministic schedule of games with alternating seats.
pub fn match_schedule(seed0: u64, games: u32) -> Result<Vec<GameSpec>, EvalError> {
    if games == 0 {
        return Err(EvalError::InvalidConfig("match.games must be > 0"));
    }
    Ok((0..games)
        .map(|i| GameSpec {
            game_id: i,
            seed: splitmix64(seed0 ^ (i as u64)),
            mcts_seat: (i % 2) as u8,
        })
        .collect())
}

fn splitmix64(mut x: u64) -> u64 {
    // Stable seed mixer (same as common SplitMix64).
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn hash_seeds(specs: &[GameSpec]) -> String {
    let mut buf = Vec::with_capacity(specs.len() * 8);
    for s in specs {
        buf.extend_from_slice(&s.seed.to_le_bytes());
    }
    blake3::hash(&buf).to_hex().to_string()
}

/// A finished game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub state: GameState,
    pub rounds: u32,
}

impl GameRecord {
    pub fn scores(&self) -> [u32; 2] {
        [self.state.players[0].score, self.state.players[1].score]
    }

    /// Seat of the strict winner, `None` on a draw.
    pub fn winner(&self) -> Option<u8> {
        let [a, b] = self.scores();
        match a.cmp(&b) {
            std::cmp::Ordering::Greater => Some(0),
            std::cmp::Ordering::Less => Some(1),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Play one game from a fresh deal, round by round.
///
/// `on_move` sees every decision before it is applied.
pub fn play_game(
    seed: u64,
    mut agents: [&mut dyn Agent; 2],
    max_rounds: u32,
    mut on_move: impl FnMut(&GameState, &Choice) -> Result<(), EvalError>,
) -> Result<GameRecord, EvalError> {
    let mut engine = Azul::new(seed);
    let mut state = GameState::new();

    for round in 0..max_rounds {
        state = engine.deal_round(&state, None)?;
        while !is_round_end(&state) {
            let choice = agents[state.next_player as usize].choose(&state)?;
            if !enumerate_moves(&state).contains(&choice.mv) {
                return Err(EvalError::IllegalMove { mv: choice.mv });
            }
            on_move(&state, &choice)?;
            state = apply_move(&state, choice.mv)?.state;
        }
        state = score_round(&state)?;
        if is_game_end(&state) {
            return Ok(GameRecord {
                state: score_game(&state)?,
                rounds: round + 1,
            });
        }
    }
    Err(EvalError::GameTimeout { rounds: max_rounds })
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchOptions {
    pub match_id: String,
    pub games: u32,
    pub seed: u64,
    pub budget: u32,
    pub max_rounds_per_game: u32,
    pub opponent: OpponentKind,
    pub mcts: MctsConfig,
    /// blake3 of the config file bytes, if the options came from a file.
    pub config_hash: Option<String>,
}

impl MatchOptions {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            match_id: format!("match-{:016x}", splitmix64(cfg.match_.seed)),
            games: cfg.match_.games,
            seed: cfg.match_.seed,
            budget: cfg.mcts.budget,
            max_rounds_per_game: cfg.match_.max_rounds_per_game,
            opponent: cfg.match_.opponent,
            mcts: MctsConfig::from_config(cfg),
            config_hash: None,
        }
    }

    fn validate(&self) -> Result<(), EvalError> {
        if self.games == 0 {
            return Err(EvalError::InvalidConfig("match.games must be > 0"));
        }
        if self.budget == 0 {
            return Err(EvalError::InvalidConfig("mcts.budget must be > 0"));
        }
        if self.max_rounds_per_game == 0 {
            return Err(EvalError::InvalidConfig(
                "match.max_rounds_per_game must be > 0",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

/// One game from the MCTS agent's point of view.
#[derive(Debug, Clone, PartialEq)]
pub struct GameOutcome {
    pub spec: GameSpec,
    pub record: GameRecord,
    pub outcome: Outcome,
    pub mcts_score: u32,
    pub opp_score: u32,
}

#[derive(Debug, Clone, Default)]
pub struct MatchReport {
    pub games: u32,
    pub mcts_wins: u32,
    pub mcts_losses: u32,
    pub draws: u32,
    pub mcts_score_sum: i64,
    pub opp_score_sum: i64,
    pub score_diff_sum: i64,
    pub score_diff_sumsq: f64,
    /// MCTS decisions made and their summed wall time.
    pub mcts_decisions: u64,
    pub decide_us_sum: u64,
    pub seeds_hash: String,
    pub outcomes: Vec<GameOutcome>,
}

impl MatchReport {
    fn record(&mut self, o: GameOutcome) {
        self.games += 1;
        match o.outcome {
            Outcome::Win => self.mcts_wins += 1,
            Outcome::Loss => self.mcts_losses += 1,
            Outcome::Draw => self.draws += 1,
        }
        let diff = o.mcts_score as i64 - o.opp_score as i64;
        self.mcts_score_sum += o.mcts_score as i64;
        self.opp_score_sum += o.opp_score as i64;
        self.score_diff_sum += diff;
        self.score_diff_sumsq += (diff * diff) as f64;
        self.outcomes.push(o);
    }

    /// Draws count as half a win.
    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        let w = self.mcts_wins as f64;
        let d = self.draws as f64;
        (w + 0.5 * d) / (self.games as f64)
    }

    pub fn mean_score_diff(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        (self.score_diff_sum as f64) / (self.games as f64)
    }

    pub fn mean_mcts_score(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        (self.mcts_score_sum as f64) / (self.games as f64)
    }

    pub fn mean_opp_score(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        (self.opp_score_sum as f64) / (self.games as f64)
    }

    /// Mean wall time of an MCTS decision in milliseconds.
    pub fn mean_decide_ms(&self) -> f64 {
        if self.mcts_decisions == 0 {
            return 0.0;
        }
        (self.decide_us_sum as f64) / (self.mcts_decisions as f64) / 1000.0
    }

    /// 95% confidence interval of the mean score difference (normal approximation).
    pub fn score_diff_ci95(&self) -> (f64, f64) {
        let n = self.games as f64;
        if self.games == 0 {
            return (0.0, 0.0);
        }
        let mean = self.mean_score_diff();
        // Sample variance from moments: var = (Σx² - (Σx)²/n)/(n-1)
        let var = if self.games > 1 {
            let sum = self.score_diff_sum as f64;
            ((self.score_diff_sumsq - sum * sum / n) / (n - 1.0)).max(0.0)
        } else {
            0.0
        };
        let ci = 1.96 * var.sqrt() / n.sqrt();
        (mean - ci, mean + ci)
    }
}

fn opponent_agent(kind: OpponentKind, seed: u64) -> Box<dyn Agent> {
    match kind {
        OpponentKind::Greedy => Box::new(GreedyAgent),
        OpponentKind::Random => Box::new(RandomAgent::new(seed)),
    }
}

fn version() -> VersionInfoV1 {
    VersionInfoV1::default()
}

fn search_event(
    opts: &MatchOptions,
    game_id: u32,
    state: &GameState,
    mv: Move,
    s: &SearchSummary,
) -> SearchEventV1 {
    SearchEventV1 {
        event: "mcts_search".to_string(),
        ts_ms: now_ms(),
        v: version(),
        match_id: opts.match_id.clone(),
        game_id,
        round_index: state.round_index,
        turn_index: state.turn_index,
        player: state.next_player,
        state_key: state_key_hex(state),
        budget: s.budget,
        decide_us: s.decide_us,
        chosen_move: mv.to_string(),
        chosen_index: move_to_index(mv),
        node_count: s.stats.node_count as u64,
        expansions: s.stats.expansions,
        chance_samples: s.stats.chance_samples,
        terminal_hits: s.stats.terminal_hits,
        root: s
            .root_edges
            .iter()
            .map(|&(mv, plays, mean)| RootEdgeV1 {
                mv: mv.to_string(),
                plays,
                mean,
            })
            .collect(),
    }
}

/// Play a full match: MCTS agent vs the configured baseline, seats alternating.
pub fn run_match(
    opts: &MatchOptions,
    log: Option<&mut NdjsonWriter>,
) -> Result<MatchReport, EvalError> {
    run_match_with_progress(opts, log, |_, _| {})
}

/// Same as [`run_match`], calling `on_game(index, outcome)` after every finished game.
pub fn run_match_with_progress(
    opts: &MatchOptions,
    mut log: Option<&mut NdjsonWriter>,
    mut on_game: impl FnMut(u32, &GameOutcome),
) -> Result<MatchReport, EvalError> {
    opts.validate()?;
    let schedule = match_schedule(opts.seed, opts.games)?;

    if let Some(w) = log.as_deref_mut() {
        w.write_event(&MatchStartEventV1 {
            event: "match_start".to_string(),
            ts_ms: now_ms(),
            v: version(),
            match_id: opts.match_id.clone(),
            games: opts.games,
            seed: opts.seed,
            opponent: format!("{:?}", opts.opponent).to_lowercase(),
            budget: opts.budget,
            sampling_width: opts.mcts.sampling_width,
            exploration_weight: opts.mcts.exploration_weight,
            git_hash: try_git_hash(),
            config_hash: opts.config_hash.clone(),
        })?;
    }

    let mut report = MatchReport {
        seeds_hash: hash_seeds(&schedule),
        ..MatchReport::default()
    };

    for spec in schedule {
        let mut mcts = MctsAgent::new(opts.mcts, opts.budget, splitmix64(spec.seed ^ 1))?;
        let mut opp = opponent_agent(opts.opponent, splitmix64(spec.seed ^ 2));
        let agents: [&mut dyn Agent; 2] = if spec.mcts_seat == 0 {
            [&mut mcts, opp.as_mut()]
        } else {
            [opp.as_mut(), &mut mcts]
        };

        let mut decisions = 0u64;
        let mut decide_us = 0u64;
        let record = play_game(spec.seed, agents, opts.max_rounds_per_game, |state, choice| {
            let Some(s) = choice.search.as_ref() else {
                return Ok(());
            };
            decisions += 1;
            decide_us += s.decide_us;
            if let Some(w) = log.as_deref_mut() {
                w.write_event(&search_event(opts, spec.game_id, state, choice.mv, s))?;
            }
            Ok(())
        })?;
        report.mcts_decisions += decisions;
        report.decide_us_sum += decide_us;

        let scores = record.scores();
        let mcts_score = scores[spec.mcts_seat as usize];
        let opp_score = scores[1 - spec.mcts_seat as usize];
        let outcome = match record.winner() {
            Some(w) if w == spec.mcts_seat => Outcome::Win,
            Some(_) => Outcome::Loss,
            None => Outcome::Draw,
        };

        if let Some(w) = log.as_deref_mut() {
            w.write_event(&GameEndEventV1 {
                event: "game_end".to_string(),
                ts_ms: now_ms(),
                v: version(),
                match_id: opts.match_id.clone(),
                game_id: spec.game_id,
                seed: spec.seed,
                mcts_seat: spec.mcts_seat,
                scores,
                winner: record.winner(),
                rounds: record.rounds,
                turns: record.state.turn_index,
            })?;
        }

        let o = GameOutcome {
            spec,
            record,
            outcome,
            mcts_score,
            opp_score,
        };
        on_game(spec.game_id, &o);
        report.record(o);
    }

    if let Some(w) = log.as_deref_mut() {
        w.write_event(&MatchEndEventV1 {
            event: "match_end".to_string(),
            ts_ms: now_ms(),
            v: version(),
            match_id: opts.match_id.clone(),
            games: report.games,
            wins: report.mcts_wins,
            losses: report.mcts_losses,
            draws: report.draws,
            win_rate: report.win_rate(),
            mean_score_diff: report.mean_score_diff(),
            mean_decide_ms: report.mean_decide_ms(),
        })?;
        w.flush()?;
    }

    Ok(report)
}

/// One grid point of a sweep.
#[derive(Debug, Clone)]
pub struct SweepPoint {
    pub budget: u32,
    pub exploration_weight: f64,
    pub report: MatchReport,
}

/// Play the same match schedule for every `budget × exploration_weight` pair.
pub fn run_sweep(
    base: &MatchOptions,
    budgets: &[u32],
    weights: &[f64],
    log: Option<&mut NdjsonWriter>,
) -> Result<Vec<SweepPoint>, EvalError> {
    run_sweep_with_progress(base, budgets, weights, log, |_| {})
}

/// Same as [`run_sweep`], calling `on_point` after every finished grid point.
///
/// Points run budget-major. Every point reuses `base.seed`, so all of them see the same
/// deals and seats.
pub fn run_sweep_with_progress(
    base: &MatchOptions,
    budgets: &[u32],
    weights: &[f64],
    mut log: Option<&mut NdjsonWriter>,
    mut on_point: impl FnMut(&SweepPoint),
) -> Result<Vec<SweepPoint>, EvalError> {
    if budgets.is_empty() || weights.is_empty() {
        return Err(EvalError::InvalidConfig(
            "sweep needs at least one budget and one weight",
        ));
    }
    if budgets.contains(&0) {
        return Err(EvalError::InvalidConfig("mcts.budget must be > 0"));
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(EvalError::InvalidConfig(
            "mcts.exploration_weight must be finite and >= 0",
        ));
    }

    let mut points = Vec::with_capacity(budgets.len() * weights.len());
    for &budget in budgets {
        for &weight in weights {
            let mut opts = base.clone();
            opts.match_id = format!("{}-b{}-w{}", base.match_id, budget, weight);
            opts.budget = budget;
            opts.mcts.exploration_weight = weight;

            let report = run_match(&opts, log.as_deref_mut())?;
            let point = SweepPoint {
                budget,
                exploration_weight: weight,
                report,
            };
            on_point(&point);
            points.push(point);
        }
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use serde_json::Value;

    fn quick_opts(games: u32, opponent: OpponentKind) -> MatchOptions {
        let mut cfg = Config::default();
        cfg.match_.games = games;
        cfg.match_.seed = 42;
        cfg.match_.opponent = opponent;
        cfg.mcts.budget = 8;
        MatchOptions::from_config(&cfg)
    }

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn schedule_is_deterministic_and_alternates_seats() {
        let a = match_schedule(123, 6).unwrap();
        let b = match_schedule(123, 6).unwrap();
        assert_eq!(a, b);
        let seats: Vec<u8> = a.iter().map(|s| s.mcts_seat).collect();
        assert_eq!(seats, vec![0, 1, 0, 1, 0, 1]);
        assert_ne!(a[0].seed, a[1].seed);
        assert_ne!(match_schedule(124, 6).unwrap(), a);
    }

    #[test]
    fn zero_games_is_rejected() {
        let e = match_schedule(0, 0).unwrap_err();
        assert!(format!("{e}").contains("match.games"));
    }

    #[test]
    fn seeds_hash_changes_if_schedule_changes() {
        let h1 = hash_seeds(&match_schedule(1, 4).unwrap());
        let h2 = hash_seeds(&match_schedule(1, 4).unwrap());
        let h3 = hash_seeds(&match_schedule(2, 4).unwrap());
        assert_eq!(h1, h2);
        assert_ne!(h1, h3);
    }

    #[test]
    fn baseline_game_finishes() {
        let mut greedy = GreedyAgent;
        let mut random = RandomAgent::new(3);
        let mut decisions = 0u32;
        let record = play_game(77, [&mut greedy, &mut random], 100, |_, choice| {
            assert!(choice.search.is_none());
            decisions += 1;
            Ok(())
        })
        .unwrap();

        assert!(is_game_end(&record.state));
        assert!(record.rounds >= 5);
        assert_eq!(decisions, record.state.turn_index);
    }

    #[test]
    fn game_timeout_is_reported() {
        let mut a = GreedyAgent;
        let mut b = GreedyAgent;
        let err = play_game(1, [&mut a, &mut b], 1, |_, _| Ok(())).unwrap_err();
        assert!(matches!(err, EvalError::GameTimeout { rounds: 1 }));
    }

    #[test]
    fn match_plays_every_game() {
        let opts = quick_opts(2, OpponentKind::Random);
        let mut seen = Vec::new();
        let report = run_match_with_progress(&opts, None, |i, _| seen.push(i)).unwrap();

        assert_eq!(seen, vec![0, 1]);
        assert_eq!(report.games, 2);
        assert_eq!(report.mcts_wins + report.mcts_losses + report.draws, 2);
        for o in &report.outcomes {
            assert!(is_game_end(&o.record.state));
            assert_eq!(o.record.scores()[o.spec.mcts_seat as usize], o.mcts_score);
        }
        let (lo, hi) = report.score_diff_ci95();
        assert!(lo <= report.mean_score_diff() && report.mean_score_diff() <= hi);

        // The MCTS seat moves at least once per round.
        let rounds: u32 = report.outcomes.iter().map(|o| o.record.rounds).sum();
        assert!(report.mcts_decisions >= rounds as u64);
        assert!(report.mean_decide_ms() >= 0.0);
    }

    #[test]
    fn decide_time_is_averaged_per_decision() {
        let r = MatchReport {
            mcts_decisions: 4,
            decide_us_sum: 10_000,
            ..MatchReport::default()
        };
        assert!((r.mean_decide_ms() - 2.5).abs() < 1e-12);
        assert_eq!(MatchReport::default().mean_decide_ms(), 0.0);
    }

    #[test]
    fn sweep_covers_the_grid_on_one_schedule() {
        let base = quick_opts(1, OpponentKind::Greedy);
        let mut order = Vec::new();
        let points = run_sweep_with_progress(&base, &[2, 6], &[0.5, 10.0], None, |p| {
            order.push((p.budget, p.exploration_weight))
        })
        .unwrap();

        assert_eq!(order, vec![(2, 0.5), (2, 10.0), (6, 0.5), (6, 10.0)]);
        assert_eq!(points.len(), 4);
        for p in &points {
            assert_eq!(p.report.games, 1);
            assert!(p.report.mcts_decisions > 0);
            assert_eq!(p.report.seeds_hash, points[0].report.seeds_hash);
        }
    }

    #[test]
    fn sweep_logs_one_match_per_point() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweep.ndjson");
        let base = quick_opts(1, OpponentKind::Random);
        {
            let mut w = NdjsonWriter::open_append(&path).unwrap();
            run_sweep(&base, &[3], &[0.7, 2.0], Some(&mut w)).unwrap();
        }

        let starts: Vec<Value> = fs::read_to_string(&path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str::<Value>(l).unwrap())
            .filter(|e| e["event"] == "match_start")
            .collect();
        assert_eq!(starts.len(), 2);
        assert_eq!(starts[0]["exploration_weight"], 0.7);
        assert_eq!(starts[1]["exploration_weight"], 2.0);
        assert_ne!(starts[0]["match_id"], starts[1]["match_id"]);
    }

    #[test]
    fn sweep_rejects_bad_grids() {
        let base = quick_opts(1, OpponentKind::Greedy);
        assert!(run_sweep(&base, &[], &[1.0], None).is_err());
        assert!(run_sweep(&base, &[4], &[], None).is_err());
        assert!(run_sweep(&base, &[0], &[1.0], None).is_err());
        assert!(run_sweep(&base, &[4], &[f64::NAN], None).is_err());
    }

    #[test]
    fn match_writes_event_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match.ndjson");
        let opts = quick_opts(2, OpponentKind::Greedy);
        {
            let mut w = NdjsonWriter::open_append(&path).unwrap();
            run_match(&opts, Some(&mut w)).unwrap();
        }

        let events: Vec<Value> = fs::read_to_string(&path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        let kinds: Vec<&str> = events.iter().map(|e| e["event"].as_str().unwrap()).collect();

        assert_eq!(kinds.first(), Some(&"match_start"));
        assert_eq!(kinds.last(), Some(&"match_end"));
        assert_eq!(kinds.iter().filter(|&&k| k == "game_end").count(), 2);
        assert!(kinds.contains(&"mcts_search"));

        let search = events.iter().find(|e| e["event"] == "mcts_search").unwrap();
        assert_eq!(search["budget"], 8);
        assert!(search["decide_us"].is_u64());
        assert!(events.last().unwrap()["mean_decide_ms"].is_f64());
        assert_eq!(search["state_key"].as_str().unwrap().len(), 16);
        assert_eq!(events.last().unwrap()["games"], 2);
    }

    #[test]
    fn report_rates() {
        let r = MatchReport {
            games: 4,
            mcts_wins: 2,
            mcts_losses: 1,
            draws: 1,
            score_diff_sum: 8,
            ..MatchReport::default()
        };
        assert!((r.win_rate() - 0.625).abs() < 1e-12);
        assert!((r.mean_score_diff() - 2.0).abs() < 1e-12);
        assert_eq!(MatchReport::default().win_rate(), 0.0);
    }
}
