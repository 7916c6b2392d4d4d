//! az-logging: NDJSON event records for searches, games and matches.
//!
//! Append-only logs for post-mortems: one JSON object per line, every record carrying an
//! `event` tag, a timestamp and the schema version block.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const RULESET_ID: &str = "azul_2p_v1";
pub const MOVE_SPACE_ID: &str = "azul_moves_180_v1";

pub fn now_ms() -> u64 {
    let d = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    d.as_millis() as u64
}

pub fn hash_config_bytes(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

pub fn try_git_hash() -> Option<String> {
    use std::process::Command;

    let out = Command::new("git").args(["rev-parse", "HEAD"]).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let s = String::from_utf8(out.stdout).ok()?;
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

/// Schema versioning fields shared by every record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionInfoV1 {
    pub ruleset_id: String,
    pub move_space_id: String,
}

impl Default for VersionInfoV1 {
    fn default() -> Self {
        Self {
            ruleset_id: RULESET_ID.to_string(),
            move_space_id: MOVE_SPACE_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchStartEventV1 {
    pub event: String,
    pub ts_ms: u64,
    pub v: VersionInfoV1,

    pub match_id: String,
    pub games: u32,
    pub seed: u64,
    pub opponent: String,
    pub budget: u32,
    pub sampling_width: u32,
    pub exploration_weight: f64,

    // Hashes for reproducibility.
    pub git_hash: Option<String>,
    pub config_hash: Option<String>,
}

/// Visit summary of one root edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootEdgeV1 {
    /// Move notation, e.g. `3K1`.
    pub mv: String,
    pub plays: u32,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchEventV1 {
    pub event: String,
    pub ts_ms: u64,
    pub v: VersionInfoV1,

    pub match_id: String,
    pub game_id: u32,
    pub round_index: u32,
    pub turn_index: u32,
    pub player: u8,
    /// Hex fingerprint of the searched state.
    pub state_key: String,

    pub budget: u32,
    /// Wall time of the decision in microseconds.
    pub decide_us: u64,
    pub chosen_move: String,
    pub chosen_index: u16,

    pub node_count: u64,
    pub expansions: u32,
    pub chance_samples: u32,
    pub terminal_hits: u32,

    pub root: Vec<RootEdgeV1>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEndEventV1 {
    pub event: String,
    pub ts_ms: u64,
    pub v: VersionInfoV1,

    pub match_id: String,
    pub game_id: u32,
    pub seed: u64,
    /// Seat played by the MCTS agent.
    pub mcts_seat: u8,
    pub scores: [u32; 2],
    /// Seat of the strict winner, `None` on a draw.
    pub winner: Option<u8>,
    pub rounds: u32,
    pub turns: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEndEventV1 {
    pub event: String,
    pub ts_ms: u64,
    pub v: VersionInfoV1,

    pub match_id: String,
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub win_rate: f64,
    pub mean_score_diff: f64,
    /// Mean MCTS decision time over the match.
    pub mean_decide_ms: f64,
}

#[derive(Debug, Error)]
pub enum NdjsonError {
    #[error("event log I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("event serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Append-only NDJSON writer.
///
/// Contract: each call writes exactly one JSON object followed by a newline.
pub struct NdjsonWriter {
    w: BufWriter<File>,
    lines_since_flush: u64,
    flush_every_lines: u64,
}

impl NdjsonWriter {
    /// Open a file for append. Creates it if it doesn't exist.
    pub fn open_append(path: impl AsRef<Path>) -> Result<Self, NdjsonError> {
        Self::open_append_with_flush(path, 0)
    }

    /// `flush_every_lines=0` disables periodic flushing.
    pub fn open_append_with_flush(
        path: impl AsRef<Path>,
        flush_every_lines: u64,
    ) -> Result<Self, NdjsonError> {
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            w: BufWriter::new(f),
            lines_since_flush: 0,
            flush_every_lines,
        })
    }

    pub fn write_event<T: Serialize>(&mut self, event: &T) -> Result<(), NdjsonError> {
        let mut buf = serde_json::to_vec(event)?;
        buf.push(b'\n');
        self.w.write_all(&buf)?;
        self.lines_since_flush += 1;
        if self.flush_every_lines > 0 && self.lines_since_flush >= self.flush_every_lines {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), NdjsonError> {
        self.w.flush()?;
        self.lines_since_flush = 0;
        Ok(())
    }
}
