//! MCTS for Azul.
//!
//! The design uses:
//! - Resolved transitions via `az_core::Azul::play_move` (a move that closes a round and
//!   deals the next one is a chance transition)
//! - Chance nodes with progressive widening capped at `sampling_width`
//! - UCT selection with uniform random tie-breaks
//! - Arena-backed node storage

pub mod arena;
pub mod mcts;
pub mod node;
pub mod state_key;

pub use arena::Arena;
pub use mcts::{MctsBot, MctsConfig, MctsError, SearchStats};
pub use node::{Node, NodeId, NodeKind};
pub use state_key::{state_key, state_key_hex, StateKey};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_nonempty() {
        assert!(!VERSION.is_empty());
    }
}
