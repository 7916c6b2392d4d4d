//! Stable state key for logs and transposition-style lookups.

use std::hash::{Hash, Hasher};

use az_core::GameState;
use rustc_hash::FxHasher;

/// A compact 64-bit fingerprint of a `GameState`.
///
/// FxHasher has no per-process random seed, so the key is identical across runs (unlike
/// `std`'s `RandomState`). Equal states always map to the same key.
pub type StateKey = u64;

pub fn state_key(s: &GameState) -> StateKey {
    let mut h = FxHasher::default();
    s.hash(&mut h);
    h.finish()
}

/// Lowercase hex rendering used in event logs.
pub fn state_key_hex(s: &GameState) -> String {
    format!("{:016x}", state_key(s))
}
