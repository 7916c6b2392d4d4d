//! Shared fixtures for the criterion benches.

use az_core::{apply_move, initial_state, is_round_end, Azul, EngineError, GameState};

/// Mid-round states reached by random play from seeded deals.
pub fn sample_states(n: usize, seed: u64) -> Result<Vec<GameState>, EngineError> {
    let mut engine = Azul::new(seed);
    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        let mut s = initial_state(&mut engine)?;
        while !is_round_end(&s) && out.len() < n {
            out.push(s);
            match engine.random_move(&s) {
                Some(mv) => s = apply_move(&s, mv)?.state,
                None => break,
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_are_playable() {
        let states = sample_states(64, 1).unwrap();
        assert_eq!(states.len(), 64);
        assert!(states.iter().all(|s| !az_core::enumerate_moves(s).is_empty()));
    }
}
