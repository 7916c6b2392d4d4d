//! Tile draws from the bag.
//!
//! A round's draw is a uniformly random sample without replacement from the bag's multiset,
//! dealt into the factory bins in draw order. A fixed sample can be injected instead for
//! replaying recorded games.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::color::{Color, COLOR_COUNT};
use crate::state::{BIN_COUNT, BIN_SIZE};

/// Expand bag counts into one entry per tile, in color order.
pub fn bag_population(bag: &[u8; COLOR_COUNT]) -> Vec<Color> {
    let mut out = Vec::with_capacity(bag.iter().map(|&c| c as usize).sum());
    for (slot, &count) in bag.iter().enumerate() {
        out.extend(std::iter::repeat(Color::from_slot(slot)).take(count as usize));
    }
    out
}

/// Draw `k` tiles without replacement (fewer if the bag holds less).
///
/// The returned order is itself random, so dealing it sequentially is a fair deal.
pub fn sample_tiles<R: Rng + ?Sized>(bag: &[u8; COLOR_COUNT], k: usize, rng: &mut R) -> Vec<Color> {
    let mut population = bag_population(bag);
    let k = k.min(population.len());
    let (picked, _) = population.partial_shuffle(rng, k);
    picked.to_vec()
}

/// Deal tiles into factory bins, `BIN_SIZE` per bin, in order.
///
/// # Panics
/// Panics if `sample` holds more than `BIN_COUNT * BIN_SIZE` tiles or an `Empty` tile.
pub fn deal_into_bins(sample: &[Color]) -> [[u8; COLOR_COUNT]; BIN_COUNT] {
    assert!(
        sample.len() <= BIN_COUNT * BIN_SIZE,
        "sample too large: {}",
        sample.len()
    );
    let mut bins = [[0u8; COLOR_COUNT]; BIN_COUNT];
    for (i, &color) in sample.iter().enumerate() {
        bins[i / BIN_SIZE][color.slot()] += 1;
    }
    bins
}

/// Per-color counts of a sample.
pub fn sample_counts(sample: &[Color]) -> [u8; COLOR_COUNT] {
    let mut counts = [0u8; COLOR_COUNT];
    for &color in sample {
        counts[color.slot()] += 1;
    }
    counts
}
