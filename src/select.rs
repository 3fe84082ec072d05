use rand::Rng;
use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::seq::SliceRandom;
use tracing::debug;

use crate::pattern::Production;

/// Pick one production.
///
/// With weights enabled each production is drawn through a [`WeightedIndex`],
/// so a zero weight is never drawn. If every weight is zero, or weights are
/// disabled, the draw is uniform. A single production is returned without
/// touching the random source.
pub fn choose<'a, R: Rng + ?Sized>(
    productions: &'a [Production],
    weighted: bool,
    rng: &mut R,
) -> Option<&'a Production> {
    if productions.len() <= 1 {
        return productions.first();
    }

    if weighted {
        match WeightedIndex::new(productions.iter().map(|p| u64::from(p.weight))) {
            Ok(dist) => return productions.get(dist.sample(rng)),
            Err(WeightedError::AllWeightsZero) => {}
            Err(e) => debug!(error = %e, "weighted draw unavailable, using uniform"),
        }
    }

    productions.choose(rng)
}
