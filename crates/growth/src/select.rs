//! Weighted candidate selection.
//!
//! Each candidate gets a weight
//!
//! ```text
//! w = max(potential, MIN_POTENTIAL)^POTENTIAL_EXPONENT * charge(proposer) / step_length
//! ```
//!
//! and a race key `ln(u) / w` where `u` in (0, 1] is drawn from the run's
//! counter PRNG at `(draw, cell)`. The best `ceil(branching_factor * n)`
//! candidates by `(weight, key)` are eligible and the eligible candidate with
//! the largest key wins (weighted reservoir sampling). Every quantity is a
//! function of the candidate itself, so the outcome does not depend on
//! frontier storage order. Exact ties fall back to cell position.

use std::cmp::Ordering;

use lichtenberg_core::{CounterRng, GridPos, PotentialField};

use crate::frontier::Frontier;
use crate::tree::GrowthTree;

/// Sharpness of the preference for high potential.
pub const POTENTIAL_EXPONENT: f64 = 2.0;
/// Potential floor so zero-potential edge cells stay reachable.
pub const MIN_POTENTIAL: f64 = 1e-3;

#[derive(Debug, Clone, Copy)]
struct Ranked {
    slot: usize,
    pos: GridPos,
    weight: f64,
    key: f64,
}

/// Growth weight of a candidate.
pub fn weight(potential: f64, charge: f64, step_length: f64) -> f64 {
    potential.max(MIN_POTENTIAL).powf(POTENTIAL_EXPONENT) * charge / step_length
}

/// Number of candidates eligible out of `n` (at least one when `n > 0`).
pub fn eligible_count(n: usize, branching_factor: f64) -> usize {
    if n == 0 {
        return 0;
    }
    ((n as f64 * branching_factor).ceil() as usize).clamp(1, n)
}

/// Picks the frontier slot to commit for draw number `draw`.
///
/// Returns `None` only when the frontier is empty.
pub(crate) fn select(
    frontier: &Frontier,
    tree: &GrowthTree,
    field: &PotentialField,
    rng: &CounterRng,
    draw: u64,
    branching_factor: f64,
) -> Option<usize> {
    let mut ranked: Vec<Ranked> = frontier
        .iter()
        .enumerate()
        .filter_map(|(slot, c)| {
            let proposer = tree.node(c.proposer)?;
            let w = weight(
                field.potential(c.pos),
                proposer.charge,
                proposer.pos.distance(c.pos),
            );
            let u = rng.open_f64_at(draw, c.pos.key());
            Some(Ranked {
                slot,
                pos: c.pos,
                weight: w,
                key: u.ln() / w,
            })
        })
        .collect();

    let eligible = eligible_count(ranked.len(), branching_factor);
    if eligible == 0 {
        return None;
    }
    if eligible < ranked.len() {
        ranked.select_nth_unstable_by(eligible - 1, by_rank);
        ranked.truncate(eligible);
    }
    ranked.into_iter().max_by(by_key).map(|r| r.slot)
}

/// Best first: higher weight, then higher key, then lower position.
fn by_rank(a: &Ranked, b: &Ranked) -> Ordering {
    b.weight
        .total_cmp(&a.weight)
        .then_with(|| b.key.total_cmp(&a.key))
        .then_with(|| a.pos.cmp(&b.pos))
}

/// Greater is better: higher key, then lower position.
fn by_key(a: &Ranked, b: &Ranked) -> Ordering {
    a.key.total_cmp(&b.key).then_with(|| b.pos.cmp(&a.pos))
}
