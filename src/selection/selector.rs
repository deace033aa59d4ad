//! Human-likeness move selection ("legit mode")
//!
//! With legit mode off the best engine line is always chosen. With it on, one
//! roll per call decides between three outcomes:
//!
//! ```text
//! roll < blunder                      -> a line 0.5..=1.5 pawns worse than best
//! roll < blunder + suboptimal         -> a line 0.1..=0.4 pawns worse than best
//! otherwise                           -> best line
//! ```
//!
//! A branch whose band holds no line falls back to the best line; a blunder
//! roll never falls through into the suboptimal band. Deficits are compared in
//! whole centipawns so lines sitting on a band edge qualify.

use std::ops::RangeInclusive;

use rand::Rng;
use uci_engine::{RankedMove, Side};

use crate::core::config::LegitModeConfig;

/// Deficit range, in centipawns, for a deliberate blunder
pub const BLUNDER_BAND: RangeInclusive<i32> = 50..=150;

/// Deficit range, in centipawns, for a slightly inaccurate move
pub const SUBOPTIMAL_BAND: RangeInclusive<i32> = 10..=40;

/// Source of randomness for selection
pub trait SelectionDraws {
    /// Uniform value in `[0, 1)`
    fn roll(&mut self) -> f64;

    /// Uniform index in `0..len`; `len` is never zero
    fn pick(&mut self, len: usize) -> usize;
}

/// [`SelectionDraws`] backed by any `rand` generator
pub struct RngDraws<R: Rng> {
    rng: R,
}

impl<R: Rng> RngDraws<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> SelectionDraws for RngDraws<R> {
    fn roll(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    fn pick(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }
}

/// Which branch produced the selected move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    Best,
    Suboptimal,
    Blunder,
}

pub struct MoveSelector;

impl MoveSelector {
    /// Pick one of `candidates` (best first) for `side`
    ///
    /// Scores are compared from `side`'s perspective. Returns `None` only when
    /// `candidates` is empty.
    pub fn select<'a, D: SelectionDraws>(
        candidates: &'a [RankedMove],
        side: Side,
        config: &LegitModeConfig,
        draws: &mut D,
    ) -> Option<(&'a RankedMove, SelectionKind)> {
        let best = candidates.first()?;
        if candidates.len() < 2 || !config.enabled {
            return Some((best, SelectionKind::Best));
        }

        let roll = draws.roll();
        let blunder = f64::from(config.blunder_chance);
        let suboptimal = f64::from(config.suboptimal_chance);

        let (band, kind) = if roll < blunder {
            (BLUNDER_BAND, SelectionKind::Blunder)
        } else if roll < blunder + suboptimal {
            (SUBOPTIMAL_BAND, SelectionKind::Suboptimal)
        } else {
            tracing::debug!("[LEGIT] Suggesting the best move");
            return Some((best, SelectionKind::Best));
        };

        let best_cp = best.evaluation.centipawns(side);
        let in_band: Vec<&RankedMove> = candidates[1..]
            .iter()
            .filter(|c| band.contains(&(best_cp - c.evaluation.centipawns(side))))
            .collect();

        if in_band.is_empty() {
            tracing::debug!("[LEGIT] No {kind:?} line in band, suggesting the best move");
            return Some((best, SelectionKind::Best));
        }

        let chosen = in_band[draws.pick(in_band.len())];
        tracing::info!("[LEGIT] Suggesting {kind:?} move {}", chosen.mv);
        Some((chosen, kind))
    }
}
