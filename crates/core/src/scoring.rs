//! Scoring module - turns removal notifications into points
//!
//! The board never scores itself; it only reports how many chips each run
//! removed. [`ScoreSystem`] is an observer over those reports:
//! - a run of exactly 3 chips is worth 10 points
//! - every chip beyond the third adds 5 more
//! - anything shorter than 3 scores nothing

use crate::types::{BoardEvent, MIN_RUN_LENGTH, RUN_BASE_SCORE, RUN_EXTRA_CHIP_SCORE};

/// Points for one removed run of `chips` chips
pub fn run_score(chips: u32) -> u32 {
    let min = MIN_RUN_LENGTH as u32;
    if chips < min {
        return 0;
    }
    RUN_BASE_SCORE.saturating_add(RUN_EXTRA_CHIP_SCORE.saturating_mul(chips - min))
}

/// Running score built from board events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreSystem {
    score: u32,
    runs: u32,
}

impl ScoreSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Number of scored runs
    pub fn runs(&self) -> u32 {
        self.runs
    }

    /// Credit one removed run. Returns the points it earned.
    pub fn on_chips_removed(&mut self, count: u32) -> u32 {
        let points = run_score(count);
        if points > 0 {
            self.score = self.score.saturating_add(points);
            self.runs += 1;
        }
        points
    }

    /// Feed one board event; only [`BoardEvent::ChipsRemoved`] matters.
    ///
    /// Returns the points earned by this event.
    pub fn observe(&mut self, event: &BoardEvent) -> u32 {
        match event {
            BoardEvent::ChipsRemoved { count, .. } => self.on_chips_removed(*count),
            _ => 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
