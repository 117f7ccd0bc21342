//! Cascade resolution - remove, compact, refill until the board settles
//!
//! A cascade is a sequence of passes. Each pass runs three phases:
//!
//! 1. **Remove**: every run on the board is cleared (chips destroyed).
//! 2. **Compact**: chips fall toward `y = 0` inside their column. A blocked
//!    cell is a hard floor: the cells above it form an independent
//!    sub-column and nothing ever falls through it.
//! 3. **Refill**: every open empty cell receives a fresh random chip, bottom
//!    up, column by column. Refill does not avoid runs.
//!
//! If the Remove phase of a pass cleared anything, another pass follows,
//! because compaction and refill can line up new runs. A pass that removes
//! nothing ends the cascade.
//!
//! [`CascadeResolver::step`] advances exactly one phase so a driver can wait
//! for animations between phases; [`CascadeResolver::run_to_fixpoint`] runs
//! all of them back to back.

use crate::grid::Grid;
use crate::matcher::find_runs;
use crate::rng::ChipGenerator;
use crate::types::{BoardIndex, Chip, ChipMove, Run};

/// Phase the resolver will run next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CascadePhase {
    Remove,
    Compact,
    Refill,
    Finished,
}

/// What one phase did to the grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CascadeStep {
    Removed {
        pass: u32,
        runs: Vec<Run>,
        /// Destroyed chips with the cell each one left
        chips: Vec<(BoardIndex, Chip)>,
    },
    Compacted {
        pass: u32,
        moves: Vec<ChipMove>,
    },
    Refilled {
        pass: u32,
        spawned: Vec<(BoardIndex, Chip)>,
    },
}

impl CascadeStep {
    pub fn pass(&self) -> u32 {
        match self {
            CascadeStep::Removed { pass, .. }
            | CascadeStep::Compacted { pass, .. }
            | CascadeStep::Refilled { pass, .. } => *pass,
        }
    }

    /// True if the phase changed nothing
    pub fn is_noop(&self) -> bool {
        match self {
            CascadeStep::Removed { chips, .. } => chips.is_empty(),
            CascadeStep::Compacted { moves, .. } => moves.is_empty(),
            CascadeStep::Refilled { spawned, .. } => spawned.is_empty(),
        }
    }
}

/// Totals over a whole cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CascadeStats {
    pub passes: u32,
    pub runs_removed: u32,
    pub chips_removed: u32,
    pub chips_moved: u32,
    pub chips_spawned: u32,
}

/// Drives one cascade through its phases
#[derive(Debug, Clone)]
pub struct CascadeResolver {
    phase: CascadePhase,
    pass: u32,
    any_removed: bool,
    stats: CascadeStats,
}

impl Default for CascadeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl CascadeResolver {
    pub fn new() -> Self {
        Self {
            phase: CascadePhase::Remove,
            pass: 1,
            any_removed: false,
            stats: CascadeStats::default(),
        }
    }

    pub fn phase(&self) -> CascadePhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == CascadePhase::Finished
    }

    pub fn stats(&self) -> CascadeStats {
        self.stats
    }

    /// Run the next phase. Returns `None` once the cascade has finished.
    pub fn step(&mut self, grid: &mut Grid, generator: &mut ChipGenerator) -> Option<CascadeStep> {
        let pass = self.pass;
        match self.phase {
            CascadePhase::Remove => {
                let (runs, chips) = remove_runs(grid);
                self.any_removed = !chips.is_empty();
                self.stats.passes = pass;
                self.stats.runs_removed += runs.len() as u32;
                self.stats.chips_removed += chips.len() as u32;
                self.phase = CascadePhase::Compact;
                tracing::trace!(pass, runs = runs.len(), chips = chips.len(), "remove phase");
                Some(CascadeStep::Removed { pass, runs, chips })
            }
            CascadePhase::Compact => {
                let moves = compact(grid);
                self.stats.chips_moved += moves.len() as u32;
                self.phase = CascadePhase::Refill;
                tracing::trace!(pass, moved = moves.len(), "compact phase");
                Some(CascadeStep::Compacted { pass, moves })
            }
            CascadePhase::Refill => {
                let spawned = refill(grid, generator);
                self.stats.chips_spawned += spawned.len() as u32;
                if self.any_removed {
                    self.phase = CascadePhase::Remove;
                    self.pass += 1;
                } else {
                    self.phase = CascadePhase::Finished;
                }
                tracing::trace!(pass, spawned = spawned.len(), "refill phase");
                Some(CascadeStep::Refilled { pass, spawned })
            }
            CascadePhase::Finished => None,
        }
    }

    /// Run every remaining phase and return the totals
    pub fn run_to_fixpoint(
        &mut self,
        grid: &mut Grid,
        generator: &mut ChipGenerator,
    ) -> CascadeStats {
        while self.step(grid, generator).is_some() {}
        self.stats
    }
}

/// Clear every run currently on the board.
///
/// Cells shared by a horizontal and a vertical run are destroyed once.
pub fn remove_runs(grid: &mut Grid) -> (Vec<Run>, Vec<(BoardIndex, Chip)>) {
    let runs = find_runs(grid);
    let mut chips = Vec::new();
    for run in &runs {
        for index in run.cells() {
            if grid.chip(index).is_some() {
                chips.push((index, grid.remove_chip(index)));
            }
        }
    }
    (runs, chips)
}

/// Let chips fall toward `y = 0`, never through a blocked cell.
///
/// Within each sub-column the chips keep their order; each one lands on the
/// lowest vacant cell beneath it.
pub fn compact(grid: &mut Grid) -> Vec<ChipMove> {
    let mut moves = Vec::new();
    for x in 0..grid.width() {
        // Lowest vacant cell of the current sub-column
        let mut floor = 0u16;
        for y in 0..grid.height() {
            let index = BoardIndex::new(x, y);
            if grid.is_blocked(index) {
                floor = y + 1;
                continue;
            }
            if grid.chip(index).is_some() {
                if floor != y {
                    moves.push(grid.move_chip(index, BoardIndex::new(x, floor)));
                }
                floor += 1;
            }
        }
    }
    moves
}

/// Put a new chip into every vacant cell, bottom up within each column
pub fn refill(grid: &mut Grid, generator: &mut ChipGenerator) -> Vec<(BoardIndex, Chip)> {
    let mut spawned = Vec::new();
    for x in 0..grid.width() {
        for y in 0..grid.height() {
            let index = BoardIndex::new(x, y);
            if grid.cell(index).is_some_and(|c| c.is_vacant()) {
                let chip = generator.generate();
                grid.place_chip(index, chip);
                spawned.push((index, chip));
            }
        }
    }
    spawned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChipId;

    fn generator_for(grid: &Grid, kinds: u8, seed: u32) -> ChipGenerator {
        let mut gen = ChipGenerator::new((0..kinds).collect(), seed);
        gen.reserve_ids(grid.max_chip_id().map_or(0, |id| id.0 + 1));
        gen
    }

    #[test]
    fn test_compact_drops_chips_to_floor() {
        let mut grid = Grid::from_rows(&["1", ".", "2", ".", "."]).unwrap();
        let moves = compact(&mut grid);
        assert_eq!(grid.to_string(), ".\n.\n.\n1\n2");
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[0].from, BoardIndex::new(0, 2));
        assert_eq!(moves[0].to, BoardIndex::new(0, 0));
        assert_eq!(moves[1].from, BoardIndex::new(0, 4));
        assert_eq!(moves[1].to, BoardIndex::new(0, 1));
    }

    #[test]
    fn test_compact_treats_blocked_as_floor() {
        let mut grid = Grid::from_rows(&["1", ".", "#", ".", "2"]).unwrap();
        compact(&mut grid);
        // The chip above the blocked cell stops on it; the one below stays put.
        assert_eq!(grid.to_string(), ".\n1\n#\n.\n2");
    }

    #[test]
    fn test_compact_keeps_chip_identity() {
        let mut grid = Grid::from_rows(&["3", "."]).unwrap();
        let before = grid.chip(BoardIndex::new(0, 1)).unwrap();
        compact(&mut grid);
        assert_eq!(grid.chip(BoardIndex::new(0, 0)), Some(before));
    }

    #[test]
    fn test_compact_on_full_board_is_noop() {
        let mut grid = Grid::from_rows(&["01", "10"]).unwrap();
        assert!(compact(&mut grid).is_empty());
    }

    #[test]
    fn test_refill_fills_every_vacant_cell() {
        let mut grid = Grid::from_rows(&["..", "#.", "01"]).unwrap();
        let mut gen = generator_for(&grid, 3, 5);
        let spawned = refill(&mut grid, &mut gen);
        assert_eq!(spawned.len(), 3);
        assert_eq!(grid.vacant_count(), 0);
        assert!(grid.is_blocked(BoardIndex::new(0, 1)));
        // Bottom-up order inside column 1.
        assert_eq!(spawned[1].0, BoardIndex::new(1, 1));
        assert_eq!(spawned[2].0, BoardIndex::new(1, 2));
        // Fresh ids continue after the fixture's.
        assert!(spawned.iter().all(|(_, chip)| chip.id >= ChipId(2)));
    }

    #[test]
    fn test_remove_runs_clears_shared_cell_once() {
        let mut grid = Grid::from_rows(&["121", "222", "323"]).unwrap();
        let (runs, chips) = remove_runs(&mut grid);
        assert_eq!(runs.len(), 2);
        assert_eq!(chips.len(), 5);
        assert_eq!(grid.chips_destroyed(), 5);
    }

    #[test]
    fn test_step_walks_phases_in_order() {
        let mut grid = Grid::from_rows(&["012", "120", "000"]).unwrap();
        let mut gen = generator_for(&grid, 4, 9);
        let mut resolver = CascadeResolver::new();

        assert_eq!(resolver.phase(), CascadePhase::Remove);
        let step = resolver.step(&mut grid, &mut gen).unwrap();
        assert!(matches!(
            step,
            CascadeStep::Removed { pass: 1, ref chips, .. } if chips.len() == 3
        ));

        assert_eq!(resolver.phase(), CascadePhase::Compact);
        let step = resolver.step(&mut grid, &mut gen).unwrap();
        assert!(matches!(
            step,
            CascadeStep::Compacted { pass: 1, ref moves } if moves.len() == 6
        ));

        assert_eq!(resolver.phase(), CascadePhase::Refill);
        let step = resolver.step(&mut grid, &mut gen).unwrap();
        assert!(matches!(
            step,
            CascadeStep::Refilled { pass: 1, ref spawned } if spawned.len() == 3
        ));

        // Something was removed, so another pass must follow.
        assert_eq!(resolver.phase(), CascadePhase::Remove);
    }

    #[test]
    fn test_settled_board_finishes_after_one_pass() {
        let mut grid = Grid::from_rows(&["012", "120", "201"]).unwrap();
        let before = grid.clone();
        let mut gen = generator_for(&grid, 3, 1);
        let mut resolver = CascadeResolver::new();

        let stats = resolver.run_to_fixpoint(&mut grid, &mut gen);
        assert!(resolver.is_finished());
        assert_eq!(stats.passes, 1);
        assert_eq!(stats.chips_removed, 0);
        assert_eq!(stats.chips_moved, 0);
        assert_eq!(stats.chips_spawned, 0);
        assert_eq!(grid, before);
        assert_eq!(resolver.step(&mut grid, &mut gen), None);
    }

    #[test]
    fn test_run_to_fixpoint_leaves_no_runs() {
        for seed in 1..40 {
            let mut grid = Grid::from_rows(&["0000", "1111", "2222", "0000"]).unwrap();
            let mut gen = generator_for(&grid, 4, seed);
            let stats = CascadeResolver::new().run_to_fixpoint(&mut grid, &mut gen);
            assert!(find_runs(&grid).is_empty(), "seed {seed}:\n{grid}");
            assert_eq!(grid.vacant_count(), 0);
            assert!(stats.chips_removed >= 16);
            assert!(stats.passes >= 2);
        }
    }
}
