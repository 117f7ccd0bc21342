//! Board controller - the player-facing swap protocol
//!
//! The board owns the grid, the chip generator and the selection state, and
//! is the only writer of all three. Input arrives as cell clicks:
//!
//! | State | Click | Result |
//! |-------|-------|--------|
//! | `Idle` | c | `Selected(c)` |
//! | `Selected(c)` | c | `Idle` |
//! | `Selected(c)` | d, not adjacent | `Selected(d)` |
//! | `Selected(c)` | d, adjacent | swap; commit into `Resolving` or revert into `Idle` |
//! | `Resolving` | any | ignored |
//!
//! Clicks on blocked, empty or out-of-range cells are ignored in every state.
//!
//! A committed swap starts a cascade. [`Board::on_cell_clicked`] resolves it
//! immediately; [`Board::handle_click`] leaves it pending so a driver can call
//! [`Board::step_cascade`] phase by phase and wait for animations in between.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::cascade::{CascadeResolver, CascadeStats, CascadeStep};
use crate::config::{BoardConfig, ConfigError};
use crate::grid::Grid;
use crate::hint;
use crate::matcher::has_run_through;
use crate::rng::ChipGenerator;
use crate::snapshot::BoardSnapshot;
use crate::types::{BoardEvent, BoardIndex};

/// Selection state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "at", rename_all = "snake_case")]
pub enum ControllerState {
    Idle,
    Selected(BoardIndex),
    /// A cascade is running; input is suppressed
    Resolving,
}

/// Why a click did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IgnoreReason {
    Resolving,
    OutOfBounds,
    Blocked,
    Empty,
}

/// Why a swap was refused before touching the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapRejection {
    NotAdjacent,
    Resolving,
    /// The cell is blocked, empty or off the board
    NoChip(BoardIndex),
}

/// Result of a swap attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapOutcome {
    /// A run formed through one of the swapped cells; a cascade is pending or done
    Committed,
    /// No run formed; the chips were put back
    Reverted,
    Rejected(SwapRejection),
}

/// Result of a click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickOutcome {
    Ignored(IgnoreReason),
    Selected(BoardIndex),
    Deselected(BoardIndex),
    Reselected { from: BoardIndex, to: BoardIndex },
    Swapped {
        a: BoardIndex,
        b: BoardIndex,
        outcome: SwapOutcome,
    },
}

/// A playable board
#[derive(Debug, Clone)]
pub struct Board {
    config: BoardConfig,
    grid: Grid,
    generator: ChipGenerator,
    state: ControllerState,
    cascade: Option<CascadeResolver>,
    last_cascade: Option<CascadeStats>,
    /// Pending notifications (drained by observers)
    events: Vec<BoardEvent>,
    seed: u32,
}

impl Board {
    /// Build a board: place blocked cells, then fill it with no run of three.
    #[instrument(level = "debug", skip(config))]
    pub fn new(config: BoardConfig, seed: u32) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut generator = ChipGenerator::new(config.kind_ids(), seed);
        let mut grid = Grid::with_random_blocked(&config, generator.rng_mut())?;
        grid.fill(&mut generator);

        debug!(
            width = config.width,
            height = config.height,
            blocked = grid.blocked_count(),
            seed,
            "board created"
        );

        Ok(Self::assemble(config, grid, generator, seed))
    }

    /// Wrap an existing grid (fixtures, replays). The grid is used as is.
    pub fn from_grid(config: BoardConfig, grid: Grid, seed: u32) -> Result<Self, ConfigError> {
        config.validate()?;
        if grid.width() != config.width || grid.height() != config.height {
            return Err(ConfigError::DimensionMismatch {
                width: config.width,
                height: config.height,
                actual_width: grid.width(),
                actual_height: grid.height(),
            });
        }

        let mut generator = ChipGenerator::new(config.kind_ids(), seed);
        generator.reserve_ids(grid.max_chip_id().map_or(0, |id| id.0 + 1));
        Ok(Self::assemble(config, grid, generator, seed))
    }

    fn assemble(config: BoardConfig, grid: Grid, generator: ChipGenerator, seed: u32) -> Self {
        Self {
            config,
            grid,
            generator,
            state: ControllerState::Idle,
            cascade: None,
            last_cascade: None,
            events: Vec::new(),
            seed,
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn selected(&self) -> Option<BoardIndex> {
        match self.state {
            ControllerState::Selected(at) => Some(at),
            _ => None,
        }
    }

    pub fn is_resolving(&self) -> bool {
        self.state == ControllerState::Resolving
    }

    /// Totals of the most recent finished cascade
    pub fn last_cascade(&self) -> Option<CascadeStats> {
        self.last_cascade
    }

    /// Events emitted since the last call, in order
    pub fn take_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[BoardEvent] {
        &self.events
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::capture(self)
    }

    /// Adjacent pairs whose swap would commit
    pub fn valid_swaps(&self) -> Vec<(BoardIndex, BoardIndex)> {
        hint::valid_swaps(&self.grid)
    }

    /// Handle a click and run any resulting cascade to completion.
    pub fn on_cell_clicked(&mut self, index: BoardIndex) -> ClickOutcome {
        let outcome = self.handle_click(index);
        if self.is_resolving() {
            self.resolve_cascade();
        }
        outcome
    }

    /// Handle a click. A committed swap leaves the board `Resolving` until the
    /// cascade is stepped to completion.
    pub fn handle_click(&mut self, index: BoardIndex) -> ClickOutcome {
        if let Err(reason) = self.check_clickable(index) {
            trace!(at = %index, ?reason, "click ignored");
            return ClickOutcome::Ignored(reason);
        }

        match self.state {
            ControllerState::Idle => {
                self.select(index);
                ClickOutcome::Selected(index)
            }
            ControllerState::Selected(current) if current == index => {
                self.deselect(current);
                ClickOutcome::Deselected(current)
            }
            ControllerState::Selected(current) if !self.grid.are_adjacent(current, index) => {
                self.deselect(current);
                self.select(index);
                ClickOutcome::Reselected {
                    from: current,
                    to: index,
                }
            }
            ControllerState::Selected(current) => {
                self.deselect(current);
                let outcome = self.swap_adjacent(current, index);
                ClickOutcome::Swapped {
                    a: current,
                    b: index,
                    outcome,
                }
            }
            // Covered by check_clickable.
            ControllerState::Resolving => ClickOutcome::Ignored(IgnoreReason::Resolving),
        }
    }

    fn check_clickable(&self, index: BoardIndex) -> Result<(), IgnoreReason> {
        if self.is_resolving() {
            return Err(IgnoreReason::Resolving);
        }
        let cell = self.grid.cell(index).ok_or(IgnoreReason::OutOfBounds)?;
        if cell.is_blocked() {
            return Err(IgnoreReason::Blocked);
        }
        if cell.chip().is_none() {
            return Err(IgnoreReason::Empty);
        }
        Ok(())
    }

    fn select(&mut self, index: BoardIndex) {
        self.grid.set_selected(index, true);
        self.state = ControllerState::Selected(index);
        self.events.push(BoardEvent::CellSelected { at: index });
        trace!(at = %index, "selected");
    }

    fn deselect(&mut self, index: BoardIndex) {
        self.grid.set_selected(index, false);
        self.state = ControllerState::Idle;
        self.events.push(BoardEvent::CellDeselected { at: index });
        trace!(at = %index, "deselected");
    }

    /// Swap two chips directly, outside the click protocol.
    ///
    /// Rejected without touching the grid if a cascade is running, either cell
    /// has no chip, or the cells are not adjacent. Any current selection is
    /// dropped before the swap.
    pub fn try_swap(&mut self, a: BoardIndex, b: BoardIndex) -> SwapOutcome {
        if self.is_resolving() {
            return SwapOutcome::Rejected(SwapRejection::Resolving);
        }
        for index in [a, b] {
            if self.grid.chip(index).is_none() {
                return SwapOutcome::Rejected(SwapRejection::NoChip(index));
            }
        }
        if !self.grid.are_adjacent(a, b) {
            return SwapOutcome::Rejected(SwapRejection::NotAdjacent);
        }

        if let Some(current) = self.selected() {
            self.deselect(current);
        }
        self.swap_adjacent(a, b)
    }

    /// Trial swap: keep it if a run now passes through either cell, else undo it
    fn swap_adjacent(&mut self, a: BoardIndex, b: BoardIndex) -> SwapOutcome {
        self.grid.swap_chips(a, b);

        if has_run_through(&self.grid, a) || has_run_through(&self.grid, b) {
            debug!(a = %a, b = %b, "swap committed");
            self.events.push(BoardEvent::SwapCommitted { a, b });
            self.begin_cascade();
            SwapOutcome::Committed
        } else {
            self.grid.swap_chips(a, b);
            debug!(a = %a, b = %b, "swap reverted");
            self.events.push(BoardEvent::SwapReverted { a, b });
            SwapOutcome::Reverted
        }
    }

    fn begin_cascade(&mut self) {
        self.state = ControllerState::Resolving;
        self.cascade = Some(CascadeResolver::new());
        self.events.push(BoardEvent::CascadeStarted);
        debug!("cascade started");
    }

    /// Run the next cascade phase.
    ///
    /// Returns `None` when no cascade is pending. After the phase that
    /// finishes the cascade the board is `Idle` again.
    pub fn step_cascade(&mut self) -> Option<CascadeStep> {
        let resolver = self.cascade.as_mut()?;
        let step = resolver.step(&mut self.grid, &mut self.generator);
        let finished = resolver.is_finished();
        let stats = resolver.stats();

        if let Some(step) = &step {
            self.record_step(step);
        }
        if finished || step.is_none() {
            self.finish_cascade(stats);
        }
        step
    }

    /// Step the pending cascade to its fixpoint. Returns its totals, or
    /// `None` if no cascade was pending.
    pub fn resolve_cascade(&mut self) -> Option<CascadeStats> {
        if self.cascade.is_none() {
            return None;
        }
        while self.step_cascade().is_some() {}
        self.last_cascade
    }

    fn finish_cascade(&mut self, stats: CascadeStats) {
        self.cascade = None;
        self.last_cascade = Some(stats);
        self.state = ControllerState::Idle;
        self.events.push(BoardEvent::CascadeEnded {
            passes: stats.passes,
            chips_removed: stats.chips_removed,
        });
        debug!(
            passes = stats.passes,
            removed = stats.chips_removed,
            spawned = stats.chips_spawned,
            "cascade ended"
        );
    }

    fn record_step(&mut self, step: &CascadeStep) {
        match step {
            CascadeStep::Removed { runs, chips, .. } => {
                for run in runs {
                    self.events.push(BoardEvent::ChipsRemoved {
                        kind: run.kind,
                        count: u32::from(run.len),
                        orientation: run.orientation,
                    });
                }
                for &(at, chip) in chips {
                    self.events.push(BoardEvent::ChipDestroyed { chip, at });
                }
            }
            CascadeStep::Compacted { moves, .. } => {
                for m in moves {
                    self.events.push(BoardEvent::ChipMoved {
                        chip: m.chip,
                        from: m.from,
                        to: m.to,
                    });
                }
            }
            CascadeStep::Refilled { spawned, .. } => {
                for &(at, chip) in spawned {
                    self.events.push(BoardEvent::ChipSpawned { chip, at });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{find_runs, has_run_through};

    fn fixture(rows: &[&str]) -> Board {
        let grid = Grid::from_rows(rows).unwrap();
        let config = BoardConfig::with_dimensions(grid.width(), grid.height(), 0, 4);
        Board::from_grid(config, grid, 7).unwrap()
    }

    #[test]
    fn test_new_board_has_no_runs() {
        let board = Board::new(BoardConfig::default(), 12345).unwrap();
        assert!(find_runs(board.grid()).is_empty());
        assert_eq!(board.grid().blocked_count(), 3);
        assert_eq!(board.state(), ControllerState::Idle);
    }

    #[test]
    fn test_new_board_rejects_bad_config() {
        let config = BoardConfig::with_dimensions(2, 2, 4, 4);
        assert!(Board::new(config, 1).is_err());
    }

    #[test]
    fn test_select_and_deselect() {
        let mut board = fixture(&["012", "120", "201"]);
        let c = BoardIndex::new(1, 1);

        assert_eq!(board.handle_click(c), ClickOutcome::Selected(c));
        assert_eq!(board.state(), ControllerState::Selected(c));
        assert!(board.grid().cell(c).unwrap().is_selected());

        assert_eq!(board.handle_click(c), ClickOutcome::Deselected(c));
        assert_eq!(board.state(), ControllerState::Idle);
        assert!(!board.grid().cell(c).unwrap().is_selected());

        assert_eq!(
            board.take_events(),
            vec![
                BoardEvent::CellSelected { at: c },
                BoardEvent::CellDeselected { at: c }
            ]
        );
    }

    #[test]
    fn test_non_adjacent_click_moves_selection() {
        let mut board = fixture(&["012", "120", "201"]);
        let before = board.grid().clone();
        let c = BoardIndex::new(0, 0);
        let d = BoardIndex::new(2, 2);

        board.handle_click(c);
        assert_eq!(
            board.handle_click(d),
            ClickOutcome::Reselected { from: c, to: d }
        );
        assert_eq!(board.selected(), Some(d));
        assert!(!board.grid().cell(c).unwrap().is_selected());

        // Only the selection marks differ.
        let mut after = board.grid().clone();
        after.set_selected(d, false);
        assert_eq!(after, before);
    }

    #[test]
    fn test_ignored_clicks() {
        let mut board = fixture(&["0#2", "1.0", "201"]);
        assert_eq!(
            board.handle_click(BoardIndex::new(1, 2)),
            ClickOutcome::Ignored(IgnoreReason::Blocked)
        );
        assert_eq!(
            board.handle_click(BoardIndex::new(1, 1)),
            ClickOutcome::Ignored(IgnoreReason::Empty)
        );
        assert_eq!(
            board.handle_click(BoardIndex::new(3, 0)),
            ClickOutcome::Ignored(IgnoreReason::OutOfBounds)
        );
        assert_eq!(board.state(), ControllerState::Idle);
        assert!(board.take_events().is_empty());
    }

    #[test]
    fn test_failed_swap_reverts() {
        let mut board = fixture(&["012", "120", "201"]);
        let before = board.grid().clone();
        let a = BoardIndex::new(0, 0);
        let b = BoardIndex::new(1, 0);

        board.handle_click(a);
        let outcome = board.handle_click(b);
        assert_eq!(
            outcome,
            ClickOutcome::Swapped {
                a,
                b,
                outcome: SwapOutcome::Reverted
            }
        );
        assert_eq!(board.grid(), &before);
        assert_eq!(board.state(), ControllerState::Idle);
        assert!(board
            .take_events()
            .contains(&BoardEvent::SwapReverted { a, b }));
    }

    #[test]
    fn test_committed_swap_enters_resolving() {
        // Swapping (2,0) with (3,0) turns the bottom row into 1 1 1 2.
        let mut board = fixture(&["3030", "0303", "1121"]);
        let a = BoardIndex::new(2, 0);
        let b = BoardIndex::new(3, 0);

        board.handle_click(a);
        let outcome = board.handle_click(b);
        assert!(matches!(
            outcome,
            ClickOutcome::Swapped {
                outcome: SwapOutcome::Committed,
                ..
            }
        ));
        assert!(board.is_resolving());

        // Input is suppressed while resolving.
        assert_eq!(
            board.handle_click(BoardIndex::new(0, 2)),
            ClickOutcome::Ignored(IgnoreReason::Resolving)
        );

        let first = board.step_cascade().unwrap();
        assert!(matches!(first, CascadeStep::Removed { pass: 1, .. }));

        let stats = board.resolve_cascade().unwrap();
        assert!(stats.chips_removed >= 3);
        assert_eq!(board.state(), ControllerState::Idle);
        assert!(find_runs(board.grid()).is_empty());
        assert_eq!(board.grid().vacant_count(), 0);

        let events = board.take_events();
        assert!(events.contains(&BoardEvent::SwapCommitted { a, b }));
        assert!(events.contains(&BoardEvent::CascadeStarted));
        assert!(matches!(
            events.last(),
            Some(BoardEvent::CascadeEnded { .. })
        ));
    }

    #[test]
    fn test_swap_commits_when_only_one_side_matches() {
        // Moving the 2 at (0,0) under column 1 completes 2 2 2 there; the 3
        // landing at (0,0) matches nothing.
        let rows = ["1201", "0210", "2301"];
        for (a, b) in [
            (BoardIndex::new(0, 0), BoardIndex::new(1, 0)),
            (BoardIndex::new(1, 0), BoardIndex::new(0, 0)),
        ] {
            let mut board = fixture(&rows);
            assert_eq!(board.try_swap(a, b), SwapOutcome::Committed);
            assert!(board.is_resolving());

            let grid = board.grid();
            assert_eq!(grid.kind(BoardIndex::new(0, 0)), Some(3));
            assert_eq!(grid.kind(BoardIndex::new(1, 0)), Some(2));
            assert!(!has_run_through(grid, BoardIndex::new(0, 0)));
            assert!(has_run_through(grid, BoardIndex::new(1, 0)));

            let stats = board.resolve_cascade().unwrap();
            assert!(stats.chips_removed >= 3);
        }
    }

    #[test]
    fn test_try_swap_rejects_without_mutation() {
        let mut board = fixture(&["0#2", "1.0", "201"]);
        let before = board.grid().clone();

        assert_eq!(
            board.try_swap(BoardIndex::new(0, 0), BoardIndex::new(2, 0)),
            SwapOutcome::Rejected(SwapRejection::NotAdjacent)
        );
        assert_eq!(
            board.try_swap(BoardIndex::new(0, 1), BoardIndex::new(1, 1)),
            SwapOutcome::Rejected(SwapRejection::NoChip(BoardIndex::new(1, 1)))
        );
        assert_eq!(
            board.try_swap(BoardIndex::new(0, 2), BoardIndex::new(1, 2)),
            SwapOutcome::Rejected(SwapRejection::NoChip(BoardIndex::new(1, 2)))
        );
        assert_eq!(board.grid(), &before);
    }

    #[test]
    fn test_on_cell_clicked_resolves_immediately() {
        let mut board = fixture(&["3030", "0303", "1121"]);
        board.on_cell_clicked(BoardIndex::new(2, 0));
        board.on_cell_clicked(BoardIndex::new(3, 0));
        assert_eq!(board.state(), ControllerState::Idle);
        assert!(board.last_cascade().is_some());
        assert!(find_runs(board.grid()).is_empty());
    }

    #[test]
    fn test_step_cascade_without_cascade() {
        let mut board = fixture(&["012", "120", "201"]);
        assert_eq!(board.step_cascade(), None);
        assert_eq!(board.resolve_cascade(), None);
    }
}
