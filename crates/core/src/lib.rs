//! Core board logic - pure, deterministic, and testable
//!
//! This crate holds every rule of the match-3 board. It has **zero
//! dependencies** on rendering, input devices or async runtimes, so it is:
//!
//! - **Deterministic**: the same seed and the same clicks replay the same game
//! - **Testable**: fixtures are plain text rows (see [`Grid::from_rows`])
//! - **Portable**: a frontend only needs to forward clicks and read events
//!
//! # Module Structure
//!
//! - [`config`]: board dimensions, chip kinds, validation
//! - [`grid`]: cell storage, chip placement, initial fill without runs
//! - [`matcher`]: horizontal and vertical run detection
//! - [`cascade`]: remove / compact / refill passes until the board settles
//! - [`board`]: the selection and swap protocol driving everything above
//! - [`rng`]: seeded chip generation
//! - [`scoring`]: points per removed run
//! - [`hint`]: search for committing swaps
//! - [`snapshot`]: serializable board view with a stable layout hash
//!
//! # Rules
//!
//! - The board is a `width x height` grid; a few cells are blocked and never
//!   hold a chip.
//! - A run is three or more chips of one kind in a row or a column.
//! - A freshly built board never contains a run.
//! - Swapping two adjacent chips is kept only if a run then passes through
//!   one of them; otherwise the chips go back.
//! - A kept swap starts a cascade: runs are cleared, chips fall toward
//!   `y = 0` (stopping on blocked cells), holes are refilled, and this
//!   repeats until a pass clears nothing.
//!
//! # Example
//!
//! ```
//! use tile_match_core::{Board, BoardConfig, ControllerState};
//! use tile_match_core::types::BoardIndex;
//!
//! let mut board = Board::new(BoardConfig::default(), 12345).unwrap();
//!
//! // Try the first committing swap the board offers, if any.
//! if let Some((a, b)) = board.valid_swaps().first().copied() {
//!     board.on_cell_clicked(a);
//!     board.on_cell_clicked(b);
//!     assert!(board.last_cascade().is_some());
//! }
//! assert_eq!(board.state(), ControllerState::Idle);
//! ```

pub mod board;
pub mod cascade;
pub mod config;
pub mod grid;
pub mod hint;
pub mod matcher;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use tile_match_types as types;

// Re-export commonly used types for convenience
pub use board::{
    Board, ClickOutcome, ControllerState, IgnoreReason, SwapOutcome, SwapRejection,
};
pub use cascade::{CascadePhase, CascadeResolver, CascadeStats, CascadeStep};
pub use config::{BoardConfig, ChipKindConfig, ConfigError};
pub use grid::{Cell, Grid};
pub use matcher::{find_runs, has_run_through};
pub use rng::{ChipGenerator, SimpleRng};
pub use scoring::{run_score, ScoreSystem};
pub use snapshot::{board_hash, BoardSnapshot, CellSnapshot};
