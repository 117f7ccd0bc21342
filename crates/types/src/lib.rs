//! Core types module - shared data structures and constants
//!
//! This crate defines the fundamental types used throughout the board engine.
//! All types are plain data with no game logic, making them usable in any
//! context (core simulation, async adapter, headless runner, tests).
//!
//! # Coordinates
//!
//! A board is `width` columns by `height` rows. `x` grows to the right,
//! `y` grows upward: `y = 0` is the bottom row and gravity pulls chips
//! toward it.
//!
//! # Default Board
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_WIDTH` | 6 | Columns |
//! | `DEFAULT_HEIGHT` | 6 | Rows |
//! | `DEFAULT_BLOCKED_CELLS` | 3 | Permanently blocked cells |
//! | `DEFAULT_CHIP_KIND_NAMES` | 4 | red, blue, green, yellow |
//!
//! # Examples
//!
//! ```
//! use tile_match_types::{BoardIndex, Orientation, Run};
//!
//! let a = BoardIndex::new(2, 3);
//! assert!(a.is_adjacent(BoardIndex::new(2, 4)));
//! assert!(!a.is_adjacent(BoardIndex::new(3, 4)));
//!
//! let run = Run::new(Orientation::Horizontal, 0, BoardIndex::new(0, 0), 3);
//! assert_eq!(run.end(), BoardIndex::new(2, 0));
//! assert_eq!(run.cells().count(), 3);
//! ```

use serde::{Deserialize, Serialize};

/// Default board width in cells
pub const DEFAULT_WIDTH: u16 = 6;

/// Default board height in cells
pub const DEFAULT_HEIGHT: u16 = 6;

/// Default number of permanently blocked cells
pub const DEFAULT_BLOCKED_CELLS: u16 = 3;

/// Names of the default chip kinds, indexed by kind id
pub const DEFAULT_CHIP_KIND_NAMES: [&str; 4] = ["red", "blue", "green", "yellow"];

/// Default world position of cell (0, 0)
pub const DEFAULT_SPAWN_ORIGIN: [f32; 2] = [-3.0, -3.0];

/// Default distance between neighbouring cell centres
pub const DEFAULT_CELL_PITCH: [f32; 2] = [1.0, 1.0];

/// Shortest run that counts as a match
pub const MIN_RUN_LENGTH: usize = 3;

/// Fewest chip kinds a board can be configured with.
///
/// With two exclusions during the initial fill there must always be a kind left to draw.
pub const MIN_CHIP_KINDS: usize = 3;

/// Most chip kinds a board can be configured with.
///
/// Kind ids stay below the two marker bytes the layout hash uses for empty
/// and blocked cells.
pub const MAX_CHIP_KINDS: usize = 254;

/// Most kinds the generator is ever asked to exclude at once
pub const MAX_EXCLUSIONS: usize = 2;

/// Points for a run of exactly [`MIN_RUN_LENGTH`] chips
pub const RUN_BASE_SCORE: u32 = 10;

/// Points for every chip beyond [`MIN_RUN_LENGTH`] in one run
pub const RUN_EXTRA_CHIP_SCORE: u32 = 5;

/// Chip kind identifier, one of `0..N` for a board configured with N kinds
pub type ChipKindId = u8;

/// Position of a cell on the board
///
/// Equality and hashing are by component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoardIndex {
    pub x: u16,
    pub y: u16,
}

impl BoardIndex {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// True iff the two indices differ by exactly one step along exactly one axis.
    ///
    /// # Examples
    ///
    /// ```
    /// use tile_match_types::BoardIndex;
    ///
    /// let c = BoardIndex::new(1, 1);
    /// assert!(c.is_adjacent(BoardIndex::new(0, 1)));
    /// assert!(c.is_adjacent(BoardIndex::new(1, 2)));
    /// assert!(!c.is_adjacent(BoardIndex::new(2, 2))); // diagonal
    /// assert!(!c.is_adjacent(c));
    /// ```
    pub fn is_adjacent(&self, other: BoardIndex) -> bool {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx + dy == 1
    }

    /// Neighbour one step in the given direction, if it stays non-negative.
    pub fn offset(&self, dx: i32, dy: i32) -> Option<BoardIndex> {
        let x = u16::try_from(i32::from(self.x) + dx).ok()?;
        let y = u16::try_from(i32::from(self.y) + dy).ok()?;
        Some(BoardIndex { x, y })
    }
}

impl std::fmt::Display for BoardIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Identity of a single chip, unique for the lifetime of a board.
///
/// Two chips of the same kind are told apart by their id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChipId(pub u32);

/// A typed token occupying a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chip {
    pub id: ChipId,
    pub kind: ChipKindId,
}

/// Direction a run extends in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Along a row, left to right
    Horizontal,
    /// Along a column, bottom to top
    Vertical,
}

impl Orientation {
    /// Unit step along the orientation
    pub fn step(&self) -> (u16, u16) {
        match self {
            Orientation::Horizontal => (1, 0),
            Orientation::Vertical => (0, 1),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Horizontal => "horizontal",
            Orientation::Vertical => "vertical",
        }
    }
}

/// A maximal line of same-kind chips along one row or one column.
///
/// `start` is the leftmost (horizontal) or lowest (vertical) cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Run {
    pub orientation: Orientation,
    pub kind: ChipKindId,
    pub start: BoardIndex,
    pub len: u16,
}

impl Run {
    pub fn new(orientation: Orientation, kind: ChipKindId, start: BoardIndex, len: u16) -> Self {
        Self {
            orientation,
            kind,
            start,
            len,
        }
    }

    /// Last cell of the run (inclusive)
    pub fn end(&self) -> BoardIndex {
        let (dx, dy) = self.orientation.step();
        let n = self.len.saturating_sub(1);
        BoardIndex::new(self.start.x + dx * n, self.start.y + dy * n)
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True if `index` lies on the run
    pub fn contains(&self, index: BoardIndex) -> bool {
        self.cells().any(|c| c == index)
    }

    /// Cells covered by the run, from `start` to `end`
    pub fn cells(&self) -> impl Iterator<Item = BoardIndex> {
        let (dx, dy) = self.orientation.step();
        let start = self.start;
        (0..self.len).map(move |i| BoardIndex::new(start.x + dx * i, start.y + dy * i))
    }
}

/// A chip relocated from one cell to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChipMove {
    pub chip: Chip,
    pub from: BoardIndex,
    pub to: BoardIndex,
}

/// Notification emitted by the board controller.
///
/// Observers (animation sequencer, input gating, scoring) consume these in
/// emission order. Mutation of the board is only safe to read after
/// [`BoardEvent::CascadeEnded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoardEvent {
    CellSelected {
        at: BoardIndex,
    },
    CellDeselected {
        at: BoardIndex,
    },
    /// The chips at `a` and `b` traded places and the swap stands
    SwapCommitted {
        a: BoardIndex,
        b: BoardIndex,
    },
    /// The swap produced no run and was undone; board state is unchanged
    SwapReverted {
        a: BoardIndex,
        b: BoardIndex,
    },
    CascadeStarted,
    CascadeEnded {
        passes: u32,
        chips_removed: u32,
    },
    /// One run was cleared (scoring hook)
    ChipsRemoved {
        kind: ChipKindId,
        count: u32,
        orientation: Orientation,
    },
    ChipDestroyed {
        chip: Chip,
        at: BoardIndex,
    },
    ChipMoved {
        chip: Chip,
        from: BoardIndex,
        to: BoardIndex,
    },
    ChipSpawned {
        chip: Chip,
        at: BoardIndex,
    },
}

impl BoardEvent {
    /// Short snake_case name of the event variant
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardEvent::CellSelected { .. } => "cell_selected",
            BoardEvent::CellDeselected { .. } => "cell_deselected",
            BoardEvent::SwapCommitted { .. } => "swap_committed",
            BoardEvent::SwapReverted { .. } => "swap_reverted",
            BoardEvent::CascadeStarted => "cascade_started",
            BoardEvent::CascadeEnded { .. } => "cascade_ended",
            BoardEvent::ChipsRemoved { .. } => "chips_removed",
            BoardEvent::ChipDestroyed { .. } => "chip_destroyed",
            BoardEvent::ChipMoved { .. } => "chip_moved",
            BoardEvent::ChipSpawned { .. } => "chip_spawned",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_board_matches_shipped_configuration() {
        assert_eq!(DEFAULT_WIDTH, 6);
        assert_eq!(DEFAULT_HEIGHT, 6);
        assert_eq!(DEFAULT_BLOCKED_CELLS, 3);
        assert_eq!(DEFAULT_CHIP_KIND_NAMES.len(), 4);
        assert!(DEFAULT_CHIP_KIND_NAMES.len() >= MIN_CHIP_KINDS);
        assert!(MIN_CHIP_KINDS > MAX_EXCLUSIONS);
        assert!(MAX_CHIP_KINDS >= MIN_CHIP_KINDS);
    }

    #[test]
    fn adjacency_is_four_directional() {
        let c = BoardIndex::new(3, 3);
        let adjacent = [(2, 3), (4, 3), (3, 2), (3, 4)];
        for (x, y) in adjacent {
            assert!(c.is_adjacent(BoardIndex::new(x, y)), "({x}, {y})");
            assert!(BoardIndex::new(x, y).is_adjacent(c));
        }
        for (x, y) in [(2, 2), (4, 4), (3, 5), (5, 3), (3, 3)] {
            assert!(!c.is_adjacent(BoardIndex::new(x, y)), "({x}, {y})");
        }
    }

    #[test]
    fn offset_stops_at_zero() {
        let origin = BoardIndex::new(0, 0);
        assert_eq!(origin.offset(-1, 0), None);
        assert_eq!(origin.offset(0, -1), None);
        assert_eq!(origin.offset(1, 2), Some(BoardIndex::new(1, 2)));
    }

    #[test]
    fn vertical_run_cells() {
        let run = Run::new(Orientation::Vertical, 2, BoardIndex::new(4, 1), 4);
        let cells: Vec<_> = run.cells().collect();
        assert_eq!(
            cells,
            vec![
                BoardIndex::new(4, 1),
                BoardIndex::new(4, 2),
                BoardIndex::new(4, 3),
                BoardIndex::new(4, 4)
            ]
        );
        assert_eq!(run.end(), BoardIndex::new(4, 4));
        assert!(run.contains(BoardIndex::new(4, 3)));
        assert!(!run.contains(BoardIndex::new(3, 3)));
    }

    #[test]
    fn event_names() {
        let event = BoardEvent::ChipsRemoved {
            kind: 1,
            count: 3,
            orientation: Orientation::Horizontal,
        };
        assert_eq!(event.as_str(), "chips_removed");
        assert_eq!(BoardEvent::CascadeStarted.as_str(), "cascade_started");
    }
}
