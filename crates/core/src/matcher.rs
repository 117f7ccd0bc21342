//! Match detection - horizontal and vertical runs of three or more
//!
//! Runs are maximal lines of same-kind chips inside one row or one column.
//! Blocked and empty cells break a line. Detection always reads the current
//! grid; nothing is cached between cascade passes.

use crate::grid::Grid;
use crate::types::{BoardIndex, ChipKindId, Orientation, Run, MIN_RUN_LENGTH};

/// Tracks the run being extended while walking one line
struct LineScan {
    orientation: Orientation,
    kind: Option<ChipKindId>,
    start: BoardIndex,
    len: u16,
}

impl LineScan {
    fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            kind: None,
            start: BoardIndex::new(0, 0),
            len: 0,
        }
    }

    fn visit(&mut self, index: BoardIndex, kind: Option<ChipKindId>, out: &mut Vec<Run>) {
        match kind {
            Some(k) if self.kind == Some(k) => self.len += 1,
            _ => {
                self.flush(out);
                self.kind = kind;
                self.start = index;
                self.len = u16::from(kind.is_some());
            }
        }
    }

    fn flush(&mut self, out: &mut Vec<Run>) {
        if let Some(kind) = self.kind {
            if usize::from(self.len) >= MIN_RUN_LENGTH {
                out.push(Run::new(self.orientation, kind, self.start, self.len));
            }
        }
        self.kind = None;
        self.len = 0;
    }
}

/// Runs along row `y`, left to right
pub fn runs_in_row(grid: &Grid, y: u16, out: &mut Vec<Run>) {
    let mut scan = LineScan::new(Orientation::Horizontal);
    for index in grid.row(y) {
        scan.visit(index, grid.kind(index), out);
    }
    scan.flush(out);
}

/// Runs along column `x`, bottom to top
pub fn runs_in_column(grid: &Grid, x: u16, out: &mut Vec<Run>) {
    let mut scan = LineScan::new(Orientation::Vertical);
    for index in grid.column(x) {
        scan.visit(index, grid.kind(index), out);
    }
    scan.flush(out);
}

/// Every run on the board: all rows bottom to top, then all columns left to right.
///
/// A chip can belong to one horizontal and one vertical run at once (L and T
/// shapes); both runs are reported.
pub fn find_runs(grid: &Grid) -> Vec<Run> {
    let mut runs = Vec::new();
    for y in 0..grid.height() {
        runs_in_row(grid, y, &mut runs);
    }
    for x in 0..grid.width() {
        runs_in_column(grid, x, &mut runs);
    }
    runs
}

/// True if any run exists
pub fn has_any_run(grid: &Grid) -> bool {
    !find_runs(grid).is_empty()
}

/// Count same-kind neighbours from `index` walking `(dx, dy)` until the line breaks
fn reach(grid: &Grid, index: BoardIndex, kind: ChipKindId, dx: i32, dy: i32) -> usize {
    let mut count = 0;
    let mut cursor = index.offset(dx, dy);
    while let Some(at) = cursor {
        if grid.kind(at) != Some(kind) {
            break;
        }
        count += 1;
        cursor = at.offset(dx, dy);
    }
    count
}

/// Length of the line of chips of the same kind as `index` that passes through it
pub fn line_length(grid: &Grid, index: BoardIndex, orientation: Orientation) -> usize {
    let Some(kind) = grid.kind(index) else {
        return 0;
    };
    let (dx, dy) = match orientation {
        Orientation::Horizontal => (1, 0),
        Orientation::Vertical => (0, 1),
    };
    1 + reach(grid, index, kind, -dx, -dy) + reach(grid, index, kind, dx, dy)
}

/// True if the chip at `index` is part of a run in its row or in its column.
///
/// Local check used to validate a swap without scanning the whole board.
/// Empty, blocked and out-of-range cells never are.
pub fn has_run_through(grid: &Grid, index: BoardIndex) -> bool {
    line_length(grid, index, Orientation::Horizontal) >= MIN_RUN_LENGTH
        || line_length(grid, index, Orientation::Vertical) >= MIN_RUN_LENGTH
}
