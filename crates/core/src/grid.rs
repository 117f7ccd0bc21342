//! Grid module - owns the cells of the board
//!
//! The grid is a fixed `width x height` array of cells stored flat in
//! row-major order (`y * width + x`). Cells are created once and never move;
//! only the chip each cell holds changes over time. Blocked cells are chosen
//! at construction and never hold a chip.
//!
//! Coordinates: `x` grows to the right, `y` grows upward, `y = 0` is the
//! bottom row.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::config::{BoardConfig, ConfigError};
use crate::rng::{ChipGenerator, Exclusions, SimpleRng};
use crate::types::{BoardIndex, Chip, ChipId, ChipKindId, ChipMove};

/// One slot of the grid
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cell {
    index: BoardIndex,
    blocked: bool,
    chip: Option<Chip>,
    selected: bool,
}

impl Cell {
    fn new(index: BoardIndex, blocked: bool) -> Self {
        Self {
            index,
            blocked,
            chip: None,
            selected: false,
        }
    }

    pub fn index(&self) -> BoardIndex {
        self.index
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    pub fn chip(&self) -> Option<Chip> {
        self.chip
    }

    pub fn kind(&self) -> Option<ChipKindId> {
        self.chip.map(|c| c.kind)
    }

    /// Marked as the controller's current selection
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Unblocked and holding no chip
    pub fn is_vacant(&self) -> bool {
        !self.blocked && self.chip.is_none()
    }
}

/// The board's cell storage
///
/// Equality and hashing look at the layout only; the destruction counter
/// is history and two grids holding the same cells compare equal.
#[derive(Debug, Clone)]
pub struct Grid {
    width: u16,
    height: u16,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Cell>,
    chips_destroyed: u32,
}

impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.cells == other.cells
    }
}

impl Eq for Grid {}

impl Hash for Grid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.width.hash(state);
        self.height.hash(state);
        self.cells.hash(state);
    }
}

impl Grid {
    /// Create a grid with no blocked cells and no chips
    pub fn new(width: u16, height: u16) -> Self {
        let mut cells = Vec::with_capacity(usize::from(width) * usize::from(height));
        for y in 0..height {
            for x in 0..width {
                cells.push(Cell::new(BoardIndex::new(x, y), false));
            }
        }
        Self {
            width,
            height,
            cells,
            chips_destroyed: 0,
        }
    }

    /// Create a grid with the given cells blocked
    pub fn with_blocked(
        width: u16,
        height: u16,
        blocked: &[BoardIndex],
    ) -> Result<Self, ConfigError> {
        let mut grid = Self::new(width, height);
        for &index in blocked {
            let Some(slot) = grid.slot(index) else {
                return Err(ConfigError::InvalidLayout(format!(
                    "blocked cell {index} is outside a {width}x{height} grid"
                )));
            };
            if grid.cells[slot].blocked {
                return Err(ConfigError::InvalidLayout(format!(
                    "blocked cell {index} listed twice"
                )));
            }
            grid.cells[slot].blocked = true;
        }
        if grid.blocked_count() >= grid.cells.len() {
            return Err(ConfigError::TooManyBlockedCells {
                blocked: grid.blocked_count() as u32,
                total: grid.cells.len() as u32,
            });
        }
        Ok(grid)
    }

    /// Allocate the grid described by `config` and block
    /// `config.blocked_cells` distinct cells chosen uniformly at random.
    ///
    /// Each draw picks among the cells that are not blocked yet, so no draw
    /// is ever wasted on a repeat.
    pub fn with_random_blocked(
        config: &BoardConfig,
        rng: &mut SimpleRng,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut grid = Self::new(config.width, config.height);
        let mut open: Vec<usize> = (0..grid.cells.len()).collect();
        for _ in 0..config.blocked_cells {
            let pick = rng.next_range(open.len() as u32) as usize;
            let slot = open.swap_remove(pick);
            grid.cells[slot].blocked = true;
        }
        Ok(grid)
    }

    /// Parse the text form printed by [`Display`](fmt::Display).
    ///
    /// Rows are listed top (`y = height - 1`) to bottom. `#` is a blocked
    /// cell, `.` an empty cell, and a base-36 digit a chip of that kind.
    /// Spaces are ignored. Chip ids are assigned in row-major order from the
    /// bottom row.
    pub fn from_rows(rows: &[&str]) -> Result<Self, ConfigError> {
        let parsed: Vec<Vec<char>> = rows
            .iter()
            .map(|row| row.chars().filter(|c| !c.is_whitespace()).collect())
            .collect();

        let height = u16::try_from(parsed.len())
            .map_err(|_| ConfigError::InvalidLayout("too many rows".to_string()))?;
        let width = parsed.first().map_or(0, Vec::len);
        if parsed.iter().any(|row| row.len() != width) {
            return Err(ConfigError::InvalidLayout(
                "rows have different lengths".to_string(),
            ));
        }
        let width = u16::try_from(width)
            .map_err(|_| ConfigError::InvalidLayout("row too long".to_string()))?;

        let mut grid = Self::new(width, height);
        for (row_from_top, row) in parsed.iter().enumerate() {
            let y = height - 1 - row_from_top as u16;
            for (x, &c) in row.iter().enumerate() {
                let index = BoardIndex::new(x as u16, y);
                let slot = grid.slot(index).unwrap_or_default();
                match c {
                    '#' => grid.cells[slot].blocked = true,
                    '.' => {}
                    _ => {
                        let kind = c.to_digit(36).ok_or_else(|| {
                            ConfigError::InvalidLayout(format!("unexpected '{c}' at {index}"))
                        })?;
                        grid.cells[slot].chip = Some(Chip {
                            id: ChipId(0),
                            kind: kind as ChipKindId,
                        });
                    }
                }
            }
        }

        let mut id = 0u32;
        for cell in grid.cells.iter_mut() {
            if let Some(chip) = cell.chip.as_mut() {
                chip.id = ChipId(id);
                id += 1;
            }
        }

        Ok(grid)
    }

    /// Calculate flat index from a board index
    #[inline]
    fn slot(&self, index: BoardIndex) -> Option<usize> {
        if index.x >= self.width || index.y >= self.height {
            return None;
        }
        Some(usize::from(index.y) * usize::from(self.width) + usize::from(index.x))
    }

    fn slot_or_panic(&self, index: BoardIndex) -> usize {
        match self.slot(index) {
            Some(slot) => slot,
            None => panic!(
                "{index} is outside the {}x{} grid",
                self.width, self.height
            ),
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn contains(&self, index: BoardIndex) -> bool {
        self.slot(index).is_some()
    }

    pub fn cell(&self, index: BoardIndex) -> Option<&Cell> {
        self.slot(index).map(|slot| &self.cells[slot])
    }

    /// All cells, row-major from the bottom row
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn chip(&self, index: BoardIndex) -> Option<Chip> {
        self.cell(index).and_then(Cell::chip)
    }

    pub fn kind(&self, index: BoardIndex) -> Option<ChipKindId> {
        self.cell(index).and_then(Cell::kind)
    }

    /// True for blocked cells; false for open cells and out-of-range indices
    pub fn is_blocked(&self, index: BoardIndex) -> bool {
        self.cell(index).is_some_and(Cell::is_blocked)
    }

    pub fn blocked_count(&self) -> usize {
        self.cells.iter().filter(|c| c.blocked).count()
    }

    pub fn chip_count(&self) -> usize {
        self.cells.iter().filter(|c| c.chip.is_some()).count()
    }

    /// Open cells currently holding no chip
    pub fn vacant_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_vacant()).count()
    }

    /// Number of chips destroyed through [`Grid::remove_chip`]
    pub fn chips_destroyed(&self) -> u32 {
        self.chips_destroyed
    }

    /// Highest chip id on the board
    pub fn max_chip_id(&self) -> Option<ChipId> {
        self.cells.iter().filter_map(|c| c.chip.map(|chip| chip.id)).max()
    }

    /// Put `chip` into an open, empty cell.
    ///
    /// # Panics
    ///
    /// If the cell is blocked, already occupied, or out of range.
    pub fn place_chip(&mut self, index: BoardIndex, chip: Chip) {
        let slot = self.slot_or_panic(index);
        let cell = &mut self.cells[slot];
        assert!(!cell.blocked, "cannot place a chip on blocked cell {index}");
        assert!(
            cell.chip.is_none(),
            "cannot place a chip on occupied cell {index}"
        );
        cell.chip = Some(chip);
    }

    /// Take the chip out of a cell and destroy it.
    ///
    /// The returned chip is only a record of what was destroyed.
    ///
    /// # Panics
    ///
    /// If the cell holds no chip.
    pub fn remove_chip(&mut self, index: BoardIndex) -> Chip {
        let chip = self.detach(index, "remove");
        self.chips_destroyed += 1;
        tracing::trace!(at = %index, chip = chip.id.0, "chip destroyed");
        chip
    }

    /// Detach the chip from a cell without destroying it, for relocation.
    ///
    /// # Panics
    ///
    /// If the cell holds no chip.
    pub fn clear_chip(&mut self, index: BoardIndex) -> Chip {
        self.detach(index, "clear")
    }

    fn detach(&mut self, index: BoardIndex, op: &str) -> Chip {
        let slot = self.slot_or_panic(index);
        match self.cells[slot].chip.take() {
            Some(chip) => chip,
            None => panic!("cannot {op} chip: cell {index} is empty"),
        }
    }

    /// Relocate the chip at `from` into the empty cell `to`
    pub fn move_chip(&mut self, from: BoardIndex, to: BoardIndex) -> ChipMove {
        let chip = self.clear_chip(from);
        self.place_chip(to, chip);
        ChipMove { chip, from, to }
    }

    /// Exchange the chips of two cells. Pure data operation: adjacency is not checked.
    ///
    /// # Panics
    ///
    /// If either cell is blocked, empty, or out of range.
    pub fn swap_chips(&mut self, a: BoardIndex, b: BoardIndex) {
        let sa = self.slot_or_panic(a);
        let sb = self.slot_or_panic(b);
        assert!(
            self.cells[sa].chip.is_some() && self.cells[sb].chip.is_some(),
            "cannot swap {a} and {b}: both cells must hold a chip"
        );
        let chip_a = self.cells[sa].chip.take();
        self.cells[sa].chip = self.cells[sb].chip.take();
        self.cells[sb].chip = chip_a;
    }

    /// True iff both indices are on the grid and differ by one step along one axis
    pub fn are_adjacent(&self, a: BoardIndex, b: BoardIndex) -> bool {
        self.contains(a) && self.contains(b) && a.is_adjacent(b)
    }

    /// Set or clear the selection mark of a cell. Out-of-range indices are ignored.
    pub fn set_selected(&mut self, index: BoardIndex, selected: bool) {
        if let Some(slot) = self.slot(index) {
            self.cells[slot].selected = selected;
        }
    }

    /// Kind shared by the two cells at `first` and `second`, if both hold one
    fn pair_kind(
        &self,
        first: Option<BoardIndex>,
        second: Option<BoardIndex>,
    ) -> Option<ChipKindId> {
        let a = self.kind(first?)?;
        let b = self.kind(second?)?;
        (a == b).then_some(a)
    }

    /// Populate every empty open cell so that no run of three exists.
    ///
    /// Cells are filled column by column, bottom to top, so the two cells to
    /// the left and the two cells below are always settled. A new chip never
    /// takes the kind shared by either settled pair.
    pub fn fill(&mut self, generator: &mut ChipGenerator) {
        for x in 0..self.width {
            for y in 0..self.height {
                let index = BoardIndex::new(x, y);
                if !self.cell(index).is_some_and(Cell::is_vacant) {
                    continue;
                }

                let mut excluded = Exclusions::new();
                if let Some(kind) = self.pair_kind(index.offset(-1, 0), index.offset(-2, 0)) {
                    excluded.push(kind);
                }
                if let Some(kind) = self.pair_kind(index.offset(0, -1), index.offset(0, -2)) {
                    if !excluded.contains(&kind) {
                        excluded.push(kind);
                    }
                }

                let chip = generator.generate_excluding(&excluded);
                self.place_chip(index, chip);
            }
        }
    }

    /// Indices of one column, bottom to top
    pub fn column(&self, x: u16) -> impl Iterator<Item = BoardIndex> {
        (0..self.height).map(move |y| BoardIndex::new(x, y))
    }

    /// Indices of one row, left to right
    pub fn row(&self, y: u16) -> impl Iterator<Item = BoardIndex> {
        (0..self.width).map(move |x| BoardIndex::new(x, y))
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                let cell = &self.cells[usize::from(y) * usize::from(self.width) + usize::from(x)];
                let c = if cell.blocked {
                    '#'
                } else {
                    match cell.chip {
                        Some(chip) => char::from_digit(u32::from(chip.kind), 36).unwrap_or('?'),
                        None => '.',
                    }
                };
                write!(f, "{c}")?;
            }
            if y > 0 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
