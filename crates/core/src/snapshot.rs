//! Serializable view of a board for observers and tests

use serde::Serialize;

use crate::board::{Board, ControllerState};
use crate::grid::Grid;
use crate::types::{BoardIndex, Chip, ChipKindId};

/// Byte hashed for a blocked cell
pub const HASH_BLOCKED: u8 = 0xFF;
/// Byte hashed for an open cell without a chip
pub const HASH_EMPTY: u8 = 0xFE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CellSnapshot {
    pub x: u16,
    pub y: u16,
    pub blocked: bool,
    pub chip: Option<Chip>,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BoardSnapshot {
    pub width: u16,
    pub height: u16,
    pub seed: u32,
    pub state: ControllerState,
    pub selected: Option<BoardIndex>,
    /// Text rows, top first (same format as the grid's `Display`)
    pub rows: Vec<String>,
    /// Row-major from the bottom row
    pub cells: Vec<CellSnapshot>,
    /// Layout hash: kinds and blocked cells only, chip ids excluded
    pub board_hash: u64,
}

impl BoardSnapshot {
    pub fn capture(board: &Board) -> Self {
        let grid = board.grid();
        let cells = grid
            .cells()
            .iter()
            .map(|cell| CellSnapshot {
                x: cell.index().x,
                y: cell.index().y,
                blocked: cell.is_blocked(),
                chip: cell.chip(),
                selected: cell.is_selected(),
            })
            .collect();

        Self {
            width: grid.width(),
            height: grid.height(),
            seed: board.seed(),
            state: board.state(),
            selected: board.selected(),
            rows: grid.to_string().lines().map(str::to_owned).collect(),
            cells,
            board_hash: board_hash(grid),
        }
    }

    pub fn kind_at(&self, index: BoardIndex) -> Option<ChipKindId> {
        if index.x >= self.width || index.y >= self.height {
            return None;
        }
        let slot = usize::from(index.y) * usize::from(self.width) + usize::from(index.x);
        self.cells[slot].chip.map(|c| c.kind)
    }
}

/// FNV-1a 64-bit.
pub fn fnv1a64(bytes: impl IntoIterator<Item = u8>) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    let mut h = OFFSET_BASIS;
    for b in bytes {
        h ^= u64::from(b);
        h = h.wrapping_mul(PRIME);
    }
    h
}

/// Hash of the board layout, row-major from the bottom row.
///
/// One byte per cell: the chip kind, [`HASH_EMPTY`] or [`HASH_BLOCKED`].
/// Validated configurations never use those two bytes as kind ids.
/// Stable across Rust versions and platforms (no `DefaultHasher`).
pub fn board_hash(grid: &Grid) -> u64 {
    fnv1a64(grid.cells().iter().map(|cell| {
        if cell.is_blocked() {
            HASH_BLOCKED
        } else {
            cell.kind().unwrap_or(HASH_EMPTY)
        }
    }))
}
