//! Move search: which adjacent swaps would commit

use crate::grid::Grid;
use crate::matcher::has_run_through;
use crate::types::BoardIndex;

/// True if swapping the chips at `a` and `b` would form a run through either cell.
///
/// False when the cells are not adjacent or either one holds no chip.
pub fn swap_would_match(grid: &Grid, a: BoardIndex, b: BoardIndex) -> bool {
    if !grid.are_adjacent(a, b) || grid.chip(a).is_none() || grid.chip(b).is_none() {
        return false;
    }
    let mut scratch = grid.clone();
    trial_swap(&mut scratch, a, b)
}

fn trial_swap(scratch: &mut Grid, a: BoardIndex, b: BoardIndex) -> bool {
    scratch.swap_chips(a, b);
    let hit = has_run_through(scratch, a) || has_run_through(scratch, b);
    scratch.swap_chips(a, b);
    hit
}

/// Every committing swap, each pair once (right and up neighbours), bottom row first
pub fn valid_swaps(grid: &Grid) -> Vec<(BoardIndex, BoardIndex)> {
    let mut scratch = grid.clone();
    let mut swaps = Vec::new();
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let a = BoardIndex::new(x, y);
            if grid.chip(a).is_none() {
                continue;
            }
            for b in [a.offset(1, 0), a.offset(0, 1)].into_iter().flatten() {
                if grid.chip(b).is_some() && trial_swap(&mut scratch, a, b) {
                    swaps.push((a, b));
                }
            }
        }
    }
    swaps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_move_found() {
        let grid = Grid::from_rows(&["3030", "0303", "1121"]).unwrap();
        let swaps = valid_swaps(&grid);
        assert!(swaps.contains(&(BoardIndex::new(2, 0), BoardIndex::new(3, 0))));
        assert!(swap_would_match(&grid, BoardIndex::new(3, 0), BoardIndex::new(2, 0)));
    }

    #[test]
    fn test_no_moves_on_stripes() {
        let grid = Grid::from_rows(&["012", "120", "201"]).unwrap();
        assert!(valid_swaps(&grid).is_empty());
    }

    #[test]
    fn test_search_leaves_grid_untouched() {
        let grid = Grid::from_rows(&["3030", "0303", "1121"]).unwrap();
        let before = grid.clone();
        valid_swaps(&grid);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_rejects_blocked_and_far_cells() {
        let grid = Grid::from_rows(&["0#0", "110"]).unwrap();
        assert!(!swap_would_match(&grid, BoardIndex::new(1, 1), BoardIndex::new(2, 1)));
        assert!(!swap_would_match(&grid, BoardIndex::new(0, 0), BoardIndex::new(2, 0)));
    }
}
