//! Board construction and play properties over many seeds

use std::collections::HashSet;

use tile_match::core::{
    find_runs, Board, BoardConfig, CascadeStep, ControllerState, Grid, SwapOutcome,
};
use tile_match::types::BoardIndex;

fn configs() -> Vec<BoardConfig> {
    vec![
        BoardConfig::default(),
        BoardConfig::with_dimensions(8, 8, 5, 3),
        BoardConfig::with_dimensions(5, 9, 0, 5),
        BoardConfig::with_dimensions(3, 3, 8, 3),
        BoardConfig::with_dimensions(1, 7, 2, 3),
    ]
}

fn assert_blocked_cells_empty(grid: &Grid) {
    for cell in grid.cells() {
        if cell.is_blocked() {
            assert!(cell.chip().is_none(), "blocked cell {} holds a chip", cell.index());
        }
    }
}

#[test]
fn test_new_boards_have_no_runs() {
    for config in configs() {
        for seed in 1..200 {
            let board = Board::new(config.clone(), seed).unwrap();
            let grid = board.grid();
            assert!(
                find_runs(grid).is_empty(),
                "seed {} {}x{}:\n{}",
                seed,
                config.width,
                config.height,
                grid
            );
            assert_eq!(grid.blocked_count(), usize::from(config.blocked_cells));
            assert_eq!(grid.vacant_count(), 0);
            assert_blocked_cells_empty(grid);
        }
    }
}

#[test]
fn test_same_seed_same_board() {
    let a = Board::new(BoardConfig::default(), 777).unwrap();
    let b = Board::new(BoardConfig::default(), 777).unwrap();
    assert_eq!(a.grid(), b.grid());
    assert_eq!(a.snapshot().board_hash, b.snapshot().board_hash);
}

#[test]
fn test_play_keeps_invariants() {
    for seed in 1..40 {
        let mut board = Board::new(BoardConfig::default(), seed).unwrap();
        let blocked: Vec<BoardIndex> = board
            .grid()
            .cells()
            .iter()
            .filter(|c| c.is_blocked())
            .map(|c| c.index())
            .collect();

        for _ in 0..10 {
            let Some(&(a, b)) = board.valid_swaps().first() else {
                break;
            };
            board.on_cell_clicked(a);
            board.on_cell_clicked(b);

            let grid = board.grid();
            assert_eq!(board.state(), ControllerState::Idle);
            assert!(find_runs(grid).is_empty(), "seed {}:\n{}", seed, grid);
            assert_eq!(grid.vacant_count(), 0);
            assert_blocked_cells_empty(grid);
            for &index in &blocked {
                assert!(grid.is_blocked(index));
            }

            let ids: HashSet<_> = grid
                .cells()
                .iter()
                .filter_map(|c| c.chip())
                .map(|c| c.id)
                .collect();
            assert_eq!(ids.len(), grid.chip_count(), "chip ids must stay unique");
        }
    }
}

#[test]
fn test_gravity_never_crosses_blocked_cells() {
    for seed in 1..60 {
        let mut board = Board::new(BoardConfig::with_dimensions(6, 8, 6, 4), seed).unwrap();
        let Some(&(a, b)) = board.valid_swaps().first() else {
            continue;
        };
        board.handle_click(a);
        board.handle_click(b);
        assert!(board.is_resolving());

        while let Some(step) = board.step_cascade() {
            let CascadeStep::Compacted { moves, .. } = step else {
                continue;
            };
            for m in moves {
                assert_eq!(m.from.x, m.to.x);
                assert!(m.to.y < m.from.y);
                for y in m.to.y..m.from.y {
                    assert!(!board.grid().is_blocked(BoardIndex::new(m.from.x, y)));
                }
            }
        }
        assert_eq!(board.state(), ControllerState::Idle);
    }
}

#[test]
fn test_cascade_is_idle_at_fixpoint() {
    use tile_match::core::{CascadeResolver, ChipGenerator};

    for seed in 1..30 {
        let mut board = Board::new(BoardConfig::default(), seed).unwrap();
        if let Some(&(a, b)) = board.valid_swaps().first() {
            board.on_cell_clicked(a);
            board.on_cell_clicked(b);
        }

        let mut grid = board.grid().clone();
        let before = grid.clone();
        let mut gen = ChipGenerator::new(board.config().kind_ids(), seed);
        let stats = CascadeResolver::new().run_to_fixpoint(&mut grid, &mut gen);
        assert_eq!(stats.chips_removed, 0);
        assert_eq!(stats.chips_moved, 0);
        assert_eq!(stats.chips_spawned, 0);
        assert_eq!(grid, before);
    }
}

#[test]
fn test_swap_commits_iff_a_run_passes_through_either_cell() {
    for config in configs() {
        for seed in 1..25 {
            let board = Board::new(config.clone(), seed).unwrap();
            let grid = board.grid();
            let (mut committed, mut reverted) = (0usize, 0usize);

            for cell in grid.cells() {
                let a = cell.index();
                for b in [a.offset(1, 0), a.offset(0, 1)].into_iter().flatten() {
                    if grid.chip(a).is_none() || grid.chip(b).is_none() {
                        continue;
                    }

                    let mut swapped = grid.clone();
                    swapped.swap_chips(a, b);
                    let expected = find_runs(&swapped)
                        .iter()
                        .any(|run| run.contains(a) || run.contains(b));

                    let mut trial = board.clone();
                    match trial.try_swap(a, b) {
                        SwapOutcome::Committed => {
                            assert!(expected, "seed {seed}: {a}<->{b} kept without a run");
                            committed += 1;
                        }
                        SwapOutcome::Reverted => {
                            assert!(!expected, "seed {seed}: {a}<->{b} reverted over a run");
                            assert_eq!(trial.grid(), grid);
                            reverted += 1;
                        }
                        other => panic!("seed {seed}: {a}<->{b} gave {other:?}"),
                    }
                }
            }
            assert!(committed + reverted > 0 || grid.chip_count() < 2);
        }
    }
}
