//! Headless tile match runner (default binary).
//!
//! Builds a board from a seed, plays random committing swaps, and prints
//! every board event as a JSON line on stdout followed by a summary line.
//! Logs go to stderr; set `RUST_LOG` to change the level.
//!
//! ```text
//! tile-match [--seed N] [--moves N] [--config board.json]
//! ```

use std::io::{self, Write};

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tile_match::autoplay::{autoplay, load_board_config, parse_run_args};
use tile_match::core::Board;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let run = parse_run_args(&args)?;
    let config = load_board_config(run.config_path.as_deref())?;

    let mut board = Board::new(config, run.seed)?;
    info!(seed = run.seed, "board ready\n{}", board.grid());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = autoplay(&mut board, run.moves, &mut out)?;
    serde_json::to_writer(&mut out, &summary)?;
    writeln!(out)?;

    info!(
        moves = summary.moves_played,
        score = summary.score,
        stuck = summary.stuck,
        "finished\n{}",
        board.grid()
    );
    Ok(())
}
