use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::core::{Board, BoardConfig, BoardSnapshot, ScoreSystem, SimpleRng};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub seed: u32,
    pub config_path: Option<PathBuf>,
    pub moves: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            config_path: None,
            moves: 20,
        }
    }
}

/// Final line printed by the runner
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub seed: u32,
    pub moves_played: u32,
    pub score: u32,
    pub runs: u32,
    /// The board ran out of committing swaps before `moves` were played
    pub stuck: bool,
    pub board: BoardSnapshot,
}

pub fn parse_run_args(args: &[String]) -> Result<RunConfig> {
    let mut config = RunConfig::default();
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --seed"))?;
                config.seed = v
                    .parse::<u32>()
                    .map_err(|_| anyhow!("invalid --seed value: {}", v))?;
            }
            "--moves" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --moves"))?;
                config.moves = v
                    .parse::<u32>()
                    .map_err(|_| anyhow!("invalid --moves value: {}", v))?;
            }
            "--config" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --config"))?;
                config.config_path = Some(PathBuf::from(v));
            }
            other => {
                return Err(anyhow!("unknown argument: {}", other));
            }
        }
        i += 1;
    }
    Ok(config)
}

/// Board configuration from a JSON file, or from the environment when no
/// path is given. Missing JSON fields take their default.
pub fn load_board_config(path: Option<&Path>) -> Result<BoardConfig> {
    let config = match path {
        None => BoardConfig::from_env(),
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading board config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing board config {}", path.display()))?
        }
    };
    config.validate()?;
    Ok(config)
}

/// Play up to `moves` committing swaps picked at random from the board's
/// hints, writing every board event to `out` as one JSON object per line.
pub fn autoplay<W: Write>(board: &mut Board, moves: u32, out: &mut W) -> Result<RunSummary> {
    let mut picker = SimpleRng::new(board.seed().rotate_left(16) ^ 0x5bd1_e995);
    let mut score = ScoreSystem::new();
    let mut played = 0u32;
    let mut stuck = false;

    // Board construction emits nothing, but a caller may have clicked already.
    write_events(board, &mut score, out)?;

    while played < moves {
        let swaps = board.valid_swaps();
        if swaps.is_empty() {
            info!(played, "no committing swap left");
            stuck = true;
            break;
        }
        let (a, b) = swaps[picker.next_range(swaps.len() as u32) as usize];
        debug!(a = %a, b = %b, options = swaps.len(), "playing swap");

        board.on_cell_clicked(a);
        board.on_cell_clicked(b);
        write_events(board, &mut score, out)?;
        played += 1;
    }

    Ok(RunSummary {
        seed: board.seed(),
        moves_played: played,
        score: score.score(),
        runs: score.runs(),
        stuck,
        board: board.snapshot(),
    })
}

fn write_events<W: Write>(board: &mut Board, score: &mut ScoreSystem, out: &mut W) -> Result<()> {
    for event in board.take_events() {
        score.observe(&event);
        serde_json::to_writer(&mut *out, &event)?;
        writeln!(out)?;
    }
    Ok(())
}
