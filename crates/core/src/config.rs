//! Board configuration - read-only parameters supplied once at construction

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{
    BoardIndex, ChipKindId, DEFAULT_BLOCKED_CELLS, DEFAULT_CELL_PITCH, DEFAULT_CHIP_KIND_NAMES,
    DEFAULT_HEIGHT, DEFAULT_SPAWN_ORIGIN, DEFAULT_WIDTH, MAX_CHIP_KINDS, MIN_CHIP_KINDS,
};

/// Reasons a board must not be built
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board dimensions must be non-zero (got {width}x{height})")]
    EmptyBoard { width: u16, height: u16 },
    #[error("{blocked} blocked cells leave no room on a board of {total} cells")]
    TooManyBlockedCells { blocked: u32, total: u32 },
    #[error("at least 3 chip kinds are required (got {count})")]
    TooFewChipKinds { count: usize },
    #[error("at most 254 chip kinds are supported (got {count})")]
    TooManyChipKinds { count: usize },
    #[error("chip kind ids must be 0..N in order: expected {expected}, found {found}")]
    ChipKindIdOutOfOrder { expected: usize, found: ChipKindId },
    #[error("grid is {actual_width}x{actual_height} but configuration says {width}x{height}")]
    DimensionMismatch {
        width: u16,
        height: u16,
        actual_width: u16,
        actual_height: u16,
    },
    #[error("invalid board layout: {0}")]
    InvalidLayout(String),
}

/// One configured chip kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipKindConfig {
    pub id: ChipKindId,
    pub name: String,
}

/// Board dimensions, blocked cell count, chip kinds and world placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: u16,
    pub height: u16,
    pub blocked_cells: u16,
    pub chip_kinds: Vec<ChipKindConfig>,
    /// World position of cell (0, 0)
    pub spawn_origin: [f32; 2],
    /// Distance between neighbouring cell centres
    pub cell_pitch: [f32; 2],
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            blocked_cells: DEFAULT_BLOCKED_CELLS,
            chip_kinds: DEFAULT_CHIP_KIND_NAMES
                .iter()
                .enumerate()
                .map(|(id, name)| ChipKindConfig {
                    id: id as ChipKindId,
                    name: (*name).to_string(),
                })
                .collect(),
            spawn_origin: DEFAULT_SPAWN_ORIGIN,
            cell_pitch: DEFAULT_CELL_PITCH,
        }
    }
}

impl BoardConfig {
    /// Defaults overlaid with environment variables
    ///
    /// - `TILE_MATCH_WIDTH`, `TILE_MATCH_HEIGHT`: board dimensions
    /// - `TILE_MATCH_BLOCKED`: number of blocked cells
    ///
    /// Unparsable values fall back to the default.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let width = env::var("TILE_MATCH_WIDTH")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.width);
        let height = env::var("TILE_MATCH_HEIGHT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.height);
        let blocked_cells = env::var("TILE_MATCH_BLOCKED")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.blocked_cells);

        Self {
            width,
            height,
            blocked_cells,
            ..defaults
        }
    }

    /// Board with the given shape and `kinds` anonymous chip kinds named by id
    pub fn with_dimensions(width: u16, height: u16, blocked_cells: u16, kinds: u8) -> Self {
        Self {
            width,
            height,
            blocked_cells,
            chip_kinds: (0..kinds)
                .map(|id| ChipKindConfig {
                    id,
                    name: format!("kind-{id}"),
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn total_cells(&self) -> u32 {
        u32::from(self.width) * u32::from(self.height)
    }

    /// Kind ids in configured order
    pub fn kind_ids(&self) -> Vec<ChipKindId> {
        self.chip_kinds.iter().map(|k| k.id).collect()
    }

    pub fn kind_name(&self, kind: ChipKindId) -> Option<&str> {
        self.chip_kinds
            .get(kind as usize)
            .map(|k| k.name.as_str())
    }

    /// Check every constraint a buildable board needs
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyBoard {
                width: self.width,
                height: self.height,
            });
        }

        let total = self.total_cells();
        if u32::from(self.blocked_cells) >= total {
            return Err(ConfigError::TooManyBlockedCells {
                blocked: u32::from(self.blocked_cells),
                total,
            });
        }

        if self.chip_kinds.len() < MIN_CHIP_KINDS {
            return Err(ConfigError::TooFewChipKinds {
                count: self.chip_kinds.len(),
            });
        }

        if self.chip_kinds.len() > MAX_CHIP_KINDS {
            return Err(ConfigError::TooManyChipKinds {
                count: self.chip_kinds.len(),
            });
        }

        for (expected, kind) in self.chip_kinds.iter().enumerate() {
            if kind.id as usize != expected {
                return Err(ConfigError::ChipKindIdOutOfOrder {
                    expected,
                    found: kind.id,
                });
            }
        }

        Ok(())
    }

    /// World position of a cell centre: `spawn_origin + cell_pitch * (x, y)`
    pub fn cell_position(&self, index: BoardIndex) -> [f32; 2] {
        [
            self.spawn_origin[0] + self.cell_pitch[0] * f32::from(index.x),
            self.spawn_origin[1] + self.cell_pitch[1] * f32::from(index.y),
        ]
    }
}
