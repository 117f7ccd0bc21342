//! Tile match (workspace facade crate).
//!
//! Re-exports the board engine under `tile_match::{core,adapter,types}` while
//! the implementation lives in dedicated crates under `crates/`. The
//! [`autoplay`] module backs the headless runner binary.

pub mod autoplay;

pub use tile_match_adapter as adapter;
pub use tile_match_core as core;
pub use tile_match_types as types;
