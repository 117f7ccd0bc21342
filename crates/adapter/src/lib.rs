//! Adapter module - drives a board from async input and animation collaborators
//!
//! The core board is synchronous and never waits. A frontend, however, wants
//! to show each cascade phase before the next one reads the grid. This crate
//! puts a [`Session`] between the two:
//!
//! 1. **Clicks** arrive on an mpsc channel and are fed to the board in order.
//! 2. **Events** emitted by the board are forwarded on an unbounded channel.
//! 3. **Animations**: after a committed swap and after every cascade phase the
//!    session sends an [`AnimationRequest`] and suspends until the animator
//!    completes it. Without an animator the suspension is a plain yield. An
//!    animator that misses `animation_timeout` is detached and the cascade
//!    carries on headless.
//!
//! Swap reverts are sent fire-and-continue: the board has already put the
//! chips back, the animation only depicts the round trip.
//!
//! Clicks that arrive during a cascade still reach the board, which ignores
//! them while it is resolving.
//!
//! # Synchronous callers
//!
//! [`SessionHandle`] owns a tokio runtime and runs the session on it, so a
//! plain loop can push clicks and poll events.
//!
//! # Environment Variables
//!
//! - `TILE_MATCH_SETTLE_MS`: extra delay after each cascade phase (default: none)
//! - `TILE_MATCH_ANIMATION_TIMEOUT_MS`: how long to wait for an animator (default: 5000)

pub mod animation;
pub mod session;

pub use tile_match_core as core;
pub use tile_match_types as types;

pub use animation::{AnimationKind, AnimationRequest, ChipTween};
pub use session::{Session, SessionConfig, SessionHandle};
