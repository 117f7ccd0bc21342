//! Animation requests sent to the presentation layer.

use tokio::sync::oneshot;

use crate::core::{BoardConfig, CascadeStep};
use crate::types::{BoardIndex, Chip, ChipId};

/// What the animator is asked to depict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationKind {
    /// Two chips trade places and stay
    Swap,
    /// Two chips trade places and go back
    SwapRevert,
    /// Chips of removed runs disappear in place
    Destroy,
    /// Chips fall to their new cells
    Fall,
    /// New chips drop in from above the column
    Spawn,
}

impl AnimationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationKind::Swap => "swap",
            AnimationKind::SwapRevert => "swap_revert",
            AnimationKind::Destroy => "destroy",
            AnimationKind::Fall => "fall",
            AnimationKind::Spawn => "spawn",
        }
    }
}

/// One chip moving between two world positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChipTween {
    pub chip: ChipId,
    pub from: [f32; 2],
    pub to: [f32; 2],
}

/// A batch of tweens played together.
///
/// `done` is present when the session waits for completion. Dropping the
/// request without calling [`AnimationRequest::complete`] also releases the
/// session.
#[derive(Debug)]
pub struct AnimationRequest {
    pub kind: AnimationKind,
    /// Cascade pass, 0 for swaps
    pub pass: u32,
    pub tweens: Vec<ChipTween>,
    pub done: Option<oneshot::Sender<()>>,
}

impl AnimationRequest {
    pub fn is_blocking(&self) -> bool {
        self.done.is_some()
    }

    /// Signal that the animation finished.
    pub fn complete(self) {
        if let Some(done) = self.done {
            let _ = done.send(());
        }
    }

    /// Build the request depicting a swap of the chips now at `a` and `b`.
    ///
    /// For a kept swap the chips are looked up after the exchange; for a
    /// reverted one, before (the board has already restored them).
    pub(crate) fn swap(
        config: &BoardConfig,
        kind: AnimationKind,
        a: (BoardIndex, Chip),
        b: (BoardIndex, Chip),
    ) -> Self {
        let pa = config.cell_position(a.0);
        let pb = config.cell_position(b.0);
        let tweens = match kind {
            // Chips sit at their final cells; they came from the other one.
            AnimationKind::Swap => vec![
                ChipTween {
                    chip: a.1.id,
                    from: pb,
                    to: pa,
                },
                ChipTween {
                    chip: b.1.id,
                    from: pa,
                    to: pb,
                },
            ],
            _ => vec![
                ChipTween {
                    chip: a.1.id,
                    from: pa,
                    to: pb,
                },
                ChipTween {
                    chip: b.1.id,
                    from: pb,
                    to: pa,
                },
            ],
        };
        Self {
            kind,
            pass: 0,
            tweens,
            done: None,
        }
    }

    /// Build the request depicting one cascade phase.
    ///
    /// Returns `None` for phases that changed nothing.
    pub(crate) fn for_step(config: &BoardConfig, step: &CascadeStep) -> Option<Self> {
        if step.is_noop() {
            return None;
        }
        let (kind, tweens) = match step {
            CascadeStep::Removed { chips, .. } => (
                AnimationKind::Destroy,
                chips
                    .iter()
                    .map(|&(at, chip)| {
                        let p = config.cell_position(at);
                        ChipTween {
                            chip: chip.id,
                            from: p,
                            to: p,
                        }
                    })
                    .collect(),
            ),
            CascadeStep::Compacted { moves, .. } => (
                AnimationKind::Fall,
                moves
                    .iter()
                    .map(|m| ChipTween {
                        chip: m.chip.id,
                        from: config.cell_position(m.from),
                        to: config.cell_position(m.to),
                    })
                    .collect(),
            ),
            CascadeStep::Refilled { spawned, .. } => (
                AnimationKind::Spawn,
                spawned
                    .iter()
                    .map(|&(at, chip)| ChipTween {
                        chip: chip.id,
                        from: config.cell_position(BoardIndex::new(at.x, config.height)),
                        to: config.cell_position(at),
                    })
                    .collect(),
            ),
        };
        Some(Self {
            kind,
            pass: step.pass(),
            tweens,
            done: None,
        })
    }
}
