//! Session runtime: clicks in, events and animation requests out.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::animation::{AnimationKind, AnimationRequest};
use crate::core::{Board, ClickOutcome, SwapOutcome};
use crate::types::{BoardEvent, BoardIndex};

/// Session timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Extra pause after each cascade phase
    pub settle: Option<Duration>,
    /// Upper bound on waiting for one animation
    pub animation_timeout: Duration,
    /// Capacity of the click channel used by [`SessionHandle`]
    pub max_pending_clicks: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            settle: None,
            animation_timeout: Duration::from_millis(5000),
            max_pending_clicks: 64,
        }
    }
}

impl SessionConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let settle = std::env::var("TILE_MATCH_SETTLE_MS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis);
        let animation_timeout = std::env::var("TILE_MATCH_ANIMATION_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.animation_timeout);

        Self {
            settle,
            animation_timeout,
            ..defaults
        }
    }
}

/// Drives one board until the click channel closes
pub struct Session {
    board: Board,
    config: SessionConfig,
    clicks: mpsc::Receiver<BoardIndex>,
    events: mpsc::UnboundedSender<BoardEvent>,
    animator: Option<mpsc::Sender<AnimationRequest>>,
}

impl Session {
    pub fn new(
        board: Board,
        config: SessionConfig,
        clicks: mpsc::Receiver<BoardIndex>,
        events: mpsc::UnboundedSender<BoardEvent>,
    ) -> Self {
        Self {
            board,
            config,
            clicks,
            events,
            animator: None,
        }
    }

    /// Send animation requests to `animator` and wait for them
    pub fn with_animator(mut self, animator: mpsc::Sender<AnimationRequest>) -> Self {
        self.animator = Some(animator);
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Process clicks until every sender is gone, then hand the board back.
    ///
    /// An animator that takes longer than `animation_timeout` is detached;
    /// the board keeps resolving without it.
    pub async fn run(mut self) -> Result<Board> {
        while let Some(index) = self.clicks.recv().await {
            self.click(index).await?;
        }
        debug!("click channel closed, session finished");
        Ok(self.board)
    }

    async fn click(&mut self, index: BoardIndex) -> Result<()> {
        let outcome = self.board.handle_click(index);
        self.forward_events();

        let ClickOutcome::Swapped { a, b, outcome } = outcome else {
            return Ok(());
        };
        match outcome {
            SwapOutcome::Committed => {
                self.play_swap(AnimationKind::Swap, a, b).await?;
                self.drive_cascade().await
            }
            SwapOutcome::Reverted => self.play_swap(AnimationKind::SwapRevert, a, b).await,
            SwapOutcome::Rejected(_) => Ok(()),
        }
    }

    async fn drive_cascade(&mut self) -> Result<()> {
        while self.board.is_resolving() {
            self.feed_pending_clicks();

            let Some(step) = self.board.step_cascade() else {
                break;
            };
            self.forward_events();

            match AnimationRequest::for_step(self.board.config(), &step) {
                Some(request) => self.play(request).await?,
                None => tokio::task::yield_now().await,
            }
            if let Some(settle) = self.config.settle {
                tokio::time::sleep(settle).await;
            }
        }
        Ok(())
    }

    /// Clicks that arrived mid-cascade; the board ignores them while resolving.
    fn feed_pending_clicks(&mut self) {
        while let Ok(index) = self.clicks.try_recv() {
            let outcome = self.board.handle_click(index);
            debug!(at = %index, ?outcome, "click during cascade");
        }
    }

    async fn play_swap(&mut self, kind: AnimationKind, a: BoardIndex, b: BoardIndex) -> Result<()> {
        let grid = self.board.grid();
        let (Some(chip_a), Some(chip_b)) = (grid.chip(a), grid.chip(b)) else {
            return Ok(());
        };
        let request = AnimationRequest::swap(self.board.config(), kind, (a, chip_a), (b, chip_b));
        match kind {
            AnimationKind::SwapRevert => {
                self.post(request);
                Ok(())
            }
            _ => self.play(request).await,
        }
    }

    /// Fire-and-continue
    fn post(&self, request: AnimationRequest) {
        if let Some(animator) = &self.animator {
            if animator.try_send(request).is_err() {
                warn!("animator busy or gone, dropping revert animation");
            }
        }
    }

    /// Send `request` and suspend until the animator completes it.
    ///
    /// The send and the wait share one `animation_timeout`. An animator that
    /// misses it is dropped and the session carries on headless, so a cascade
    /// that has started always reaches its fixpoint.
    async fn play(&mut self, mut request: AnimationRequest) -> Result<()> {
        let Some(animator) = self.animator.clone() else {
            tokio::task::yield_now().await;
            return Ok(());
        };

        let kind = request.kind;
        let pass = request.pass;
        let (done_tx, done_rx) = oneshot::channel();
        request.done = Some(done_tx);

        let delivered = async move {
            animator.send(request).await.map_err(|_| ())?;
            // A dropped `done` sender counts as completed.
            let _ = done_rx.await;
            Ok::<(), ()>(())
        };

        match tokio::time::timeout(self.config.animation_timeout, delivered).await {
            Ok(Ok(())) => {}
            Ok(Err(())) => {
                warn!("animator gone, continuing headless");
                self.animator = None;
            }
            Err(_) => {
                warn!(
                    kind = kind.as_str(),
                    pass,
                    timeout = ?self.config.animation_timeout,
                    "animation not completed in time, continuing headless"
                );
                self.animator = None;
            }
        }
        Ok(())
    }

    fn forward_events(&mut self) {
        for event in self.board.take_events() {
            let _ = self.events.send(event);
        }
    }
}

/// Running session for synchronous callers.
pub struct SessionHandle {
    rt: Runtime,
    clicks: mpsc::Sender<BoardIndex>,
    events: mpsc::UnboundedReceiver<BoardEvent>,
    task: JoinHandle<Result<Board>>,
}

impl SessionHandle {
    /// Start a headless session on its own runtime.
    pub fn start(board: Board, config: SessionConfig) -> Result<Self> {
        let (click_tx, click_rx) = mpsc::channel(config.max_pending_clicks.max(1));
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let rt = Runtime::new().context("failed to create tokio runtime")?;
        let session = Session::new(board, config, click_rx, event_tx);
        let task = rt.spawn(session.run());

        Ok(Self {
            rt,
            clicks: click_tx,
            events: event_rx,
            task,
        })
    }

    /// Queue a click, waiting for room in the channel.
    pub fn click(&self, index: BoardIndex) -> Result<()> {
        self.clicks
            .blocking_send(index)
            .map_err(|_| anyhow!("session stopped, click at {index} dropped"))
    }

    pub fn try_recv(&mut self) -> Option<BoardEvent> {
        self.events.try_recv().ok()
    }

    /// Close the click channel, wait for the session and return its board
    /// together with every event not received yet.
    pub fn finish(self) -> Result<(Board, Vec<BoardEvent>)> {
        let Self {
            rt,
            clicks,
            mut events,
            task,
        } = self;
        drop(clicks);

        let board = rt.block_on(task).context("session task panicked")??;
        let mut rest = Vec::new();
        while let Ok(event) = events.try_recv() {
            rest.push(event);
        }
        Ok((board, rest))
    }
}
