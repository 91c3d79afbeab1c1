use cadence_common::BoxError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::logic::GameLogic;
use crate::timestep::FixedTimestep;
use crate::window::Window;

/// Name given to the loop thread in [`ExecutionMode::DedicatedThread`].
pub const GAME_LOOP_THREAD: &str = "game-loop";

/// Granularity of the pacing sleep when vsync is off.
const PACING_SLEEP: Duration = Duration::from_millis(1);

/// Errors that end a run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("window creation failed: {0}")]
    Window(#[source] BoxError),
    #[error("game setup failed: {0}")]
    Setup(#[source] BoxError),
    #[error("update step failed: {0}")]
    Update(#[source] BoxError),
    #[error("render step failed: {0}")]
    Render(#[source] BoxError),
    #[error("frame presentation failed: {0}")]
    Present(#[source] BoxError),
    #[error("engine has already run to completion")]
    AlreadyStopped,
    #[error("failed to spawn game loop thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("game loop thread panicked")]
    ThreadPanicked,
}

/// Where the game loop executes.
///
/// Some windowing systems require the loop on the thread that created the
/// window (macOS only accepts the main thread), so the mode is resolved once
/// at startup instead of being decided inside the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Run on the calling thread.
    Inline,
    /// Run on a dedicated, named thread and join it.
    DedicatedThread,
}

impl ExecutionMode {
    pub fn for_host() -> Self {
        if cfg!(target_os = "macos") {
            Self::Inline
        } else {
            Self::DedicatedThread
        }
    }
}

/// Scheduler lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Constructed, `run` not yet called.
    Idle,
    Running,
    /// Terminal.
    Stopped,
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RunStats {
    pub frames: u64,
    pub updates: u64,
}

/// Fixed-timestep game loop.
///
/// Each iteration samples input once, runs zero or more fixed-size updates to
/// drain the accumulated wall time, renders exactly one frame, presents it,
/// and, without vsync, sleeps until the frame interval has passed.
pub struct GameEngine<W, L, C = SystemClock> {
    config: EngineConfig,
    window: W,
    logic: L,
    clock: C,
    state: LoopState,
    stats: RunStats,
    cleaned_up: bool,
}

impl<W, L> GameEngine<W, L, SystemClock>
where
    W: Window,
    L: GameLogic<W>,
{
    pub fn new(config: EngineConfig, window: W, logic: L) -> Self {
        Self::with_clock(config, window, logic, SystemClock::new())
    }
}

impl<W, L, C> GameEngine<W, L, C>
where
    W: Window,
    L: GameLogic<W>,
    C: Clock,
{
    pub fn with_clock(config: EngineConfig, window: W, logic: L, clock: C) -> Self {
        Self {
            config,
            window,
            logic,
            clock,
            state: LoopState::Idle,
            stats: RunStats::default(),
            cleaned_up: false,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn logic(&self) -> &L {
        &self.logic
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Initialize, loop until the window closes, then clean up.
    ///
    /// Any error from setup or the loop body ends the run; cleanup still runs
    /// before the error is returned.
    pub fn run(&mut self) -> Result<RunStats, EngineError> {
        if self.state != LoopState::Idle {
            return Err(EngineError::AlreadyStopped);
        }
        tracing::info!(
            target_fps = self.config.target_fps,
            target_ups = self.config.target_ups,
            "game loop starting"
        );

        let result = self.init().and_then(|()| self.game_loop());
        if let Err(e) = &result {
            tracing::error!("game loop terminated: {e}");
        }
        self.cleanup();

        tracing::info!(
            frames = self.stats.frames,
            updates = self.stats.updates,
            "game loop stopped"
        );
        result.map(|()| self.stats)
    }

    fn init(&mut self) -> Result<(), EngineError> {
        self.logic
            .init(&mut self.window)
            .map_err(EngineError::Setup)?;
        // Baseline after setup so loading time is not replayed as catch-up.
        self.clock.init();
        Ok(())
    }

    fn game_loop(&mut self) -> Result<(), EngineError> {
        let mut timestep = FixedTimestep::new(self.config.update_interval())
            .with_max_steps(self.config.max_catch_up_steps);
        let interval = timestep.interval().as_secs_f32();
        self.state = LoopState::Running;

        while self.state == LoopState::Running {
            if self.window.should_close() {
                self.state = LoopState::Stopped;
                break;
            }

            timestep.accumulate(self.clock.elapsed_since_last());

            self.window.input_mut().sample();
            self.logic.input(&self.window);

            while timestep.consume_step() {
                self.window.input_mut().begin_update();
                self.logic
                    .update(interval, self.window.input())
                    .map_err(EngineError::Update)?;
                self.stats.updates += 1;
            }
            if timestep.steps_this_frame() > 1 {
                tracing::debug!(steps = timestep.steps_this_frame(), "caught up");
            }

            self.logic
                .render(&mut self.window)
                .map_err(EngineError::Render)?;
            self.window.present().map_err(EngineError::Present)?;
            self.stats.frames += 1;

            if !self.window.vsync_enabled() {
                self.sync();
            }
        }
        Ok(())
    }

    /// Sleep in short slices until one frame interval has passed since the
    /// start of this iteration.
    fn sync(&mut self) {
        let end = self.clock.last_loop_time() + self.config.frame_interval();
        while self.clock.now() < end {
            self.clock.sleep(PACING_SLEEP);
        }
    }

    fn cleanup(&mut self) {
        if self.cleaned_up {
            return;
        }
        self.logic.cleanup();
        self.cleaned_up = true;
        self.state = LoopState::Stopped;
    }
}

/// Create the window and run the game loop according to the configured
/// [`ExecutionMode`].
///
/// The window is built on the thread that runs the loop, so window types
/// need not be `Send`.
pub fn launch<W, L, F>(config: EngineConfig, make_window: F, logic: L) -> Result<RunStats, EngineError>
where
    W: Window + 'static,
    L: GameLogic<W> + Send + 'static,
    F: FnOnce() -> Result<W, BoxError> + Send + 'static,
{
    let mode = config.execution_mode();
    tracing::info!(?mode, "launching game loop");

    let body = move || -> Result<RunStats, EngineError> {
        let window = make_window().map_err(EngineError::Window)?;
        GameEngine::new(config, window, logic).run()
    };

    match mode {
        ExecutionMode::Inline => body(),
        ExecutionMode::DedicatedThread => {
            let handle = std::thread::Builder::new()
                .name(GAME_LOOP_THREAD.into())
                .spawn(body)?;
            handle.join().map_err(|_| EngineError::ThreadPanicked)?
        }
    }
}
