//! TrainerHandle: cadence orchestration layer
//!
//! Consolidates the mode/preset selection, the cadence scheduler, and the
//! tone output bus behind one handle shared by the API surface and the CLI
//! driver. The handle owns a dedicated single-thread Tokio runtime for the
//! scheduler so every control call stays synchronous for the host UI.

use std::sync::{Arc, RwLock};

use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::audio::{CpalToneSink, ToneSink};
use crate::catalog::{self, CadencePreset, GameMode};
use crate::config::TrainerConfig;
use crate::error::{log_cadence_error, CadenceError};
use crate::phase::Phase;
use crate::scheduler::CadenceScheduler;

/// TrainerHandle orchestrates the cadence engine and the active selection.
///
/// Changing the mode or preset always halts any in-flight cadence before
/// applying the new timing; playback never auto-restarts - the caller must
/// call [TrainerHandle::start] again.
pub struct TrainerHandle {
    scheduler: CadenceScheduler,
    mode: RwLock<GameMode>,
    preset: RwLock<CadencePreset>,
}

impl TrainerHandle {
    /// Create a handle with the default configuration and the real cpal
    /// tone output.
    pub fn new() -> Self {
        Self::with_config(TrainerConfig::load())
    }

    /// Create a handle with an explicit configuration and the real cpal
    /// tone output.
    pub fn with_config(config: TrainerConfig) -> Self {
        let sink: Arc<dyn ToneSink> = Arc::new(CpalToneSink::new(config.tone.master_gain));
        let runtime = spawn_scheduler_runtime();
        Self::with_parts(config, sink, runtime)
    }

    /// Create a handle with injected tone output and runtime.
    ///
    /// Used by tests to substitute a recording sink and drive the scheduler
    /// on a virtual clock.
    pub fn with_parts(config: TrainerConfig, sink: Arc<dyn ToneSink>, runtime: Handle) -> Self {
        let mode = GameMode::LongGame;
        Self {
            scheduler: CadenceScheduler::new(config.timing, config.tone, sink, runtime),
            mode: RwLock::new(mode),
            preset: RwLock::new(catalog::default_preset_for(mode)),
        }
    }

    // ========================================================================
    // LOCK HELPER METHODS
    // Safe lock acquisition with typed error handling (no unwrap/expect)
    // ========================================================================

    fn read_mode(&self) -> Result<std::sync::RwLockReadGuard<'_, GameMode>, CadenceError> {
        self.mode.read().map_err(|_| CadenceError::LockPoisoned {
            component: "trainer_mode".to_string(),
        })
    }

    fn write_mode(&self) -> Result<std::sync::RwLockWriteGuard<'_, GameMode>, CadenceError> {
        self.mode.write().map_err(|_| CadenceError::LockPoisoned {
            component: "trainer_mode".to_string(),
        })
    }

    fn read_preset(&self) -> Result<std::sync::RwLockReadGuard<'_, CadencePreset>, CadenceError> {
        self.preset.read().map_err(|_| CadenceError::LockPoisoned {
            component: "trainer_preset".to_string(),
        })
    }

    fn write_preset(&self) -> Result<std::sync::RwLockWriteGuard<'_, CadencePreset>, CadenceError> {
        self.preset.write().map_err(|_| CadenceError::LockPoisoned {
            component: "trainer_preset".to_string(),
        })
    }

    // ========================================================================
    // CONTROL API
    // ========================================================================

    /// Switch game mode.
    ///
    /// Halts any in-flight cadence, then selects the mode's default preset.
    /// Does not restart playback.
    pub fn select_mode(&self, mode: GameMode) -> Result<(), CadenceError> {
        self.scheduler.stop();
        *self.write_mode().map_err(|err| {
            log_cadence_error(&err, "select_mode");
            err
        })? = mode;
        *self.write_preset().map_err(|err| {
            log_cadence_error(&err, "select_mode");
            err
        })? = catalog::default_preset_for(mode);
        log::info!("[TrainerHandle] mode changed to {:?}", mode);
        Ok(())
    }

    /// Switch the active preset within the current mode.
    ///
    /// Rejects invalid frame counts, halts any in-flight cadence, and does
    /// not restart playback.
    pub fn select_preset(&self, preset: CadencePreset) -> Result<(), CadenceError> {
        preset.validate().map_err(|err| {
            log_cadence_error(&err, "select_preset");
            err
        })?;
        self.scheduler.stop();
        *self.write_preset().map_err(|err| {
            log_cadence_error(&err, "select_preset");
            err
        })? = preset;
        log::info!(
            "[TrainerHandle] preset changed to {}/{} frames",
            preset.backswing_frames,
            preset.downswing_frames
        );
        Ok(())
    }

    /// Start looping the active preset's cadence.
    ///
    /// No-op when already running; at most one cadence loop is ever live.
    pub fn start(&self) -> Result<(), CadenceError> {
        let preset = *self.read_preset().map_err(|err| {
            log_cadence_error(&err, "start");
            err
        })?;
        self.scheduler.start(&preset).map_err(|err| {
            log_cadence_error(&err, "start");
            err
        })
    }

    /// Stop the cadence loop and reset the phase to Idle.
    ///
    /// Safe to call while idle; idempotent.
    pub fn stop(&self) {
        self.scheduler.stop();
    }

    /// Whether the cadence loop is currently running.
    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    // ========================================================================
    // OBSERVATION
    // ========================================================================

    /// Currently selected game mode.
    pub fn current_mode(&self) -> Result<GameMode, CadenceError> {
        Ok(*self.read_mode()?)
    }

    /// Currently active preset.
    pub fn current_preset(&self) -> Result<CadencePreset, CadenceError> {
        Ok(*self.read_preset()?)
    }

    /// The cue that fired most recently.
    pub fn current_phase(&self) -> Phase {
        self.scheduler.current_phase()
    }

    /// Subscribe to raw phase transitions.
    pub fn subscribe_phase(&self) -> broadcast::Receiver<Phase> {
        self.scheduler.subscribe_phase()
    }

    /// Stream of phase transitions for visual sync.
    ///
    /// Yields every transition from subscription time onward. A subscriber
    /// that lags far behind skips missed values rather than ending the
    /// stream.
    pub fn phase_stream(&self) -> impl futures::Stream<Item = Phase> {
        BroadcastStream::new(self.scheduler.subscribe_phase()).filter_map(|result| result.ok())
    }
}

impl Default for TrainerHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn the dedicated scheduler runtime on a background thread.
///
/// The host UI calls the control API from non-async code, so the scheduler
/// gets its own single-thread Tokio runtime kept alive for the lifetime of
/// the process.
fn spawn_scheduler_runtime() -> Handle {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("Failed to create Tokio runtime for cadence scheduler");
    let handle = runtime.handle().clone();

    std::thread::Builder::new()
        .name("cadence-scheduler".to_string())
        .spawn(move || {
            runtime.block_on(std::future::pending::<()>());
        })
        .expect("Failed to spawn cadence scheduler thread");

    handle
}
