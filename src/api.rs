// Public control API for the host UI layer
//
// This module exposes the imperative controls and the phase-change stream
// consumed by the surrounding application. All calls are synchronous; the
// scheduler runs on its own background runtime inside the shared handle.

use once_cell::sync::Lazy;

use crate::catalog::{CadencePreset, GameMode};
use crate::error::CadenceError;
use crate::phase::Phase;
use crate::trainer::TrainerHandle;

// Re-export error code constants for the UI layer
pub use crate::error::{AudioErrorCodes, CadenceErrorCodes};

/// Global TrainerHandle instance
///
/// Single container for the cadence engine state: active mode/preset,
/// scheduler session, and the shared tone output bus.
static TRAINER: Lazy<TrainerHandle> = Lazy::new(TrainerHandle::new);

/// Get the version of the cadence engine
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Switch game mode
///
/// Halts any in-flight cadence and selects the mode's default preset.
/// Playback does not restart automatically.
pub fn select_mode(mode: GameMode) -> Result<(), CadenceError> {
    TRAINER.select_mode(mode)
}

/// Switch the active cadence preset
///
/// Rejects presets with a zero frame count; halts any in-flight cadence.
pub fn select_preset(preset: CadencePreset) -> Result<(), CadenceError> {
    TRAINER.select_preset(preset)
}

/// Start looping the active preset's cadence
///
/// No-op when already running.
pub fn start() -> Result<(), CadenceError> {
    TRAINER.start()
}

/// Stop the cadence loop and reset the phase to Idle
///
/// Safe to call while idle; idempotent.
pub fn stop() {
    TRAINER.stop()
}

/// Whether the cadence loop is currently running
pub fn is_running() -> bool {
    TRAINER.is_running()
}

/// The cue that fired most recently
pub fn current_phase() -> Phase {
    TRAINER.current_phase()
}

/// Currently selected game mode
pub fn current_mode() -> Result<GameMode, CadenceError> {
    TRAINER.current_mode()
}

/// Currently active preset
pub fn current_preset() -> Result<CadencePreset, CadenceError> {
    TRAINER.current_preset()
}

/// Stream of phase transitions for visual sync
///
/// Yields every transition from subscription time onward until the engine
/// shuts down.
pub fn phase_stream() -> impl futures::Stream<Item = Phase> {
    TRAINER.phase_stream()
}
