//! Configuration management for timing and tone parameters
//!
//! This module provides runtime configuration loading from JSON files,
//! enabling tuning without recompilation. Timing constants (frame rate,
//! phase-reset pause, inter-repetition gap) and cue tone parameters can
//! be adjusted via the config file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Frames per second used to convert preset frame counts into wall-clock
/// time. "Frames" are a golf-coaching concept borrowed from 30 fps video
/// analysis; this constant is the single source of truth for that
/// conversion, so presets remain comparable across modes.
pub const FRAME_RATE: u32 = 30;

/// Pause between the impact cue and the visual phase reset, in milliseconds.
pub const PHASE_RESET_MS: u64 = 500;

/// Pause between the visual phase reset and the next cycle, in milliseconds.
pub const REPEAT_GAP_MS: u64 = 1500;

/// Complete trainer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    pub timing: TimingConfig,
    pub tone: ToneConfig,
}

/// Cadence timing parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Frames per second for preset frame counts
    pub frame_rate: u32,
    /// Delay from the impact cue to the phase reset, in milliseconds
    pub phase_reset_ms: u64,
    /// Delay from the phase reset to the next cycle start, in milliseconds
    pub repeat_gap_ms: u64,
}

impl TimingConfig {
    /// Convert a preset frame count into a wall-clock duration.
    pub fn frames_to_duration(&self, frames: u32) -> Duration {
        Duration::from_secs_f64(frames as f64 / self.frame_rate as f64)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            frame_rate: FRAME_RATE,
            phase_reset_ms: PHASE_RESET_MS,
            repeat_gap_ms: REPEAT_GAP_MS,
        }
    }
}

/// Cue tone parameters
///
/// The two directional cues (backswing start, top of swing) use sine tones;
/// the impact cue uses a square tone so it is distinguishable by ear.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ToneConfig {
    /// Frequency of the backswing-start cue in Hz
    pub start_frequency_hz: f32,
    /// Frequency of the top-of-swing cue in Hz
    pub top_frequency_hz: f32,
    /// Frequency of the impact cue in Hz
    pub impact_frequency_hz: f32,
    /// Duration of each cue tone in seconds
    pub duration_secs: f32,
    /// Linear gain applied to all cue tones at the output bus
    pub master_gain: f32,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            start_frequency_hz: 660.0,
            top_frequency_hz: 880.0,
            impact_frequency_hz: 1100.0,
            duration_secs: 0.15,
            master_gain: 1.0,
        }
    }
}

impl Default for TrainerConfig {
    /// Default configuration values (fallback if config file not found)
    fn default() -> Self {
        Self {
            timing: TimingConfig::default(),
            tone: ToneConfig::default(),
        }
    }
}

impl TrainerConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// Loaded configuration, or the defaults if the file is missing or the
    /// JSON is invalid (a warning is logged in either case).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        Self::load_from_file("assets/trainer_config.json")
    }
}
