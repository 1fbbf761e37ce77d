//! Preset catalog - mode-scoped cadence preset tables
//!
//! Pure, stateless configuration: each game mode owns an ordered list of
//! four presets (fastest to slowest cadence) and a designated default.
//! Frame counts use the fixed 30 fps unit defined in [crate::config].

use crate::error::CadenceError;

/// Game mode selecting which preset table is active.
///
/// Long game swings train at a 3:1 backswing-to-downswing ratio, short game
/// swings at 2:1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    LongGame,
    ShortGame,
}

/// One cadence option: a pair of frame counts plus a display-only ratio
/// annotation. The label is never used for timing math.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CadencePreset {
    pub backswing_frames: u32,
    pub downswing_frames: u32,
    pub ratio_label: &'static str,
}

impl CadencePreset {
    /// Reject presets with a zero frame count.
    ///
    /// Called at `start`/`select_preset` time so the scheduler never enters
    /// its running state with unusable timing input.
    pub fn validate(&self) -> Result<(), CadenceError> {
        if self.backswing_frames == 0 || self.downswing_frames == 0 {
            return Err(CadenceError::FrameCountInvalid {
                backswing: self.backswing_frames,
                downswing: self.downswing_frames,
            });
        }
        Ok(())
    }
}

/// Number of presets per game mode.
pub const PRESETS_PER_MODE: usize = 4;

/// Index of the default preset within each mode's table (second-slowest).
pub const DEFAULT_PRESET_INDEX: usize = 2;

const LONG_GAME_PRESETS: [CadencePreset; PRESETS_PER_MODE] = [
    CadencePreset { backswing_frames: 18, downswing_frames: 6, ratio_label: "3:1" },
    CadencePreset { backswing_frames: 21, downswing_frames: 7, ratio_label: "3:1" },
    CadencePreset { backswing_frames: 24, downswing_frames: 8, ratio_label: "3:1" },
    CadencePreset { backswing_frames: 27, downswing_frames: 9, ratio_label: "3:1" },
];

const SHORT_GAME_PRESETS: [CadencePreset; PRESETS_PER_MODE] = [
    CadencePreset { backswing_frames: 12, downswing_frames: 6, ratio_label: "2:1" },
    CadencePreset { backswing_frames: 14, downswing_frames: 7, ratio_label: "2:1" },
    CadencePreset { backswing_frames: 16, downswing_frames: 8, ratio_label: "2:1" },
    CadencePreset { backswing_frames: 18, downswing_frames: 9, ratio_label: "2:1" },
];

/// Ordered preset table for a mode, fastest cadence first.
pub fn presets_for(mode: GameMode) -> &'static [CadencePreset; PRESETS_PER_MODE] {
    match mode {
        GameMode::LongGame => &LONG_GAME_PRESETS,
        GameMode::ShortGame => &SHORT_GAME_PRESETS,
    }
}

/// Default preset for a mode (neither fastest nor slowest).
pub fn default_preset_for(mode: GameMode) -> CadencePreset {
    presets_for(mode)[DEFAULT_PRESET_INDEX]
}
