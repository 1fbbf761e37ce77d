// Cadence scheduling error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Cadence error code constants
///
/// Error code range: 2001-2003
pub struct CadenceErrorCodes {}

impl CadenceErrorCodes {
    /// A preset frame count is zero (both must be positive)
    pub const FRAME_COUNT_INVALID: i32 = 2001;

    /// The configured frame rate is zero
    pub const FRAME_RATE_INVALID: i32 = 2002;

    /// Mutex/RwLock was poisoned
    pub const LOCK_POISONED: i32 = 2003;
}

/// Log a cadence error with structured context
pub fn log_cadence_error(err: &CadenceError, context: &str) {
    error!(
        "Cadence error in {}: code={}, component=CadenceScheduler, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Cadence scheduling errors
///
/// Invalid configuration is rejected synchronously at `start`/`select_preset`
/// time; the scheduler never enters its running state with bad timing input.
///
/// Error code range: 2001-2003
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CadenceError {
    /// A preset frame count is zero
    FrameCountInvalid { backswing: u32, downswing: u32 },

    /// The configured frame rate is zero
    FrameRateInvalid { frame_rate: u32 },

    /// Mutex/RwLock was poisoned
    LockPoisoned { component: String },
}

impl ErrorCode for CadenceError {
    fn code(&self) -> i32 {
        match self {
            CadenceError::FrameCountInvalid { .. } => CadenceErrorCodes::FRAME_COUNT_INVALID,
            CadenceError::FrameRateInvalid { .. } => CadenceErrorCodes::FRAME_RATE_INVALID,
            CadenceError::LockPoisoned { .. } => CadenceErrorCodes::LOCK_POISONED,
        }
    }

    fn message(&self) -> String {
        match self {
            CadenceError::FrameCountInvalid {
                backswing,
                downswing,
            } => {
                format!(
                    "Preset frame counts must be greater than 0 (got backswing={}, downswing={})",
                    backswing, downswing
                )
            }
            CadenceError::FrameRateInvalid { frame_rate } => {
                format!("Frame rate must be greater than 0 (got {})", frame_rate)
            }
            CadenceError::LockPoisoned { component } => {
                format!("Lock poisoned on {}", component)
            }
        }
    }
}

impl fmt::Display for CadenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CadenceError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for CadenceError {}
