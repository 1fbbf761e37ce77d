// Audio error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Audio error code constants
///
/// These constants provide a single source of truth for error codes
/// shared with the host UI layer.
///
/// Error code range: 1001-1005
pub struct AudioErrorCodes {}

impl AudioErrorCodes {
    /// No audio output device is available
    pub const DEVICE_UNAVAILABLE: i32 = 1001;

    /// Failed to open or resume the audio output stream
    pub const STREAM_OPEN_FAILED: i32 = 1002;

    /// Tone parameters are invalid (frequency and duration must be > 0)
    pub const TONE_SPEC_INVALID: i32 = 1003;

    /// The real-time voice queue is full; the tone was dropped
    pub const VOICE_QUEUE_FULL: i32 = 1004;

    /// Mutex/RwLock was poisoned
    pub const LOCK_POISONED: i32 = 1005;
}

/// Log an audio error with structured context
///
/// The logging is non-blocking and will not panic on failure. Tone playback
/// errors are reported here and nowhere else; they never propagate into the
/// scheduler's timing path.
pub fn log_audio_error(err: &AudioError, context: &str) {
    error!(
        "Audio error in {}: code={}, component=ToneOutput, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Audio-related errors
///
/// These errors cover tone synthesis and the shared output bus. All of them
/// are non-fatal from the scheduler's perspective: a failed tone is skipped
/// and the cadence continues visually ("silent metronome").
///
/// Error code range: 1001-1005
#[derive(Debug, Clone, PartialEq)]
pub enum AudioError {
    /// No audio output device is available
    DeviceUnavailable { details: String },

    /// Failed to open or resume the audio output stream
    StreamOpenFailed { reason: String },

    /// Tone parameters are invalid
    ToneSpecInvalid { details: String },

    /// The real-time voice queue is full
    VoiceQueueFull,

    /// Mutex/RwLock was poisoned
    LockPoisoned { component: String },
}

impl ErrorCode for AudioError {
    fn code(&self) -> i32 {
        match self {
            AudioError::DeviceUnavailable { .. } => AudioErrorCodes::DEVICE_UNAVAILABLE,
            AudioError::StreamOpenFailed { .. } => AudioErrorCodes::STREAM_OPEN_FAILED,
            AudioError::ToneSpecInvalid { .. } => AudioErrorCodes::TONE_SPEC_INVALID,
            AudioError::VoiceQueueFull => AudioErrorCodes::VOICE_QUEUE_FULL,
            AudioError::LockPoisoned { .. } => AudioErrorCodes::LOCK_POISONED,
        }
    }

    fn message(&self) -> String {
        match self {
            AudioError::DeviceUnavailable { details } => {
                format!("No audio output device available: {}", details)
            }
            AudioError::StreamOpenFailed { reason } => {
                format!("Failed to open audio output stream: {}", reason)
            }
            AudioError::ToneSpecInvalid { details } => {
                format!("Invalid tone parameters: {}", details)
            }
            AudioError::VoiceQueueFull => {
                "Voice queue full; tone dropped".to_string()
            }
            AudioError::LockPoisoned { component } => {
                format!("Lock poisoned on {}", component)
            }
        }
    }
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AudioError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for AudioError {}

impl From<std::io::Error> for AudioError {
    fn from(err: std::io::Error) -> Self {
        AudioError::DeviceUnavailable {
            details: err.to_string(),
        }
    }
}
