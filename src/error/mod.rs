// Error types for the swing tempo trainer core
//
// This module defines custom error types for audio output and cadence
// scheduling, providing structured error handling with stable numeric codes
// for the host UI layer.

mod audio;
mod cadence;

pub use audio::{log_audio_error, AudioError, AudioErrorCodes};
pub use cadence::{log_cadence_error, CadenceError, CadenceErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the UI boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
