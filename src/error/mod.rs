// Error types for the MFCC streaming pipeline
//
// This module defines the error taxonomy shared by every DSP stage and the
// analysis worker, with numeric error codes for structured reporting.

mod dsp;

pub use dsp::{log_dsp_error, DspError, DspErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the library and its embedders.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
