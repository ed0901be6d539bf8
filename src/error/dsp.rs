// DSP pipeline error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// DSP error code constants
///
/// Single source of truth for the numeric codes reported by [`DspError`].
///
/// Error code range: 3001-3005
pub struct DspErrorCodes {}

impl DspErrorCodes {
    /// Buffer length at a stage boundary does not match the fixed design size
    pub const INVALID_ARGUMENT: i32 = 3001;

    /// Mutex guarding shared state was poisoned
    pub const LOCK_POISONED: i32 = 3002;

    /// Analysis worker is already running
    pub const ALREADY_RUNNING: i32 = 3003;

    /// Analysis worker is not running
    pub const NOT_RUNNING: i32 = 3004;

    /// Analysis worker thread could not be spawned or panicked
    pub const WORKER_FAILURE: i32 = 3005;
}

/// Log a DSP error with structured context
///
/// The logging is non-blocking and will not panic on failure.
pub fn log_dsp_error(err: &DspError, context: &str) {
    error!(
        "DSP error in {}: code={}, component=MfccPipeline, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// DSP pipeline errors
///
/// `InvalidArgument` is fatal to the single call that produced it, never to
/// the pipeline instance. Running out of buffered audio is not an error: the
/// aggregator reports it as `Ok(None)`.
///
/// Error code ranges: 3001-3005
#[derive(Debug, Clone, PartialEq)]
pub enum DspError {
    /// A buffer handed to a stage has the wrong length
    InvalidArgument {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Mutex was poisoned
    LockPoisoned { component: String },

    /// Analysis worker already running
    AlreadyRunning,

    /// Analysis worker not running
    NotRunning,

    /// Analysis worker thread failed
    WorkerFailure { reason: String },
}

impl DspError {
    pub(crate) fn invalid_length(stage: &'static str, expected: usize, actual: usize) -> Self {
        DspError::InvalidArgument {
            stage,
            expected,
            actual,
        }
    }

    pub(crate) fn poisoned(component: &str) -> Self {
        DspError::LockPoisoned {
            component: component.to_string(),
        }
    }
}

impl ErrorCode for DspError {
    fn code(&self) -> i32 {
        match self {
            DspError::InvalidArgument { .. } => DspErrorCodes::INVALID_ARGUMENT,
            DspError::LockPoisoned { .. } => DspErrorCodes::LOCK_POISONED,
            DspError::AlreadyRunning => DspErrorCodes::ALREADY_RUNNING,
            DspError::NotRunning => DspErrorCodes::NOT_RUNNING,
            DspError::WorkerFailure { .. } => DspErrorCodes::WORKER_FAILURE,
        }
    }

    fn message(&self) -> String {
        match self {
            DspError::InvalidArgument {
                stage,
                expected,
                actual,
            } => {
                format!(
                    "Invalid buffer length for {}: expected {}, got {}",
                    stage, expected, actual
                )
            }
            DspError::LockPoisoned { component } => {
                format!("Lock poisoned on {}", component)
            }
            DspError::AlreadyRunning => {
                "Analysis worker already running. Call stop() first.".to_string()
            }
            DspError::NotRunning => "Analysis worker not running. Call start() first.".to_string(),
            DspError::WorkerFailure { reason } => {
                format!("Analysis worker failed: {}", reason)
            }
        }
    }
}

impl fmt::Display for DspError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DspError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for DspError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dsp_error_codes() {
        assert_eq!(
            DspError::invalid_length("fft", 1024, 10).code(),
            DspErrorCodes::INVALID_ARGUMENT
        );
        assert_eq!(DspError::poisoned("aggregator").code(), 3002);
        assert_eq!(DspError::AlreadyRunning.code(), 3003);
        assert_eq!(DspError::NotRunning.code(), 3004);
        assert_eq!(
            DspError::WorkerFailure {
                reason: "test".to_string()
            }
            .code(),
            3005
        );
    }

    #[test]
    fn test_invalid_argument_message() {
        let err = DspError::invalid_length("dct", 26, 25);
        let message = err.message();
        assert!(message.contains("dct"));
        assert!(message.contains("expected 26"));
        assert!(message.contains("got 25"));
    }

    #[test]
    fn test_display_includes_code() {
        let err = DspError::NotRunning;
        let text = err.to_string();
        assert!(text.contains("3004"), "display should carry the code: {}", text);
        assert!(text.contains("not running"));
    }

    #[test]
    fn test_error_code_trait_object() {
        let err: &dyn ErrorCode = &DspError::AlreadyRunning;
        assert_eq!(err.code(), DspErrorCodes::ALREADY_RUNNING);
    }

    #[test]
    fn test_error_propagation() {
        fn may_fail() -> Result<(), DspError> {
            Err(DspError::invalid_length("window", 400, 0))
        }

        fn caller() -> Result<(), DspError> {
            may_fail()?;
            Ok(())
        }

        assert!(matches!(
            caller(),
            Err(DspError::InvalidArgument { expected: 400, .. })
        ));
    }
}
