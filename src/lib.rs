// mfcc_stream - streaming MFCC extraction for 16 kHz mono PCM
// Lock-free output path, mutex-guarded chunk aggregation

// Module declarations
pub mod analysis;
pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod sample;
pub mod telemetry;

// Re-exports for convenience
pub use analysis::{MfccFrame, MfccProcessor};
pub use audio::{Chunk, FrameAggregator};
pub use config::AppConfig;
pub use engine::{EngineHandle, WorkerSummary};
pub use error::{DspError, ErrorCode};
pub use sample::Sample;
pub use telemetry::{FrameTimer, MetricsHook, NoopMetrics};

/// Install a `tracing` subscriber writing to stderr.
///
/// Records from the `log` facade are forwarded to the same subscriber. Safe
/// to call more than once; later calls are ignored.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging(false);
        init_logging(true);
        log::info!("logging initialised");
    }
}
