//! Configuration management for the streaming MFCC pipeline
//!
//! This module provides runtime configuration loading from JSON files. The
//! DSP design constants (frame size, FFT size, filter count) are fixed; the
//! knobs here cover pre-emphasis, the analysis worker, display mapping and
//! timing instrumentation.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::analysis::constants::DEFAULT_PRE_EMPHASIS;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub engine: EngineConfig,
    pub display: DisplayConfig,
    pub metrics: MetricsConfig,
}

/// Per-frame DSP parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// 2-tap pre-emphasis coefficient
    pub pre_emphasis: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pre_emphasis: DEFAULT_PRE_EMPHASIS,
        }
    }
}

/// Analysis worker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Capacity of the output ring handed to the renderer (in frames)
    pub output_queue_capacity: usize,
    /// How long the worker parks when fewer than one frame is buffered
    pub poll_interval_ms: u64,
    /// Drop the oldest chunks beyond this many buffered samples (None = unbounded)
    pub max_buffered_samples: Option<usize>,
    /// Process whatever complete frames remain when stopping
    pub drain_on_stop: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            output_queue_capacity: 256,
            poll_interval_ms: 5,
            max_buffered_samples: None,
            drain_on_stop: true,
        }
    }
}

/// Mapping of cepstral values into the heat-map range
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub cepstrum_scale: f64,
    pub cepstrum_offset: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            cepstrum_scale: 5.0,
            cepstrum_offset: 0.5,
        }
    }
}

/// Per-frame timing instrumentation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Attach the frame timer to the analysis worker
    pub enabled: bool,
    /// Weight of the previous average in the decayed moving average
    pub decay: f64,
    /// Frames processed before averaging starts
    pub warmup_frames: u64,
    /// Log the average every N frames once warmed up
    pub log_every_n_frames: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            decay: 0.999,
            warmup_frames: 1000,
            log_every_n_frames: 100,
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// Missing fields take their defaults. If the file cannot be read or
    /// parsed, the whole default configuration is returned.
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

    pub fn load() -> Self {
        Self::load_from_file("assets/mfcc_config.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.pipeline.pre_emphasis, 0.96);
        assert_eq!(config.engine.output_queue_capacity, 256);
        assert!(config.engine.max_buffered_samples.is_none());
        assert!(config.engine.drain_on_stop);
        assert_eq!(config.display.cepstrum_scale, 5.0);
        assert_eq!(config.metrics.warmup_frames, 1000);
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = AppConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.pipeline.pre_emphasis, config.pipeline.pre_emphasis);
        assert_eq!(
            parsed.engine.poll_interval_ms,
            config.engine.poll_interval_ms
        );
        assert_eq!(parsed.metrics.decay, config.metrics.decay);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let parsed: AppConfig =
            serde_json::from_str(r#"{ "engine": { "max_buffered_samples": 16000 } }"#).unwrap();
        assert_eq!(parsed.engine.max_buffered_samples, Some(16_000));
        assert_eq!(parsed.engine.output_queue_capacity, 256);
        assert_eq!(parsed.pipeline.pre_emphasis, 0.96);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from_file("definitely/not/here.json");
        assert_eq!(config.pipeline.pre_emphasis, 0.96);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "mfcc_stream_config_{}.json",
            std::process::id()
        ));
        fs::write(&path, r#"{ "pipeline": { "pre_emphasis": 0.9 } }"#).unwrap();
        let config = AppConfig::load_from_file(&path);
        let _ = fs::remove_file(&path);

        assert_eq!(config.pipeline.pre_emphasis, 0.9);
        assert_eq!(config.display.cepstrum_offset, 0.5);
    }
}
