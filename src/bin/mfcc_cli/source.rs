use std::f64::consts::PI;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use clap::ValueEnum;
use mfcc_stream::analysis::SAMPLE_RATE_HZ;
use rand::Rng;

/// Generated input signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SyntheticKind {
    Sine,
    Noise,
    Silence,
}

/// Load a WAV file as raw 16-bit PCM.
///
/// The pipeline is fixed to 16 kHz mono 16-bit audio, so anything else is
/// rejected rather than resampled.
pub fn read_wav(path: &Path) -> Result<Vec<i16>> {
    let mut reader =
        hound::WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();

    if spec.channels != 1 {
        bail!(
            "{} must be mono (found {} channels)",
            path.display(),
            spec.channels
        );
    }
    if spec.sample_rate != SAMPLE_RATE_HZ {
        bail!(
            "{} must be sampled at {} Hz (found {} Hz)",
            path.display(),
            SAMPLE_RATE_HZ,
            spec.sample_rate
        );
    }
    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        bail!(
            "{} must contain 16-bit integer samples (found {:?}, {} bits)",
            path.display(),
            spec.sample_format,
            spec.bits_per_sample
        );
    }

    reader
        .samples::<i16>()
        .map(|sample| sample.map_err(|err| anyhow!(err)))
        .collect::<Result<Vec<i16>>>()
        .with_context(|| format!("decoding {}", path.display()))
}

pub fn synthesize(
    kind: SyntheticKind,
    frequency_hz: f64,
    duration_ms: u64,
    amplitude: f64,
) -> Result<Vec<i16>> {
    let len = u64::from(SAMPLE_RATE_HZ)
        .checked_mul(duration_ms)
        .and_then(|samples| usize::try_from(samples / 1000).ok())
        .ok_or_else(|| anyhow!("--duration-ms {} is too large", duration_ms))?;
    let amplitude = amplitude.clamp(0.0, f64::from(i16::MAX));

    let samples = match kind {
        SyntheticKind::Sine => (0..len)
            .map(|n| {
                let t = n as f64 / f64::from(SAMPLE_RATE_HZ);
                (amplitude * (2.0 * PI * frequency_hz * t).sin()).round() as i16
            })
            .collect(),
        SyntheticKind::Noise => {
            let mut rng = rand::thread_rng();
            (0..len)
                .map(|_| (amplitude * rng.gen_range(-1.0..=1.0)).round() as i16)
                .collect()
        }
        SyntheticKind::Silence => vec![0; len],
    };

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesize_length_follows_duration() {
        let samples = synthesize(SyntheticKind::Silence, 0.0, 250, 0.0).unwrap();
        assert_eq!(samples.len(), 4000);
        assert!(samples.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_synthesize_rejects_overflowing_duration() {
        let err = synthesize(SyntheticKind::Sine, 1000.0, u64::MAX, 100.0).unwrap_err();
        assert!(err.to_string().contains("too large"), "got {err}");
    }
}
