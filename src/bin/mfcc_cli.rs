use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mfcc_stream::analysis::{self, mel, MfccFrame, MfccProcessor};
use mfcc_stream::config::AppConfig;
use mfcc_stream::engine::process_available;
use mfcc_stream::telemetry::{FrameTimer, MetricsHook, NoopMetrics, TimingSnapshot};
use mfcc_stream::FrameAggregator;
use serde::Serialize;

#[path = "mfcc_cli/source.rs"]
mod source;

use source::SyntheticKind;

#[derive(Parser, Debug)]
#[command(
    name = "mfcc_cli",
    about = "Run 16 kHz mono PCM through the streaming MFCC pipeline"
)]
struct Cli {
    /// JSON config file (defaults to assets/mfcc_config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Stream audio through the pipeline and print the output vectors
    Analyze {
        /// Mono 16 kHz 16-bit WAV file
        #[arg(long, conflicts_with = "synthetic", required_unless_present = "synthetic")]
        wav: Option<PathBuf>,
        /// Generate input instead of reading a file
        #[arg(long, value_enum)]
        synthetic: Option<SyntheticKind>,
        #[arg(long, default_value_t = 1000.0)]
        frequency: f64,
        #[arg(long, default_value_t = 1000)]
        duration_ms: u64,
        #[arg(long, default_value_t = 8000.0)]
        amplitude: f64,
        /// Samples per pushed chunk, imitating a capture driver
        #[arg(long, default_value_t = 1280)]
        chunk_size: usize,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// Map cepstral values into the display range
        #[arg(long)]
        normalize: bool,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the fixed pipeline constants
    Constants,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One JSON object per frame
    Json,
    /// Aggregate statistics over the whole input
    Summary,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    mfcc_stream::init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path),
        None => AppConfig::load(),
    };

    match cli.command {
        Commands::Analyze {
            wav,
            synthetic,
            frequency,
            duration_ms,
            amplitude,
            chunk_size,
            format,
            normalize,
            output,
        } => {
            let samples = match (wav, synthetic) {
                (Some(path), _) => source::read_wav(&path)?,
                (None, Some(kind)) => source::synthesize(kind, frequency, duration_ms, amplitude)?,
                (None, None) => bail!("either --wav or --synthetic is required"),
            };
            run_analyze(&config, &samples, chunk_size, format, normalize, output)
        }
        Commands::Constants => run_constants(),
    }
}

fn run_analyze(
    config: &AppConfig,
    samples: &[i16],
    chunk_size: usize,
    format: OutputFormat,
    normalize: bool,
    output_path: Option<PathBuf>,
) -> Result<ExitCode> {
    if chunk_size == 0 {
        bail!("--chunk-size must be greater than 0");
    }

    let processor = MfccProcessor::<f32>::from_config(&config.pipeline);
    let aggregator = FrameAggregator::new();
    let mut metrics: Box<dyn MetricsHook> = if config.metrics.enabled {
        Box::new(FrameTimer::from_config(&config.metrics))
    } else {
        Box::new(NoopMetrics)
    };

    let mut frames: Vec<MfccFrame<f32>> = Vec::new();
    for chunk in samples.chunks(chunk_size) {
        aggregator
            .put_chunk(chunk.to_vec())
            .context("buffering audio chunk")?;
        let first_index = frames.len() as u64;
        process_available(
            &aggregator,
            &processor,
            metrics.as_mut(),
            first_index,
            |frame| frames.push(frame),
        )
        .context("processing frames")?;
    }

    if normalize {
        frames = frames
            .iter()
            .map(|frame| frame.normalized_for_display(&config.display))
            .collect();
    }

    let leftover = aggregator.total_samples()?;
    log::debug!(
        "[mfcc_cli] {} samples -> {} frames ({} left over)",
        samples.len(),
        frames.len(),
        leftover
    );

    let text = match format {
        OutputFormat::Json => render_frames(&frames)?,
        OutputFormat::Summary => {
            let summary = AnalysisSummary::new(samples.len(), leftover, &frames, metrics.snapshot());
            serde_json::to_string_pretty(&summary)?
        }
    };

    if let Some(path) = output_path {
        fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{text}");
    }

    Ok(ExitCode::from(0))
}

fn render_frames(frames: &[MfccFrame<f32>]) -> Result<String> {
    let mut out = String::new();
    for (index, frame) in frames.iter().enumerate() {
        let line = serde_json::to_string(&FramePayload {
            index,
            cepstrum: frame.cepstrum(),
            power_spectrum: frame.power_spectrum(),
        })?;
        if index > 0 {
            out.push('\n');
        }
        out.push_str(&line);
    }
    Ok(out)
}

fn run_constants() -> Result<ExitCode> {
    let constants = ConstantsPayload {
        sample_rate_hz: analysis::SAMPLE_RATE_HZ,
        frame_size_samples: analysis::FRAME_SIZE_SAMPLES,
        frame_shift_samples: analysis::FRAME_SHIFT_SAMPLES,
        fft_size: analysis::FFT_SIZE,
        num_power_bins: analysis::NUM_POWER_BINS,
        num_filter_banks: analysis::NUM_FILTER_BANKS,
        num_cepstral_coeffs: analysis::NUM_CEPSTRAL_COEFFS,
        output_vector_len: analysis::OUTPUT_VECTOR_LEN,
        pre_emphasis: analysis::DEFAULT_PRE_EMPHASIS,
        filter_bank_min_freq_hz: analysis::FILTER_BANK_MIN_FREQ_HZ,
        filter_bank_max_freq_hz: analysis::FILTER_BANK_MAX_FREQ_HZ,
    };
    println!("{}", serde_json::to_string_pretty(&constants)?);
    Ok(ExitCode::from(0))
}

#[derive(Serialize)]
struct FramePayload<'a> {
    index: usize,
    cepstrum: &'a [f32],
    power_spectrum: &'a [f32],
}

#[derive(Serialize)]
struct ConstantsPayload {
    sample_rate_hz: u32,
    frame_size_samples: usize,
    frame_shift_samples: usize,
    fft_size: usize,
    num_power_bins: usize,
    num_filter_banks: usize,
    num_cepstral_coeffs: usize,
    output_vector_len: usize,
    pre_emphasis: f64,
    filter_bank_min_freq_hz: f64,
    filter_bank_max_freq_hz: f64,
}

#[derive(Serialize)]
struct AnalysisSummary {
    frames: usize,
    samples_consumed: usize,
    samples_left_over: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    peak_power_bin: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    peak_power_hz: Option<f32>,
    mean_cepstrum: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timing: Option<TimingSnapshot>,
}

impl AnalysisSummary {
    fn new(
        total_samples: usize,
        leftover: usize,
        frames: &[MfccFrame<f32>],
        timing: Option<TimingSnapshot>,
    ) -> Self {
        let mean_cepstrum = column_means(frames, |frame| frame.cepstrum());
        let mean_power = column_means(frames, |frame| frame.power_spectrum());

        let peak_power_bin = mean_power
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(bin, _)| bin);

        Self {
            frames: frames.len(),
            samples_consumed: total_samples - leftover,
            samples_left_over: leftover,
            peak_power_bin,
            peak_power_hz: peak_power_bin.map(mel::bin_to_freq::<f32>),
            mean_cepstrum,
            timing,
        }
    }
}

fn column_means<'a>(
    frames: &'a [MfccFrame<f32>],
    column: impl Fn(&'a MfccFrame<f32>) -> &'a [f32],
) -> Vec<f32> {
    let Some(first) = frames.first() else {
        return Vec::new();
    };

    let mut sums = vec![0.0_f32; column(first).len()];
    for frame in frames {
        for (sum, value) in sums.iter_mut().zip(column(frame)) {
            *sum += value;
        }
    }
    let count = frames.len() as f32;
    sums.into_iter().map(|sum| sum / count).collect()
}
