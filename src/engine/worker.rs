// AnalysisWorker - consumer side of the streaming pipeline
//
// Drains complete frames from the aggregator, runs the MFCC pipeline on each
// and pushes the output vectors to the renderer ring. The only state shared
// with the capture thread is the aggregator, whose lock is held just for the
// extraction itself; the DSP work runs outside it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rtrb::Producer;
use serde::{Deserialize, Serialize};

use crate::analysis::{MfccFrame, MfccProcessor, FRAME_SIZE_SAMPLES};
use crate::audio::FrameAggregator;
use crate::error::DspError;
use crate::sample::Sample;
use crate::telemetry::{FrameObservation, MetricsHook, TimingSnapshot};

/// Log a warning on the first dropped frame and every 100th after it
const DROP_LOG_INTERVAL: u64 = 100;

/// Counters shared between the worker thread and its handle
#[derive(Debug, Default)]
pub struct WorkerStats {
    frames_processed: AtomicU64,
    frames_dropped: AtomicU64,
}

impl WorkerStats {
    pub fn snapshot(&self) -> WorkerStatsSnapshot {
        WorkerStatsSnapshot {
            frames_processed: self.frames_processed.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStatsSnapshot {
    pub frames_processed: u64,
    /// Frames computed but discarded because the output ring was full
    pub frames_dropped: u64,
}

/// Returned by the worker thread when it exits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerSummary {
    pub stats: WorkerStatsSnapshot,
    pub timing: Option<TimingSnapshot>,
}

/// Process every complete frame currently buffered
///
/// Runs `while total_samples() >= 400 { extract; process; emit }` and returns
/// how many frames were emitted. Frame indices reported to `metrics` start at
/// `first_index`.
pub fn process_available<T: Sample>(
    aggregator: &FrameAggregator,
    processor: &MfccProcessor<T>,
    metrics: &mut dyn MetricsHook,
    first_index: u64,
    mut emit: impl FnMut(MfccFrame<T>),
) -> Result<u64, DspError> {
    let mut processed = 0;

    while aggregator.total_samples()? >= FRAME_SIZE_SAMPLES {
        let Some(frame) = aggregator.extract_frame::<T>()? else {
            break;
        };

        let started = Instant::now();
        let output = processor.generate_mfcc_and_power_spectrum(&frame)?;
        metrics.on_frame(&FrameObservation {
            frame_index: first_index + processed,
            elapsed: started.elapsed(),
            buffered_samples: aggregator.total_samples()?,
        });

        emit(output);
        processed += 1;
    }

    Ok(processed)
}

pub(crate) struct AnalysisWorker<T: Sample> {
    pub(crate) aggregator: Arc<FrameAggregator>,
    pub(crate) processor: Arc<MfccProcessor<T>>,
    pub(crate) producer: Producer<MfccFrame<T>>,
    pub(crate) metrics: Box<dyn MetricsHook>,
    pub(crate) stats: Arc<WorkerStats>,
    pub(crate) shutdown: Arc<AtomicBool>,
    pub(crate) poll_interval: Duration,
    pub(crate) drain_on_stop: bool,
}

impl<T: Sample> AnalysisWorker<T> {
    /// Thread body: drain, park until woken or timed out, repeat until shutdown
    pub(crate) fn run(mut self) -> Result<WorkerSummary, DspError> {
        tracing::info!(
            "[AnalysisWorker] Started (poll_interval={:?}, drain_on_stop={})",
            self.poll_interval,
            self.drain_on_stop
        );

        loop {
            if self.shutdown.load(Ordering::Acquire) {
                if self.drain_on_stop {
                    self.drain()?;
                }
                break;
            }

            if self.drain()? == 0 {
                thread::park_timeout(self.poll_interval);
            }
        }

        let summary = WorkerSummary {
            stats: self.stats.snapshot(),
            timing: self.metrics.snapshot(),
        };
        tracing::info!(
            "[AnalysisWorker] Stopped after {} frames ({} dropped)",
            summary.stats.frames_processed,
            summary.stats.frames_dropped
        );
        Ok(summary)
    }

    fn drain(&mut self) -> Result<u64, DspError> {
        let first_index = self.stats.frames_processed.load(Ordering::Relaxed);
        let producer = &mut self.producer;
        let stats = &self.stats;

        let processed = process_available(
            &self.aggregator,
            &self.processor,
            self.metrics.as_mut(),
            first_index,
            |frame| {
                if producer.push(frame).is_err() {
                    let dropped = stats.frames_dropped.fetch_add(1, Ordering::Relaxed) + 1;
                    if dropped % DROP_LOG_INTERVAL == 1 {
                        tracing::warn!(
                            "[AnalysisWorker] Output ring full, dropped {} frame(s) so far",
                            dropped
                        );
                    }
                }
            },
        )?;

        self.stats
            .frames_processed
            .fetch_add(processed, Ordering::Relaxed);
        Ok(processed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::OutputQueue;
    use crate::telemetry::{FrameTimer, NoopMetrics};

    #[derive(Default)]
    struct CountingHook {
        indices: Vec<u64>,
    }

    impl MetricsHook for CountingHook {
        fn on_frame(&mut self, observation: &FrameObservation) {
            self.indices.push(observation.frame_index);
        }
    }

    #[test]
    fn test_process_available_drains_whole_frames() {
        let aggregator = FrameAggregator::new();
        aggregator.put_chunk(vec![100; 1000]).unwrap();
        let processor = MfccProcessor::<f32>::new();
        let mut hook = CountingHook::default();
        let mut outputs = Vec::new();

        let processed =
            process_available(&aggregator, &processor, &mut hook, 7, |f| outputs.push(f)).unwrap();

        assert_eq!(processed, 2);
        assert_eq!(outputs.len(), 2);
        assert_eq!(hook.indices, vec![7, 8]);
        assert_eq!(aggregator.total_samples().unwrap(), 200);
    }

    #[test]
    fn test_process_available_with_too_little_data() {
        let aggregator = FrameAggregator::new();
        aggregator.put_chunk(vec![1; 399]).unwrap();
        let processor = MfccProcessor::<f64>::new();

        let processed =
            process_available(&aggregator, &processor, &mut NoopMetrics, 0, |_| {
                panic!("nothing should be emitted")
            })
            .unwrap();
        assert_eq!(processed, 0);
    }

    #[test]
    fn test_worker_counts_drops_when_ring_is_full() {
        let aggregator = Arc::new(FrameAggregator::new());
        aggregator.put_chunk(vec![500; 400 * 5]).unwrap();
        let channels = OutputQueue::new::<f32>(2);
        let stats = Arc::new(WorkerStats::default());
        let shutdown = Arc::new(AtomicBool::new(true));

        let worker = AnalysisWorker {
            aggregator: Arc::clone(&aggregator),
            processor: Arc::new(MfccProcessor::new()),
            producer: channels.producer,
            metrics: Box::new(FrameTimer::new(0.5, 0, 1000)),
            stats: Arc::clone(&stats),
            shutdown,
            poll_interval: Duration::from_millis(1),
            drain_on_stop: true,
        };

        let summary = worker.run().unwrap();
        assert_eq!(summary.stats.frames_processed, 5);
        assert_eq!(summary.stats.frames_dropped, 3);
        assert_eq!(summary.timing.unwrap().frames_observed, 5);
        assert_eq!(stats.snapshot(), summary.stats);

        let mut consumer = channels.consumer;
        assert!(consumer.pop().is_ok());
        assert!(consumer.pop().is_ok());
        assert!(consumer.pop().is_err());
    }

    #[test]
    fn test_worker_skips_drain_when_disabled() {
        let aggregator = Arc::new(FrameAggregator::new());
        aggregator.put_chunk(vec![0; 800]).unwrap();
        let channels = OutputQueue::new::<f64>(4);

        let worker = AnalysisWorker {
            aggregator: Arc::clone(&aggregator),
            processor: Arc::new(MfccProcessor::new()),
            producer: channels.producer,
            metrics: Box::new(NoopMetrics),
            stats: Arc::new(WorkerStats::default()),
            shutdown: Arc::new(AtomicBool::new(true)),
            poll_interval: Duration::from_millis(1),
            drain_on_stop: false,
        };

        let summary = worker.run().unwrap();
        assert_eq!(summary.stats.frames_processed, 0);
        assert!(summary.timing.is_none());
        assert_eq!(aggregator.total_samples().unwrap(), 800);
    }
}
