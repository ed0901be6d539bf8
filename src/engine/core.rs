//! EngineHandle: owns the aggregator, the processor and the analysis thread.
//!
//! The capture side calls [`EngineHandle::push_chunk`]; the renderer owns the
//! `Consumer` returned by [`EngineHandle::start`]. Exactly one analysis
//! worker runs between `start` and `stop`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rtrb::Consumer;

use crate::analysis::{MfccFrame, MfccProcessor};
use crate::audio::{Chunk, FrameAggregator, OutputQueue};
use crate::config::AppConfig;
use crate::engine::worker::{AnalysisWorker, WorkerStats, WorkerStatsSnapshot, WorkerSummary};
use crate::error::{log_dsp_error, DspError};
use crate::sample::Sample;
use crate::telemetry::{FrameTimer, MetricsHook, NoopMetrics};

const WORKER_THREAD_NAME: &str = "mfcc-analysis";

struct RunningWorker {
    shutdown: Arc<AtomicBool>,
    alive: Arc<AtomicBool>,
    handle: JoinHandle<Result<WorkerSummary, DspError>>,
}

impl RunningWorker {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}

/// Clears the alive flag when the worker thread exits, panics included
struct AliveGuard(Arc<AtomicBool>);

impl Drop for AliveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// EngineHandle orchestrates the streaming MFCC pipeline.
pub struct EngineHandle<T: Sample = f32> {
    config: AppConfig,
    aggregator: Arc<FrameAggregator>,
    processor: Arc<MfccProcessor<T>>,
    stats: Arc<WorkerStats>,
    worker: Mutex<Option<RunningWorker>>,
}

impl<T: Sample> EngineHandle<T> {
    pub fn new(config: AppConfig) -> Self {
        let aggregator = match config.engine.max_buffered_samples {
            Some(limit) => FrameAggregator::with_capacity_limit(limit),
            None => FrameAggregator::new(),
        };
        let processor = MfccProcessor::from_config(&config.pipeline);

        Self {
            config,
            aggregator: Arc::new(aggregator),
            processor: Arc::new(processor),
            stats: Arc::new(WorkerStats::default()),
            worker: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn aggregator(&self) -> Arc<FrameAggregator> {
        Arc::clone(&self.aggregator)
    }

    pub fn processor(&self) -> Arc<MfccProcessor<T>> {
        Arc::clone(&self.processor)
    }

    fn lock_worker(&self) -> Result<MutexGuard<'_, Option<RunningWorker>>, DspError> {
        self.worker
            .lock()
            .map_err(|_| DspError::poisoned("EngineHandle"))
    }

    /// Hand a capture chunk to the aggregator and wake the worker.
    ///
    /// Chunks pushed while the worker is stopped are buffered and processed
    /// after the next `start`.
    pub fn push_chunk(&self, chunk: Chunk) -> Result<(), DspError> {
        self.aggregator.put_chunk(chunk)?;
        if let Some(running) = self.lock_worker()?.as_ref() {
            if running.is_alive() {
                running.handle.thread().unpark();
            }
        }
        Ok(())
    }

    /// Start the worker with the metrics hook selected by the config.
    pub fn start(&self) -> Result<Consumer<MfccFrame<T>>, DspError> {
        let metrics: Box<dyn MetricsHook> = if self.config.metrics.enabled {
            Box::new(FrameTimer::from_config(&self.config.metrics))
        } else {
            Box::new(NoopMetrics)
        };
        self.start_with_metrics(metrics)
    }

    /// Spawn the analysis thread and return the renderer end of the ring.
    pub fn start_with_metrics(
        &self,
        metrics: Box<dyn MetricsHook>,
    ) -> Result<Consumer<MfccFrame<T>>, DspError> {
        let mut slot = self.lock_worker()?;
        match slot.take() {
            Some(running) if running.is_alive() => {
                *slot = Some(running);
                return Err(DspError::AlreadyRunning);
            }
            Some(exited) => {
                // Already logged by the worker thread; reap it before replacing
                if let Err(err) = Self::join(exited) {
                    log::warn!("[EngineHandle] Replacing exited worker: {}", err);
                }
            }
            None => {}
        }

        let capacity = self.config.engine.output_queue_capacity.max(1);
        let channels = OutputQueue::new::<T>(capacity);
        let shutdown = Arc::new(AtomicBool::new(false));
        let alive = Arc::new(AtomicBool::new(true));
        let guard = AliveGuard(Arc::clone(&alive));

        let worker = AnalysisWorker {
            aggregator: Arc::clone(&self.aggregator),
            processor: Arc::clone(&self.processor),
            producer: channels.producer,
            metrics,
            stats: Arc::clone(&self.stats),
            shutdown: Arc::clone(&shutdown),
            poll_interval: Duration::from_millis(self.config.engine.poll_interval_ms.max(1)),
            drain_on_stop: self.config.engine.drain_on_stop,
        };

        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                let _guard = guard;
                let result = worker.run();
                if let Err(err) = &result {
                    log_dsp_error(err, "analysis worker");
                }
                result
            })
            .map_err(|e| DspError::WorkerFailure {
                reason: format!("failed to spawn analysis thread: {}", e),
            })?;

        *slot = Some(RunningWorker {
            shutdown,
            alive,
            handle,
        });
        log::info!(
            "[EngineHandle] Analysis worker started (output capacity {})",
            capacity
        );

        Ok(channels.consumer)
    }

    /// Signal shutdown, join the worker and return its summary.
    pub fn stop(&self) -> Result<WorkerSummary, DspError> {
        let running = self.lock_worker()?.take().ok_or(DspError::NotRunning)?;
        let summary = Self::join(running)?;

        log::info!(
            "[EngineHandle] Analysis worker stopped: {} frames, {} dropped",
            summary.stats.frames_processed,
            summary.stats.frames_dropped
        );
        Ok(summary)
    }

    fn join(running: RunningWorker) -> Result<WorkerSummary, DspError> {
        running.shutdown.store(true, Ordering::Release);
        running.handle.thread().unpark();

        running.handle.join().map_err(|_| DspError::WorkerFailure {
            reason: "analysis thread panicked".to_string(),
        })?
    }

    /// True while a started worker thread is still alive.
    ///
    /// A worker that exited on its own (failure) reports false; `stop` then
    /// returns its error.
    pub fn is_running(&self) -> bool {
        self.lock_worker()
            .map(|slot| slot.as_ref().is_some_and(RunningWorker::is_alive))
            .unwrap_or(false)
    }

    /// Counters accumulated across every run of this handle.
    pub fn stats(&self) -> WorkerStatsSnapshot {
        self.stats.snapshot()
    }
}

impl<T: Sample> Drop for EngineHandle<T> {
    fn drop(&mut self) {
        let running = match self.worker.get_mut() {
            Ok(slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(running) = running {
            if let Err(err) = Self::join(running) {
                log_dsp_error(&err, "EngineHandle::drop");
            }
        }
    }
}
