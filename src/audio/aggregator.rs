// FrameAggregator - turns variable-length PCM chunks into 400-sample frames
//
// The capture thread hands over chunks of whatever size the driver delivers;
// the analysis thread pulls consecutive, disjoint 400-sample frames. Chunks
// are kept whole in arrival order and only released once fully consumed, so
// bookkeeping is per chunk rather than per sample. A read cursor tracks the
// first unread sample of the front chunk.
//
// Invariant: total_samples == sum of unread samples across buffered chunks.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::analysis::constants::FRAME_SIZE_SAMPLES;
use crate::error::DspError;
use crate::sample::Sample;

/// One capture delivery of 16-bit mono PCM
pub type Chunk = Vec<i16>;

#[derive(Debug, Default)]
struct AggregatorState {
    chunks: VecDeque<Chunk>,
    total_samples: usize,
    /// Next unread sample in `chunks.front()`
    read_pos: usize,
    dropped_samples: u64,
}

/// Thread-safe chunk buffer shared by one producer and one consumer
///
/// Every operation takes the same mutex, so `put_chunk` from the capture
/// thread and `extract_frame` from the analysis thread serialize correctly.
#[derive(Debug, Default)]
pub struct FrameAggregator {
    state: Mutex<AggregatorState>,
    capacity_limit: Option<usize>,
}

impl FrameAggregator {
    /// Unbounded aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregator that discards the oldest whole chunks once more than
    /// `max_samples` are buffered
    ///
    /// The chunk just pushed is never discarded, so a single oversized chunk
    /// may still exceed the limit.
    pub fn with_capacity_limit(max_samples: usize) -> Self {
        Self {
            state: Mutex::default(),
            capacity_limit: Some(max_samples),
        }
    }

    pub fn capacity_limit(&self) -> Option<usize> {
        self.capacity_limit
    }

    fn lock(&self) -> Result<MutexGuard<'_, AggregatorState>, DspError> {
        self.state
            .lock()
            .map_err(|_| DspError::poisoned("FrameAggregator"))
    }

    /// Append a chunk in arrival order
    pub fn put_chunk(&self, chunk: Chunk) -> Result<(), DspError> {
        let mut guard = self.lock()?;
        let state = &mut *guard;

        state.total_samples += chunk.len();
        state.chunks.push_back(chunk);

        if let Some(limit) = self.capacity_limit {
            while state.total_samples > limit && state.chunks.len() > 1 {
                if let Some(oldest) = state.chunks.pop_front() {
                    let unread = oldest.len() - state.read_pos;
                    state.total_samples -= unread;
                    state.dropped_samples += unread as u64;
                    state.read_pos = 0;
                }
            }
        }

        Ok(())
    }

    /// Samples buffered but not yet extracted
    pub fn total_samples(&self) -> Result<usize, DspError> {
        Ok(self.lock()?.total_samples)
    }

    /// Chunks currently held (including a partially consumed front chunk)
    pub fn buffered_chunks(&self) -> Result<usize, DspError> {
        Ok(self.lock()?.chunks.len())
    }

    /// Samples discarded by the capacity limit since construction
    pub fn dropped_samples(&self) -> Result<u64, DspError> {
        Ok(self.lock()?.dropped_samples)
    }

    /// Remove and return the oldest 400 buffered samples
    ///
    /// Returns `Ok(None)` without touching the buffer when fewer than 400
    /// samples are available.
    pub fn extract_frame<T: Sample>(&self) -> Result<Option<Vec<T>>, DspError> {
        let mut guard = self.lock()?;
        let state = &mut *guard;

        if state.total_samples < FRAME_SIZE_SAMPLES {
            return Ok(None);
        }

        let mut frame = Vec::with_capacity(FRAME_SIZE_SAMPLES);
        while frame.len() < FRAME_SIZE_SAMPLES {
            let Some(front) = state.chunks.front() else {
                break;
            };

            let wanted = FRAME_SIZE_SAMPLES - frame.len();
            let available = front.len() - state.read_pos;
            let take = wanted.min(available);
            let start = state.read_pos;

            frame.extend(front[start..start + take].iter().map(|&s| T::from_pcm(s)));
            state.read_pos += take;

            if state.read_pos == front.len() {
                state.chunks.pop_front();
                state.read_pos = 0;
            }
        }

        debug_assert_eq!(frame.len(), FRAME_SIZE_SAMPLES);
        state.total_samples -= frame.len();

        Ok(Some(frame))
    }
}
