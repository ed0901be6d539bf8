// OutputQueue - lock-free FIFO from the analysis thread to the renderer
//
// The analysis worker pushes one MfccFrame per processed audio frame; the
// renderer pops them in order on its own thread. Built on a single SPSC ring
// buffer so neither side ever blocks on the other.
//
// Frame flow:
// 1. Analysis thread extracts a 400-sample frame from the aggregator
// 2. Analysis thread computes the MfccFrame
// 3. Analysis thread pushes it to the ring (dropped if the ring is full)
// 4. Renderer pops frames in FIFO order

use rtrb::{Consumer, Producer};

use crate::analysis::MfccFrame;

/// Default ring capacity in frames (~6.4 s of audio)
pub const DEFAULT_OUTPUT_CAPACITY: usize = 256;

/// Split output queue endpoints
///
/// The producer moves into the analysis thread, the consumer goes to the
/// renderer.
pub struct OutputChannels<T> {
    /// Producer used by the analysis worker
    pub producer: Producer<MfccFrame<T>>,
    /// Consumer handed to the renderer
    pub consumer: Consumer<MfccFrame<T>>,
}

/// Lock-free output ring factory
///
/// # Example
/// ```ignore
/// let mut channels = OutputQueue::new::<f32>(256);
///
/// // In analysis thread:
/// let _ = channels.producer.push(frame);
///
/// // In renderer thread:
/// while let Ok(frame) = channels.consumer.pop() {
///     heat_map.push_column(frame.cepstrum());
/// }
/// ```
pub struct OutputQueue;

impl OutputQueue {
    /// Create a ring holding up to `capacity` frames
    ///
    /// # Panics
    /// Panics if capacity is 0
    #[allow(clippy::new_ret_no_self)]
    pub fn new<T>(capacity: usize) -> OutputChannels<T> {
        assert!(capacity > 0, "capacity must be greater than 0");

        let (producer, consumer) = rtrb::RingBuffer::new(capacity);
        OutputChannels { producer, consumer }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{MfccProcessor, FRAME_SIZE_SAMPLES};

    fn frame_with_offset(offset: f32) -> MfccFrame<f32> {
        let processor = MfccProcessor::<f32>::new();
        let samples: Vec<f32> = (0..FRAME_SIZE_SAMPLES)
            .map(|i| offset + (i as f32 * 0.3).sin() * 1000.0)
            .collect();
        processor.generate_mfcc_and_power_spectrum(&samples).unwrap()
    }

    #[test]
    fn test_queue_starts_empty() {
        let mut channels = OutputQueue::new::<f32>(4);
        assert!(channels.consumer.pop().is_err());
        assert_eq!(channels.producer.slots(), 4);
    }

    #[test]
    fn test_fifo_order() {
        let mut channels = OutputQueue::new::<f32>(4);
        let first = frame_with_offset(0.0);
        let second = frame_with_offset(50.0);

        channels.producer.push(first.clone()).unwrap();
        channels.producer.push(second.clone()).unwrap();

        assert_eq!(channels.consumer.pop().unwrap(), first);
        assert_eq!(channels.consumer.pop().unwrap(), second);
        assert!(channels.consumer.pop().is_err());
    }

    #[test]
    fn test_full_queue_rejects_push() {
        let mut channels = OutputQueue::new::<f32>(1);
        channels.producer.push(frame_with_offset(0.0)).unwrap();
        assert!(channels.producer.push(frame_with_offset(1.0)).is_err());
    }

    #[test]
    fn test_send() {
        fn assert_send<T: Send>() {}
        // Each endpoint moves to its own thread (SPSC)
        assert_send::<Producer<MfccFrame<f32>>>();
        assert_send::<Consumer<MfccFrame<f64>>>();
        assert_send::<OutputChannels<f32>>();
    }

    #[test]
    #[should_panic(expected = "capacity must be greater than 0")]
    fn test_zero_capacity_panics() {
        OutputQueue::new::<f32>(0);
    }

    #[test]
    fn test_default_capacity() {
        let channels = OutputQueue::new::<f32>(DEFAULT_OUTPUT_CAPACITY);
        assert_eq!(channels.producer.slots(), DEFAULT_OUTPUT_CAPACITY);
    }
}
