// Audio module - chunk aggregation on the way in, output ring on the way out

pub mod aggregator;
pub mod output_queue;

// Re-export commonly used types for convenience
pub use aggregator::{Chunk, FrameAggregator};
pub use output_queue::{OutputChannels, OutputQueue, DEFAULT_OUTPUT_CAPACITY};
