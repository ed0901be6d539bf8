//! Fixed design constants of the MFCC pipeline.

/// Capture sample rate (mono, 16-bit PCM).
pub const SAMPLE_RATE_HZ: u32 = 16_000;

/// Samples per analysis frame (25 ms @ 16 kHz).
pub const FRAME_SIZE_SAMPLES: usize = 400;

/// Conventional 10 ms hop. Frames are extracted disjointly, so this is
/// reported but never applied.
pub const FRAME_SHIFT_SAMPLES: usize = 160;

/// Complex points per FFT.
pub const FFT_SIZE: usize = 512;

/// Power-spectrum bins kept from the FFT output (first half).
pub const NUM_POWER_BINS: usize = FFT_SIZE / 2;

/// Triangular Mel filters.
pub const NUM_FILTER_BANKS: usize = 26;

/// Cepstral coefficients produced by the DCT.
pub const NUM_CEPSTRAL_COEFFS: usize = NUM_FILTER_BANKS + 1;

/// Length of one output vector: cepstrum followed by power spectrum.
pub const OUTPUT_VECTOR_LEN: usize = NUM_CEPSTRAL_COEFFS + NUM_POWER_BINS;

/// Default 2-tap pre-emphasis coefficient.
pub const DEFAULT_PRE_EMPHASIS: f64 = 0.96;

/// Lower edge of the filterbank.
pub const FILTER_BANK_MIN_FREQ_HZ: f64 = 300.0;

/// Upper edge of the filterbank (Nyquist).
pub const FILTER_BANK_MAX_FREQ_HZ: f64 = 8_000.0;

/// Energy floor applied before the natural log.
pub const MEL_ENERGY_FLOOR: f64 = 1.0;
