// Window module - pre-emphasis and Hamming windowing
//
// Converts one real-valued frame into the zero-padded complex buffer the FFT
// consumes. The Hamming coefficients are computed once per instance.

use crate::error::DspError;
use crate::sample::Sample;

/// Pre-emphasis + Hamming window producing interleaved complex output
#[derive(Debug, Clone, PartialEq)]
pub struct HammingWindow<T: Sample> {
    coefficients: Vec<T>,
    output_size: usize,
}

impl<T: Sample> HammingWindow<T> {
    /// Create a window for `window_size` input samples padded to
    /// `output_size` complex points.
    ///
    /// # Panics
    /// Panics if `window_size < 2` or `output_size < window_size`
    pub fn new(window_size: usize, output_size: usize) -> Self {
        assert!(window_size >= 2, "window_size must be at least 2");
        assert!(
            output_size >= window_size,
            "output_size must not be smaller than window_size"
        );

        let denominator = (window_size - 1) as f64;
        let coefficients = (0..window_size)
            .map(|i| {
                let phase = 2.0 * std::f64::consts::PI * i as f64 / denominator;
                T::lit(0.54 - 0.46 * phase.cos())
            })
            .collect();

        Self {
            coefficients,
            output_size,
        }
    }

    pub fn window_size(&self) -> usize {
        self.coefficients.len()
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn coefficients(&self) -> &[T] {
        &self.coefficients
    }

    /// Apply pre-emphasis and the Hamming window to one frame
    ///
    /// Returns `2 * output_size` scalars in (re, im) pairs. The first point
    /// has no predecessor and is forced to zero; everything past the window
    /// is zero padding.
    pub fn apply(&self, frame: &[T], pre_emphasis: T) -> Result<Vec<T>, DspError> {
        let window_size = self.window_size();
        if frame.len() != window_size {
            return Err(DspError::invalid_length(
                "hamming_window",
                window_size,
                frame.len(),
            ));
        }

        let mut output = vec![T::zero(); self.output_size * 2];
        for i in 1..window_size {
            output[2 * i] = self.coefficients[i] * (frame[i] - pre_emphasis * frame[i - 1]);
        }

        Ok(output)
    }
}
