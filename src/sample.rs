//! Floating-point precision shared by every pipeline stage.
//!
//! A pipeline instance picks its precision once through the `T: Sample`
//! parameter; windowing, FFT, filterbank and DCT of the same
//! [`MfccProcessor`](crate::analysis::MfccProcessor) all use that `T`.

use std::fmt::Debug;
use std::ops::{AddAssign, MulAssign};

use num_traits::{Float, FloatConst};

/// Scalar type used inside the pipeline (`f32` or `f64`).
pub trait Sample:
    Float + FloatConst + AddAssign + MulAssign + Debug + Default + Send + Sync + 'static
{
    /// Convert an `f64` constant into this precision.
    fn lit(value: f64) -> Self;

    /// Convert a 16-bit PCM sample without rescaling.
    fn from_pcm(sample: i16) -> Self;
}

impl Sample for f32 {
    #[inline]
    fn lit(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn from_pcm(sample: i16) -> Self {
        f32::from(sample)
    }
}

impl Sample for f64 {
    #[inline]
    fn lit(value: f64) -> Self {
        value
    }

    #[inline]
    fn from_pcm(sample: i16) -> Self {
        f64::from(sample)
    }
}
