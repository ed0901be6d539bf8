// FFT module - recursive radix-2 complex FFT
//
// Decimation-in-time Cooley-Tukey over interleaved (re, im) buffers:
//
//   X(k)       = E(k) + W^k_N * O(k)
//   X(k + N/2) = E(k) - W^k_N * O(k)      k = 0 .. N/2 - 1
//   W^k_N      = exp(-2πi k / N)
//
// where E and O are the N/2-point transforms of the even- and odd-indexed
// inputs. Twiddle tables for every power-of-two size are built once and
// looked up by log2(size) at each recursion level.

use crate::analysis::constants::FFT_SIZE;
use crate::error::DspError;
use crate::sample::Sample;

/// Recursive complex FFT with precomputed twiddle tables
#[derive(Debug, Clone, PartialEq)]
pub struct RecursiveFft<T: Sample> {
    /// `twiddles[log2(n)]` holds n/2 complex factors for an n-point stage
    twiddles: Vec<Vec<T>>,
    max_points: usize,
}

impl<T: Sample> Default for RecursiveFft<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample> RecursiveFft<T> {
    /// Create an engine with tables for sizes 1..=512
    pub fn new() -> Self {
        Self::with_max_size(FFT_SIZE)
    }

    /// Create an engine with tables for every power of two up to `max_points`
    ///
    /// # Panics
    /// Panics if `max_points` is not a power of two
    pub fn with_max_size(max_points: usize) -> Self {
        assert!(
            max_points.is_power_of_two(),
            "max_points must be a power of two"
        );

        let levels = max_points.trailing_zeros() as usize + 1;
        let twiddles = (0..levels).map(|level| make_twiddle(1 << level)).collect();

        Self {
            twiddles,
            max_points,
        }
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }

    /// Twiddle table for an `points`-point stage, if one was built
    pub fn twiddle_table(&self, points: usize) -> Option<&[T]> {
        if !points.is_power_of_two() {
            return None;
        }
        self.twiddles
            .get(points.trailing_zeros() as usize)
            .map(Vec::as_slice)
    }

    /// Transform exactly 512 complex points (1024 scalars)
    pub fn transform(&self, samples: &[T]) -> Result<Vec<T>, DspError> {
        if samples.len() != FFT_SIZE * 2 {
            return Err(DspError::invalid_length("fft", FFT_SIZE * 2, samples.len()));
        }
        self.transform_any(samples)
    }

    /// Transform any power-of-two number of complex points up to the
    /// engine's maximum
    pub fn transform_any(&self, samples: &[T]) -> Result<Vec<T>, DspError> {
        let points = samples.len() / 2;
        let valid = samples.len() % 2 == 0
            && points.is_power_of_two()
            && points <= self.max_points;
        if !valid {
            let expected = points
                .checked_next_power_of_two()
                .unwrap_or(self.max_points)
                .min(self.max_points);
            return Err(DspError::invalid_length("fft", expected * 2, samples.len()));
        }

        Ok(self.cooley_tukey(samples))
    }

    fn cooley_tukey(&self, input: &[T]) -> Vec<T> {
        let points = input.len() / 2;
        if points == 1 {
            return input.to_vec();
        }

        let (even_in, odd_in) = deinterleave(input);
        let even = self.cooley_tukey(&even_in);
        let odd = self.cooley_tukey(&odd_in);

        let twiddle = &self.twiddles[points.trailing_zeros() as usize];
        let half = points / 2;
        let mut output = vec![T::zero(); points * 2];

        for k in 0..half {
            let (tw_re, tw_im) = (twiddle[2 * k], twiddle[2 * k + 1]);
            let (e_re, e_im) = (even[2 * k], even[2 * k + 1]);
            let (o_re, o_im) = (odd[2 * k], odd[2 * k + 1]);

            // W * O(k)
            let offset_re = tw_re * o_re - tw_im * o_im;
            let offset_im = tw_re * o_im + tw_im * o_re;

            output[2 * k] = e_re + offset_re;
            output[2 * k + 1] = e_im + offset_im;
            output[2 * (k + half)] = e_re - offset_re;
            output[2 * (k + half) + 1] = e_im - offset_im;
        }

        output
    }
}

/// Split interleaved complex points into even- and odd-indexed halves.
fn deinterleave<T: Sample>(input: &[T]) -> (Vec<T>, Vec<T>) {
    let mut even = Vec::with_capacity(input.len() / 2);
    let mut odd = Vec::with_capacity(input.len() / 2);
    for pair in input.chunks_exact(4) {
        even.extend_from_slice(&pair[..2]);
        odd.extend_from_slice(&pair[2..]);
    }
    (even, odd)
}

fn make_twiddle<T: Sample>(points: usize) -> Vec<T> {
    let mut table = Vec::with_capacity(points);
    for k in 0..points / 2 {
        let theta = -2.0 * std::f64::consts::PI * k as f64 / points as f64;
        table.push(T::lit(theta.cos()));
        table.push(T::lit(theta.sin()));
    }
    table
}
