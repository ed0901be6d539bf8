// Analysis module - MFCC + power spectrum pipeline
//
// Module organization:
// - constants: fixed design constants (16 kHz, 400-sample frames, 512-point FFT)
// - window: pre-emphasis + Hamming window, zero padding to complex form
// - fft: recursive radix-2 complex FFT
// - mel: triangular Mel filterbank, log filter energies
// - dct: DCT-II from 26 filter energies to 27 cepstral coefficients
// - mod.rs: Coordinator (MfccProcessor)
//
// Per frame:
//   frame → window → FFT ─┬─> mel → DCT ─────> 27 cepstral values
//                         └─> power spectrum ─> 256 log-power values

pub mod constants;
pub mod dct;
pub mod fft;
pub mod mel;
pub mod window;

pub use constants::*;
pub use dct::Dct;
pub use fft::RecursiveFft;
pub use mel::{FilterMapEntry, FilterTap, MelFilterBank};
pub use window::HammingWindow;

use crate::config::{DisplayConfig, PipelineConfig};
use crate::error::DspError;
use crate::sample::Sample;

/// One output vector: 27 cepstral values followed by 256 power values
#[derive(Debug, Clone, PartialEq)]
pub struct MfccFrame<T> {
    values: Vec<T>,
}

impl<T: Sample> MfccFrame<T> {
    fn from_parts(cepstrum: &[T], power_spectrum: &[T]) -> Self {
        let mut values = Vec::with_capacity(OUTPUT_VECTOR_LEN);
        values.extend_from_slice(cepstrum);
        values.extend_from_slice(power_spectrum);
        Self { values }
    }

    pub fn cepstrum(&self) -> &[T] {
        &self.values[..NUM_CEPSTRAL_COEFFS]
    }

    pub fn power_spectrum(&self) -> &[T] {
        &self.values[NUM_CEPSTRAL_COEFFS..]
    }

    /// Concatenated layout consumed by the renderer
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Map cepstral values into roughly [0, 1] for heat-map display
    ///
    /// Each coefficient becomes `c / scale + offset`; the power spectrum is
    /// already normalized and is left untouched.
    pub fn normalized_for_display(&self, display: &DisplayConfig) -> Self {
        let scale = T::lit(display.cepstrum_scale);
        let offset = T::lit(display.cepstrum_offset);
        let mut values = self.values.clone();
        for value in values[..NUM_CEPSTRAL_COEFFS].iter_mut() {
            *value = *value / scale + offset;
        }
        Self { values }
    }
}

/// MfccProcessor coordinates the per-frame DSP pipeline
///
/// All tables are built in the constructor and never mutated, and no state
/// is carried between frames, so one instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct MfccProcessor<T: Sample> {
    window: HammingWindow<T>,
    fft: RecursiveFft<T>,
    filter_bank: MelFilterBank<T>,
    dct: Dct<T>,
    pre_emphasis: T,
}

impl<T: Sample> Default for MfccProcessor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample> MfccProcessor<T> {
    pub fn new() -> Self {
        Self::with_pre_emphasis(DEFAULT_PRE_EMPHASIS)
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::with_pre_emphasis(config.pre_emphasis)
    }

    pub fn with_pre_emphasis(pre_emphasis: f64) -> Self {
        Self {
            window: HammingWindow::new(FRAME_SIZE_SAMPLES, FFT_SIZE),
            fft: RecursiveFft::new(),
            filter_bank: MelFilterBank::new(),
            dct: Dct::new(NUM_FILTER_BANKS),
            pre_emphasis: T::lit(pre_emphasis),
        }
    }

    pub fn pre_emphasis(&self) -> T {
        self.pre_emphasis
    }

    pub fn window(&self) -> &HammingWindow<T> {
        &self.window
    }

    pub fn fft(&self) -> &RecursiveFft<T> {
        &self.fft
    }

    pub fn filter_bank(&self) -> &MelFilterBank<T> {
        &self.filter_bank
    }

    pub fn dct(&self) -> &Dct<T> {
        &self.dct
    }

    /// Windowed 512-point complex spectrum of one frame
    pub fn spectrum(&self, frame: &[T]) -> Result<Vec<T>, DspError> {
        let windowed = self.window.apply(frame, self.pre_emphasis)?;
        self.fft.transform(&windowed)
    }

    /// 256-point log power spectrum only (no Mel/DCT)
    pub fn spectral_density(&self, frame: &[T]) -> Result<Vec<T>, DspError> {
        let spectrum = self.spectrum(frame)?;
        Self::power_spectrum(&spectrum)
    }

    /// 27 cepstral coefficients only
    pub fn generate_mfcc(&self, frame: &[T]) -> Result<Vec<T>, DspError> {
        let spectrum = self.spectrum(frame)?;
        self.cepstrum(&spectrum)
    }

    /// 27 cepstral coefficients followed by the 256-point power spectrum
    pub fn generate_mfcc_and_power_spectrum(&self, frame: &[T]) -> Result<MfccFrame<T>, DspError> {
        let spectrum = self.spectrum(frame)?;
        let cepstrum = self.cepstrum(&spectrum)?;
        let power = Self::power_spectrum(&spectrum)?;
        Ok(MfccFrame::from_parts(&cepstrum, &power))
    }

    /// `max(0, log10(re² + im²)) / 10` for the first 256 points of a
    /// 512-point complex spectrum
    pub fn power_spectrum(spectrum: &[T]) -> Result<Vec<T>, DspError> {
        if spectrum.len() != FFT_SIZE * 2 {
            return Err(DspError::invalid_length(
                "power_spectrum",
                FFT_SIZE * 2,
                spectrum.len(),
            ));
        }

        let ten = T::lit(10.0);
        let power = spectrum
            .chunks_exact(2)
            .take(NUM_POWER_BINS)
            .map(|point| {
                let power = point[0] * point[0] + point[1] * point[1];
                T::zero().max(power.log10() / ten)
            })
            .collect();
        Ok(power)
    }

    fn cepstrum(&self, spectrum: &[T]) -> Result<Vec<T>, DspError> {
        let half = &spectrum[..NUM_POWER_BINS * 2];
        let log_mel = self.filter_bank.log_energies(half)?;
        self.dct.transform(&log_mel)
    }
}

#[cfg(test)]
mod tests;
