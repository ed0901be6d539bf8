// Mel module - triangular Mel filterbank over the 256-bin power spectrum
//
// Construction places NUM_FILTER_BANKS + 2 boundaries evenly on the Mel
// scale between 300 Hz and 8 kHz and maps every power bin onto at most two
// filters with linear interpolation weights. Per call, the bin powers are
// accumulated into the filters, floored and log-compressed.

use crate::analysis::constants::{
    FILTER_BANK_MAX_FREQ_HZ, FILTER_BANK_MIN_FREQ_HZ, MEL_ENERGY_FLOOR, NUM_FILTER_BANKS,
    NUM_POWER_BINS, SAMPLE_RATE_HZ,
};
use crate::error::DspError;
use crate::sample::Sample;

/// One (filter, weight) contribution of a power bin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterTap<T> {
    pub filter: usize,
    pub weight: T,
}

/// Filters a single power bin contributes to
///
/// `None` marks "no contribution". Bins on the outer ramps of the first and
/// last filter only have `first`; interior bins split their power between the
/// trailing edge of one filter and the leading edge of the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterMapEntry<T> {
    pub first: Option<FilterTap<T>>,
    pub second: Option<FilterTap<T>>,
}

impl<T: Sample> FilterMapEntry<T> {
    fn unmapped() -> Self {
        Self {
            first: None,
            second: None,
        }
    }

    fn single(filter: usize, weight: T) -> Self {
        Self {
            first: Some(FilterTap { filter, weight }),
            second: None,
        }
    }

    fn split(filter: usize, weight: T) -> Self {
        Self {
            first: Some(FilterTap { filter, weight }),
            second: Some(FilterTap {
                filter: filter + 1,
                weight: T::one() - weight,
            }),
        }
    }

    pub fn is_mapped(&self) -> bool {
        self.first.is_some()
    }

    pub fn taps(&self) -> impl Iterator<Item = FilterTap<T>> {
        self.first.into_iter().chain(self.second)
    }
}

/// Mel filterbank with a precomputed bin-to-filter map
#[derive(Debug, Clone, PartialEq)]
pub struct MelFilterBank<T: Sample> {
    filter_map: Vec<FilterMapEntry<T>>,
    boundaries_mel: Vec<T>,
    interval_mel: T,
}

impl<T: Sample> Default for MelFilterBank<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample> MelFilterBank<T> {
    pub fn new() -> Self {
        let min_mel = freq_to_mel(T::lit(FILTER_BANK_MIN_FREQ_HZ));
        let max_mel = freq_to_mel(T::lit(FILTER_BANK_MAX_FREQ_HZ));
        let interval_mel = (max_mel - min_mel) / T::lit(NUM_FILTER_BANKS as f64 + 1.0);

        let boundaries_mel: Vec<T> = (0..NUM_FILTER_BANKS + 2)
            .map(|i| min_mel + T::lit(i as f64) * interval_mel)
            .collect();

        let filter_map = (0..NUM_POWER_BINS)
            .map(|bin| map_bin(freq_to_mel(bin_to_freq(bin)), &boundaries_mel, interval_mel))
            .collect();

        Self {
            filter_map,
            boundaries_mel,
            interval_mel,
        }
    }

    pub fn filter_map(&self) -> &[FilterMapEntry<T>] {
        &self.filter_map
    }

    pub fn boundaries_mel(&self) -> &[T] {
        &self.boundaries_mel
    }

    pub fn interval_mel(&self) -> T {
        self.interval_mel
    }

    /// Frequency (Hz) at which each filter's weight peaks
    ///
    /// Filter 0 only has a rising ramp, topping out at the second boundary;
    /// every other filter `j` peaks at boundary `j`.
    pub fn center_frequencies(&self) -> Vec<T> {
        (0..NUM_FILTER_BANKS)
            .map(|filter| mel_to_freq(self.boundaries_mel[filter.max(1)]))
            .collect()
    }

    /// Log filter energies from the first half of the FFT output
    ///
    /// `half_spectrum` holds 256 complex points as (re, im) pairs.
    pub fn log_energies(&self, half_spectrum: &[T]) -> Result<Vec<T>, DspError> {
        let expected = self.filter_map.len() * 2;
        if half_spectrum.len() != expected {
            return Err(DspError::invalid_length(
                "mel_filterbank",
                expected,
                half_spectrum.len(),
            ));
        }

        let mut energies = vec![T::zero(); NUM_FILTER_BANKS];
        for (entry, point) in self.filter_map.iter().zip(half_spectrum.chunks_exact(2)) {
            let power = point[0] * point[0] + point[1] * point[1];
            for tap in entry.taps() {
                energies[tap.filter] += power * tap.weight;
            }
        }

        let floor = T::lit(MEL_ENERGY_FLOOR);
        for energy in energies.iter_mut() {
            *energy = energy.max(floor).ln();
        }

        Ok(energies)
    }
}

fn map_bin<T: Sample>(mel: T, boundaries: &[T], interval: T) -> FilterMapEntry<T> {
    let last = NUM_FILTER_BANKS;

    if mel < boundaries[0] || boundaries[last] < mel {
        FilterMapEntry::unmapped()
    } else if mel < boundaries[1] {
        FilterMapEntry::single(0, (mel - boundaries[0]) / interval)
    } else if boundaries[last - 1] <= mel && mel < boundaries[last] {
        FilterMapEntry::single(last - 1, (boundaries[last] - mel) / interval)
    } else {
        (1..last - 1)
            .find(|&j| boundaries[j] <= mel && mel < boundaries[j + 1])
            .map(|j| FilterMapEntry::split(j, (boundaries[j + 1] - mel) / interval))
            .unwrap_or_else(FilterMapEntry::unmapped)
    }
}

/// Linear frequency of a power bin: `bin * (sample_rate / 2) / num_bins`.
pub fn bin_to_freq<T: Sample>(bin: usize) -> T {
    let half_rate = T::lit(f64::from(SAMPLE_RATE_HZ) / 2.0);
    (half_rate / T::lit(NUM_POWER_BINS as f64)) * T::lit(bin as f64)
}

pub fn freq_to_mel<T: Sample>(freq: T) -> T {
    T::lit(1125.0) * (T::one() + freq / T::lit(700.0)).ln()
}

pub fn mel_to_freq<T: Sample>(mel: T) -> T {
    T::lit(700.0) * ((mel / T::lit(1125.0)).exp() - T::one())
}
