use super::*;

/// Generate a 400-sample sine frame at 16 kHz
fn sine_frame<T: Sample>(frequency: f64, amplitude: f64) -> Vec<T> {
    (0..FRAME_SIZE_SAMPLES)
        .map(|i| {
            let t = i as f64 / f64::from(SAMPLE_RATE_HZ);
            T::lit(amplitude * (2.0 * std::f64::consts::PI * frequency * t).sin())
        })
        .collect()
}

fn argmax<T: Sample>(values: &[T]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, T::neg_infinity()), |best, (i, &v)| {
            if v > best.1 {
                (i, v)
            } else {
                best
            }
        })
        .0
}

#[test]
fn test_output_vector_layout() {
    let processor = MfccProcessor::<f32>::new();
    let frame = sine_frame::<f32>(440.0, 3000.0);
    let out = processor.generate_mfcc_and_power_spectrum(&frame).unwrap();

    assert_eq!(out.as_slice().len(), OUTPUT_VECTOR_LEN);
    assert_eq!(out.cepstrum().len(), NUM_CEPSTRAL_COEFFS);
    assert_eq!(out.power_spectrum().len(), NUM_POWER_BINS);
}

#[test]
fn test_partial_paths_agree_with_combined_output() {
    let processor = MfccProcessor::<f64>::new();
    let frame = sine_frame::<f64>(2500.0, 8000.0);
    let combined = processor.generate_mfcc_and_power_spectrum(&frame).unwrap();

    let mfcc = processor.generate_mfcc(&frame).unwrap();
    let density = processor.spectral_density(&frame).unwrap();

    assert_eq!(combined.cepstrum(), mfcc.as_slice());
    assert_eq!(combined.power_spectrum(), density.as_slice());
}

#[test]
fn test_processing_is_pure() {
    let processor = MfccProcessor::<f32>::new();
    let frame = sine_frame::<f32>(1200.0, 5000.0);
    let first = processor.generate_mfcc_and_power_spectrum(&frame).unwrap();
    let _other = processor
        .generate_mfcc_and_power_spectrum(&sine_frame::<f32>(300.0, 100.0))
        .unwrap();
    let second = processor.generate_mfcc_and_power_spectrum(&frame).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_silence_gives_zero_vector() {
    let processor = MfccProcessor::<f32>::new();
    let out = processor
        .generate_mfcc_and_power_spectrum(&[0.0; FRAME_SIZE_SAMPLES])
        .unwrap();
    // log10(0) clamps to 0 and every filter sits on the ln(1) floor
    assert!(out.as_slice().iter().all(|&v| v == 0.0));
}

#[test]
fn test_power_spectrum_is_non_negative_and_peaks_at_tone() {
    let processor = MfccProcessor::<f64>::new();
    let frame = sine_frame::<f64>(1000.0, 10_000.0);
    let density = processor.spectral_density(&frame).unwrap();

    assert!(density.iter().all(|&v| v >= 0.0));
    assert_eq!(argmax(&density), 32);
}

#[test]
fn test_power_spectrum_formula() {
    let mut spectrum = vec![0.0_f64; FFT_SIZE * 2];
    spectrum[0] = 100.0; // power 1e4 → log10 = 4
    spectrum[2] = 0.5; // power 0.25 → negative log, clamped
    spectrum[5] = 10.0; // imaginary only, power 100
    let power = MfccProcessor::<f64>::power_spectrum(&spectrum).unwrap();

    assert_eq!(power.len(), NUM_POWER_BINS);
    assert!((power[0] - 0.4).abs() < 1e-12);
    assert_eq!(power[1], 0.0);
    assert!((power[2] - 0.2).abs() < 1e-12);
    assert_eq!(power[3], 0.0);
}

#[test]
fn test_power_spectrum_rejects_wrong_length() {
    for len in [20, FFT_SIZE * 2 - 1, FFT_SIZE, FFT_SIZE * 2 + 2] {
        let err = MfccProcessor::<f64>::power_spectrum(&vec![1.0; len]).unwrap_err();
        assert_eq!(
            err,
            DspError::InvalidArgument {
                stage: "power_spectrum",
                expected: FFT_SIZE * 2,
                actual: len,
            }
        );
    }
}

#[test]
fn test_precisions_agree() {
    let single = MfccProcessor::<f32>::new();
    let double = MfccProcessor::<f64>::new();
    let out32 = single
        .generate_mfcc_and_power_spectrum(&sine_frame::<f32>(700.0, 4000.0))
        .unwrap();
    let out64 = double
        .generate_mfcc_and_power_spectrum(&sine_frame::<f64>(700.0, 4000.0))
        .unwrap();

    for (i, (a, b)) in out32.as_slice().iter().zip(out64.as_slice()).enumerate() {
        let tolerance = 1e-2 * b.abs().max(1.0);
        assert!(
            (f64::from(*a) - b).abs() < tolerance,
            "value {} diverges: f32 {} vs f64 {}",
            i,
            a,
            b
        );
    }
}

#[test]
fn test_pre_emphasis_from_config() {
    let config = PipelineConfig { pre_emphasis: 0.5 };
    let processor = MfccProcessor::<f64>::from_config(&config);
    assert_eq!(processor.pre_emphasis(), 0.5);
    assert!((MfccProcessor::<f32>::new().pre_emphasis() - 0.96).abs() < 1e-7);
}

#[test]
fn test_display_normalization_only_touches_cepstrum() {
    let processor = MfccProcessor::<f32>::new();
    let out = processor
        .generate_mfcc_and_power_spectrum(&sine_frame::<f32>(900.0, 2000.0))
        .unwrap();
    let display = DisplayConfig::default();
    let normalized = out.normalized_for_display(&display);

    for (raw, scaled) in out.cepstrum().iter().zip(normalized.cepstrum()) {
        assert!((raw / 5.0 + 0.5 - scaled).abs() < 1e-6);
    }
    assert_eq!(out.power_spectrum(), normalized.power_spectrum());
}

#[test]
fn test_invalid_frame_length_is_call_local() {
    let processor = MfccProcessor::<f32>::new();
    let err = processor
        .generate_mfcc_and_power_spectrum(&[0.0; 512])
        .unwrap_err();
    assert!(matches!(
        err,
        DspError::InvalidArgument {
            stage: "hamming_window",
            ..
        }
    ));

    // The instance keeps working after a failed call
    assert!(processor
        .generate_mfcc_and_power_spectrum(&[0.0; FRAME_SIZE_SAMPLES])
        .is_ok());
}

#[test]
fn test_processor_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<MfccProcessor<f32>>();
    assert_send_sync::<MfccProcessor<f64>>();
}
