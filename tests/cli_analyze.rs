use std::path::PathBuf;
use std::process::Command;

use serde_json::Value;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mfcc_cli"))
}

fn temp_wav(name: &str, sample_rate: u32, samples: &[i16]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("mfcc_cli_{}_{}.wav", name, std::process::id()));
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).expect("create wav");
    for &sample in samples {
        writer.write_sample(sample).expect("write sample");
    }
    writer.finalize().expect("finalize wav");
    path
}

#[test]
fn analyze_synthetic_sine_summary() {
    let output = cli()
        .args([
            "analyze",
            "--synthetic",
            "sine",
            "--frequency",
            "1000",
            "--duration-ms",
            "500",
            "--format",
            "summary",
        ])
        .output()
        .expect("failed to run mfcc_cli analyze");
    assert!(
        output.status.success(),
        "CLI exited with {:?}",
        output.status.code()
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    let json: Value = serde_json::from_str(stdout.trim()).expect("summary JSON payload");
    assert_eq!(json["frames"], 20);
    assert_eq!(json["samples_consumed"], 8000);
    assert_eq!(json["samples_left_over"], 0);
    assert_eq!(json["peak_power_bin"], 32);
    assert_eq!(json["mean_cepstrum"].as_array().map(Vec::len), Some(27));
}

#[test]
fn analyze_wav_emits_json_lines() {
    let samples: Vec<i16> = (0..1000).map(|i| ((i % 50) * 100) as i16).collect();
    let path = temp_wav("lines", 16_000, &samples);

    let output = cli()
        .args(["analyze", "--wav"])
        .arg(&path)
        .args(["--chunk-size", "333"])
        .output()
        .expect("failed to run mfcc_cli analyze --wav");
    let _ = std::fs::remove_file(&path);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    let lines: Vec<Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("frame JSON"))
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1]["index"], 1);
    assert_eq!(lines[0]["cepstrum"].as_array().map(Vec::len), Some(27));
    assert_eq!(lines[0]["power_spectrum"].as_array().map(Vec::len), Some(256));
}

#[test]
fn analyze_rejects_wrong_sample_rate() {
    let path = temp_wav("rate", 44_100, &[0; 800]);

    let output = cli()
        .args(["analyze", "--wav"])
        .arg(&path)
        .output()
        .expect("failed to run mfcc_cli analyze --wav");
    let _ = std::fs::remove_file(&path);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(stderr.contains("16000 Hz"), "unexpected stderr: {stderr}");
}

#[test]
fn constants_lists_design_sizes() {
    let output = cli()
        .arg("constants")
        .output()
        .expect("failed to run mfcc_cli constants");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("constants JSON");
    assert_eq!(json["sample_rate_hz"], 16_000);
    assert_eq!(json["frame_size_samples"], 400);
    assert_eq!(json["output_vector_len"], 283);
}
