//! Loading sounds from disk and tracking their pitch
//!
//! WAV fixtures are written with hound into the system temp directory so the
//! tests do not depend on checked-in audio.

use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use pitch_track::{DetectOptions, PitchError, PitchMethod, Sound};

fn temp_wav(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("pitch-track-{}-{}.wav", name, std::process::id()))
}

fn write_tone(path: &Path, frequency: f64, sample_rate: u32, channels: u16, seconds: f64) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    let n = (seconds * sample_rate as f64) as usize;
    for i in 0..n {
        let t = i as f64 / sample_rate as f64;
        let value = (0.5 * (2.0 * std::f64::consts::PI * frequency * t).sin() * i16::MAX as f64) as i16;
        for _ in 0..channels {
            writer.write_sample(value).unwrap();
        }
    }
    writer.finalize().unwrap();
}

#[test]
fn test_load_mono_wav() {
    let path = temp_wav("mono");
    write_tone(&path, 220.0, 16000, 1, 0.5);

    let sound = Sound::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(sound.sample_rate(), 16000.0);
    assert_eq!(sound.num_samples(), 8000);
    let peak = sound.samples().iter().fold(0.0_f64, |m, s| m.max(s.abs()));
    assert_relative_eq!(peak, 0.5, epsilon = 0.01);
}

#[test]
fn test_stereo_wav_is_averaged() {
    let path = temp_wav("stereo");
    write_tone(&path, 220.0, 16000, 2, 0.25);

    let sound = Sound::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    // Both channels carry the same tone, so the mix keeps its amplitude
    assert_eq!(sound.num_samples(), 4000);
    let peak = sound.samples().iter().fold(0.0_f64, |m, s| m.max(s.abs()));
    assert_relative_eq!(peak, 0.5, epsilon = 0.01);
}

#[test]
fn test_pitch_of_loaded_file() {
    let path = temp_wav("pitch");
    write_tone(&path, 330.0, 22050, 1, 1.0);

    let sound = Sound::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    for method in [PitchMethod::Yin, PitchMethod::YinFft] {
        let options = DetectOptions::default().with_method(method).with_buffer_size(1024);
        let track = sound.detect_pitch(&options).unwrap();

        assert_eq!(track.len(), 22050 / 1024);
        for value in track.values() {
            assert_relative_eq!(value.unwrap(), 330.0, epsilon = 5.0);
        }
    }
}

#[test]
fn test_garbage_file_is_an_error() {
    let path = std::env::temp_dir().join(format!("pitch-track-garbage-{}.ogg", std::process::id()));
    std::fs::write(&path, b"definitely not audio").unwrap();

    let result = Sound::from_file(&path);
    std::fs::remove_file(&path).ok();

    assert!(matches!(result, Err(PitchError::Decode(_))));
}
