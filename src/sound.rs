//! Mono signal container
//!
//! A [`Sound`] pairs a sample buffer with its rate. Pitch tracking only reads
//! slices, so a `Sound` is a convenience for loading files, synthesising
//! test signals and joining segments. Decoded files with several channels
//! are averaged to mono.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::{PitchError, Result};

/// Mono samples at a fixed rate
#[derive(Debug, Clone, PartialEq)]
pub struct Sound {
    samples: Vec<f64>,
    sample_rate: f64,
}

impl Sound {
    /// Copy `samples` into a new sound
    ///
    /// # Example
    /// ```
    /// use pitch_track::Sound;
    ///
    /// let sound = Sound::from_samples(&[0.0, 0.25, 0.0, -0.25], 8000.0);
    /// assert_eq!(sound.num_samples(), 4);
    /// assert_eq!(sound.duration(), 0.0005);
    /// ```
    pub fn from_samples(samples: &[f64], sample_rate: f64) -> Self {
        Self::from_samples_owned(samples.to_vec(), sample_rate)
    }

    /// Wrap `samples` without copying
    pub fn from_samples_owned(samples: Vec<f64>, sample_rate: f64) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Decode an audio file (WAV, FLAC, MP3, OGG/Vorbis, ...)
    ///
    /// WAV files symphonia rejects are retried with hound.
    ///
    /// # Errors
    /// `Io` when the file cannot be opened, `Decode` or `WavDecode` when its
    /// contents cannot be decoded.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let err = match decode_with_symphonia(path) {
            Ok(sound) => return Ok(sound),
            Err(err) => err,
        };

        let is_wav = path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("wav"));
        if !is_wav || matches!(err, PitchError::Io(_)) {
            return Err(err);
        }

        log::warn!(
            "symphonia could not read {} ({}), falling back to hound",
            path.display(),
            err
        );
        decode_with_hound(path)
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    /// Length in seconds
    pub fn duration(&self) -> f64 {
        self.num_samples() as f64 / self.sample_rate
    }

    /// Sine wave of `frequency` Hz lasting `duration` seconds
    ///
    /// `amplitude` is the peak value and `phase` the starting phase in
    /// radians.
    pub fn create_tone(
        frequency: f64,
        duration: f64,
        sample_rate: f64,
        amplitude: f64,
        phase: f64,
    ) -> Sound {
        let step = std::f64::consts::TAU * frequency / sample_rate;
        let samples = (0..sample_count(duration, sample_rate))
            .map(|n| amplitude * (phase + step * n as f64).sin())
            .collect();
        Self::from_samples_owned(samples, sample_rate)
    }

    /// All-zero signal lasting `duration` seconds
    pub fn create_silence(duration: f64, sample_rate: f64) -> Sound {
        Self::from_samples_owned(vec![0.0; sample_count(duration, sample_rate)], sample_rate)
    }

    /// Append another sound recorded at the same sample rate
    ///
    /// # Errors
    /// `InvalidParameter` if the sample rates differ.
    pub fn concat(&self, other: &Sound) -> Result<Sound> {
        if self.sample_rate != other.sample_rate {
            return Err(PitchError::InvalidParameter(format!(
                "cannot join sounds at {} Hz and {} Hz",
                self.sample_rate, other.sample_rate
            )));
        }
        let mut samples = Vec::with_capacity(self.samples.len() + other.samples.len());
        samples.extend_from_slice(&self.samples);
        samples.extend_from_slice(&other.samples);
        Ok(Self::from_samples_owned(samples, self.sample_rate))
    }
}

fn sample_count(duration: f64, sample_rate: f64) -> usize {
    (duration * sample_rate).round() as usize
}

fn decode_with_symphonia(path: &Path) -> Result<Sound> {
    let source = MediaSourceStream::new(Box::new(File::open(path)?), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(ext);
    }

    let mut reader = symphonia::default::get_probe()
        .format(
            &hint,
            source,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| PitchError::Decode(format!("unrecognised audio format: {}", e)))?
        .format;

    let (track_id, params) = reader
        .default_track()
        .map(|track| (track.id, track.codec_params.clone()))
        .ok_or_else(|| PitchError::Decode("file has no audio track".to_string()))?;

    let sample_rate = params
        .sample_rate
        .ok_or_else(|| PitchError::Decode("sample rate not declared".to_string()))?
        as f64;
    let channels = params.channels.map_or(1, |c| c.count()).max(1);

    let mut decoder = symphonia::default::get_codecs()
        .make(&params, &DecoderOptions::default())
        .map_err(|e| PitchError::Decode(format!("no decoder for track: {}", e)))?;

    let samples = read_track(reader.as_mut(), decoder.as_mut(), track_id, channels)?;

    log::debug!(
        "decoded {}: {} Hz, {} channel(s), {} mono samples",
        path.display(),
        sample_rate,
        channels,
        samples.len()
    );
    Ok(Sound::from_samples_owned(samples, sample_rate))
}

/// Decode every packet of `track_id` into mono samples
fn read_track(
    reader: &mut dyn FormatReader,
    decoder: &mut dyn Decoder,
    track_id: u32,
    channels: usize,
) -> Result<Vec<f64>> {
    let mut samples = Vec::new();

    loop {
        let packet = match reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Ok(samples)
            }
            Err(e) => return Err(PitchError::Decode(format!("bad packet: {}", e))),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let audio = match decoder.decode(&packet) {
            Ok(audio) => audio,
            Err(SymphoniaError::DecodeError(e)) => {
                log::warn!("skipping corrupt packet: {}", e);
                continue;
            }
            Err(e) => return Err(PitchError::Decode(e.to_string())),
        };

        let mut interleaved = SampleBuffer::<f32>::new(audio.frames() as u64, *audio.spec());
        interleaved.copy_interleaved_ref(audio);
        samples.extend(downmix(interleaved.samples(), channels, f64::from));
    }
}

fn decode_with_hound(path: &Path) -> Result<Sound> {
    let wav = hound::WavReader::open(path)?;
    let format = wav.spec();
    let channels = usize::from(format.channels).max(1);

    let samples = if format.sample_format == hound::SampleFormat::Float {
        let raw = wav
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        downmix(&raw, channels, f64::from)
    } else {
        let full_scale = (1_i64 << (format.bits_per_sample - 1)) as f64;
        let raw = wav
            .into_samples::<i32>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        downmix(&raw, channels, |s| f64::from(s) / full_scale)
    };

    Ok(Sound::from_samples_owned(samples, f64::from(format.sample_rate)))
}

/// Average interleaved frames of `channels` samples into one mono stream
fn downmix<T: Copy>(interleaved: &[T], channels: usize, to_f64: impl Fn(T) -> f64) -> Vec<f64> {
    if channels == 1 {
        return interleaved.iter().map(|&s| to_f64(s)).collect();
    }
    interleaved
        .chunks(channels)
        .map(|chunk| chunk.iter().map(|&s| to_f64(s)).sum::<f64>() / channels as f64)
        .collect()
}
