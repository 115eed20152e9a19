//! WAV file I/O for the session host
//!
//! Probing media length on insert, decoding sources for loudness
//! measurement, and rendering glued clips. Samples are handled as
//! interleaved 32-bit float; renders are written as 32-bit float WAV.

use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{Result, VaError};

/// Header facts about a WAV file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    /// Sample frames (samples per channel)
    pub frames: u32,
}

impl WavInfo {
    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames as f64 / self.sample_rate as f64
    }
}

/// Decoded interleaved audio
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub info: WavInfo,
    pub samples: Vec<f32>,
}

/// One source placed inside a glued render
#[derive(Debug, Clone)]
pub struct GluePart {
    pub path: PathBuf,
    /// Offset of the part from the start of the render, in seconds
    pub offset_secs: f64,
}

fn invalid(path: &Path, reason: impl Into<String>, source: Option<hound::Error>) -> VaError {
    VaError::InvalidAudio {
        path: path.to_path_buf(),
        reason: reason.into(),
        source,
    }
}

fn open(path: &Path) -> Result<WavReader<std::io::BufReader<std::fs::File>>> {
    WavReader::open(path).map_err(|e| invalid(path, "failed to open WAV file", Some(e)))
}

fn info_from(spec: WavSpec, frames: u32) -> WavInfo {
    WavInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        frames,
    }
}

/// Read only the header of a WAV file
pub fn probe_wav(path: &Path) -> Result<WavInfo> {
    let reader = open(path)?;
    Ok(info_from(reader.spec(), reader.duration()))
}

/// Decode a WAV file to interleaved f32 samples in [-1.0, 1.0]
pub fn read_wav(path: &Path) -> Result<DecodedAudio> {
    let reader = open(path)?;
    let spec = reader.spec();
    let frames = reader.duration();
    let samples = read_samples_as_f32(path, reader, spec.bits_per_sample, spec.sample_format)?;
    Ok(DecodedAudio {
        info: info_from(spec, frames),
        samples,
    })
}

fn read_samples_as_f32<R: std::io::Read>(
    path: &Path,
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    let scale = match (sample_format, bits_per_sample) {
        (SampleFormat::Float, _) => {
            return reader
                .samples::<f32>()
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| invalid(path, "failed to read float samples", Some(e)));
        }
        (SampleFormat::Int, 8) => 128.0,
        (SampleFormat::Int, 16) => 32768.0,
        // 24-bit is stored as i32 in hound
        (SampleFormat::Int, 24) => 8388608.0,
        (SampleFormat::Int, 32) => 2147483648.0,
        (SampleFormat::Int, bits) => {
            return Err(invalid(path, format!("unsupported bit depth: {}", bits), None));
        }
    };

    reader
        .samples::<i32>()
        .map(|s| s.map(|v| v as f32 / scale))
        .collect::<std::result::Result<Vec<f32>, _>>()
        .map_err(|e| {
            let reason = format!("failed to read {}-bit samples", bits_per_sample);
            invalid(path, reason, Some(e))
        })
}

/// Write interleaved f32 samples as a 32-bit float WAV
pub fn write_wav_f32(path: &Path, sample_rate: u32, channels: u16, samples: &[f32]) -> Result<()> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)
        .map_err(|e| invalid(path, "failed to create WAV file", Some(e)))?;
    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| invalid(path, "failed to write sample", Some(e)))?;
    }
    writer
        .finalize()
        .map_err(|e| invalid(path, "failed to finalize WAV file", Some(e)))?;

    Ok(())
}

/// Render several sources into one file covering `span_secs`.
///
/// Parts are summed where they overlap and gaps stay silent. Every part
/// must share the first part's sample rate and channel count.
pub fn render_glued(parts: &[GluePart], span_secs: f64, out_path: &Path) -> Result<WavInfo> {
    let first = parts.first().ok_or_else(|| VaError::IncompatibleMedia {
        reason: "nothing to render".to_string(),
    })?;
    let first_info = probe_wav(&first.path)?;
    let sample_rate = first_info.sample_rate;
    let channels = first_info.channels as usize;

    let total_frames = (span_secs * sample_rate as f64).round().max(0.0) as usize;
    let mut mix = vec![0.0f32; total_frames * channels];

    for part in parts {
        let decoded = read_wav(&part.path)?;
        if decoded.info.sample_rate != first_info.sample_rate
            || decoded.info.channels != first_info.channels
        {
            return Err(VaError::IncompatibleMedia {
                reason: format!(
                    "{} is {} Hz / {} ch, expected {} Hz / {} ch",
                    part.path.display(),
                    decoded.info.sample_rate,
                    decoded.info.channels,
                    first_info.sample_rate,
                    first_info.channels
                ),
            });
        }

        let offset = (part.offset_secs * sample_rate as f64).round().max(0.0) as usize * channels;
        for (i, sample) in decoded.samples.iter().enumerate() {
            match mix.get_mut(offset + i) {
                Some(slot) => *slot += sample,
                None => break,
            }
        }
    }

    write_wav_f32(out_path, sample_rate, first_info.channels, &mix)?;

    Ok(WavInfo {
        sample_rate,
        channels: first_info.channels,
        frames: total_frames as u32,
    })
}

/// Write a sine test tone as a 16-bit WAV. Used by tests and fixtures.
pub fn write_test_tone(
    path: &Path,
    amplitude: f32,
    duration_secs: f64,
    sample_rate: u32,
) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)
        .map_err(|e| invalid(path, "failed to create WAV file", Some(e)))?;
    let frames = (duration_secs * sample_rate as f64).round() as usize;
    for i in 0..frames {
        let t = i as f64 / sample_rate as f64;
        let value = amplitude * (2.0 * std::f64::consts::PI * 440.0 * t).sin() as f32;
        let scaled = (value * 32767.0).clamp(-32768.0, 32767.0) as i16;
        writer
            .write_sample(scaled)
            .map_err(|e| invalid(path, "failed to write sample", Some(e)))?;
    }
    writer
        .finalize()
        .map_err(|e| invalid(path, "failed to finalize WAV file", Some(e)))?;
    Ok(())
}
