/*!
 * PCM audio buffers and WAV artifact I/O.
 *
 * Synthesis engines hand back WAV artifacts; this module decodes them into
 * in-memory buffers, lets the pipeline concatenate them in narration order,
 * and writes the assembled waveform back out for encoding.
 */

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::errors::AudioError;

/// Interleaved 16-bit PCM audio with its sample format.
///
/// A freshly created buffer has no format; it adopts the format of the first
/// buffer appended to it. Appending audio with a different sample rate or
/// channel count is an error, since the pipeline never resamples.
#[derive(Debug, Clone, Default)]
pub struct AudioBuffer {
    /// Interleaved samples, `channels` per frame
    samples: Vec<i16>,
    /// Sample rate in Hz, 0 until the format is known
    sample_rate: u32,
    /// Channel count, 0 until the format is known
    channels: u16,
}

impl AudioBuffer {
    /// Create an empty buffer with no format yet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a buffer of silence with the given duration and format.
    pub fn silence(duration_ms: u64, sample_rate: u32, channels: u16) -> Self {
        let frames = duration_ms * u64::from(sample_rate) / 1000;
        Self {
            samples: vec![0; (frames * u64::from(channels)) as usize],
            sample_rate,
            channels,
        }
    }

    /// Whether the buffer holds no audio.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample rate in Hz (0 while the buffer is empty and formatless).
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel count (0 while the buffer is empty and formatless).
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> u64 {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() as u64 / u64::from(self.channels)
    }

    /// Duration of the buffered audio in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.frames() * 1000 / u64::from(self.sample_rate)
    }

    /// Append another buffer's audio to this one.
    ///
    /// An empty, formatless buffer adopts the format of the appended audio.
    pub fn append(&mut self, other: &AudioBuffer) -> Result<(), AudioError> {
        if other.is_empty() {
            return Ok(());
        }

        if self.sample_rate == 0 && self.channels == 0 {
            self.sample_rate = other.sample_rate;
            self.channels = other.channels;
        } else if self.sample_rate != other.sample_rate || self.channels != other.channels {
            return Err(AudioError::FormatMismatch {
                expected_rate: self.sample_rate,
                expected_channels: self.channels,
                actual_rate: other.sample_rate,
                actual_channels: other.channels,
            });
        }

        self.samples.extend_from_slice(&other.samples);
        Ok(())
    }

    /// Decode a WAV file into a buffer.
    ///
    /// Accepts 16-bit integer and 32-bit float PCM, the formats the supported
    /// engines emit; float samples are converted to i16.
    pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<Self, AudioError> {
        let mut reader = WavReader::open(path.as_ref())
            .map_err(|e| AudioError::Decode(format!("{:?}: {}", path.as_ref(), e)))?;
        let spec = reader.spec();

        let samples: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Int, 16) => reader
                .samples::<i16>()
                .collect::<Result<_, _>>()
                .map_err(|e| AudioError::Decode(e.to_string()))?,
            (SampleFormat::Float, 32) => reader
                .samples::<f32>()
                .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16))
                .collect::<Result<_, _>>()
                .map_err(|e| AudioError::Decode(e.to_string()))?,
            (format, bits) => {
                return Err(AudioError::Decode(format!(
                    "unsupported WAV sample format: {:?} {} bit",
                    format, bits
                )));
            }
        };

        Ok(Self {
            samples,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        })
    }

    /// Encode the buffer to a 16-bit PCM WAV file.
    pub fn write_wav<P: AsRef<Path>>(&self, path: P) -> Result<(), AudioError> {
        if self.sample_rate == 0 || self.channels == 0 {
            return Err(AudioError::Encode(
                "cannot write a formatless audio buffer".to_string(),
            ));
        }

        let spec = WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut writer = WavWriter::create(path.as_ref(), spec)
            .map_err(|e| AudioError::Encode(format!("{:?}: {}", path.as_ref(), e)))?;
        for &sample in &self.samples {
            writer
                .write_sample(sample)
                .map_err(|e| AudioError::Encode(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| AudioError::Encode(e.to_string()))?;

        Ok(())
    }
}
