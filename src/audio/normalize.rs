// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Sample normalization.
//!
//! Every sample is converted to the target layout (mono, fixed rate, 16-bit PCM WAV)
//! before it is embedded. Normalization never fails the caller: anything that can't be
//! converted is handed back untouched with the reason attached.

use std::fmt;
use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::{debug, warn};

use super::decode::decode_bytes;
use super::error::NormalizeError;
use super::format::TargetFormat;
use super::transcoder::{downmix_to_mono, resample_mono};

/// What happened to a sample on its way through the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalization {
    /// Converted to the target format and re-encoded.
    Normalized {
        source_channels: u16,
        source_rate: u32,
    },
    /// Already in the target layout; the original bytes are kept.
    AlreadyNormalized,
    /// Normalization is turned off; the original bytes are kept.
    Passthrough,
    /// Conversion failed; the original bytes are kept.
    Fallback { reason: String },
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Normalization::Normalized {
                source_channels,
                source_rate,
            } => write!(f, "converted from {}Hz/{}ch", source_rate, source_channels),
            Normalization::AlreadyNormalized => write!(f, "already normalized"),
            Normalization::Passthrough => write!(f, "embedded as-is"),
            Normalization::Fallback { reason } => write!(f, "embedded as-is ({})", reason),
        }
    }
}

/// The bytes of one sample, ready to be encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAudio {
    bytes: Vec<u8>,
    normalization: Normalization,
}

impl NormalizedAudio {
    pub fn new(bytes: Vec<u8>, normalization: Normalization) -> Self {
        Self {
            bytes,
            normalization,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn normalization(&self) -> &Normalization {
        &self.normalization
    }

    /// True if the shipped bytes are the file's original bytes.
    pub fn is_original(&self) -> bool {
        !matches!(self.normalization, Normalization::Normalized { .. })
    }
}

/// Converts raw audio file bytes into the bytes that get embedded.
pub trait Normalizer {
    /// Normalizes one file. `extension` is a format hint, e.g. "wav".
    fn normalize(&self, bytes: Vec<u8>, extension: Option<&str>) -> NormalizedAudio;
}

/// Embeds files byte-for-byte.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughNormalizer;

impl Normalizer for PassthroughNormalizer {
    fn normalize(&self, bytes: Vec<u8>, _extension: Option<&str>) -> NormalizedAudio {
        NormalizedAudio::new(bytes, Normalization::Passthrough)
    }
}

/// Decodes, downmixes, resamples and re-encodes samples as PCM WAV.
#[derive(Debug, Default, Clone)]
pub struct WavNormalizer {
    target: TargetFormat,
}

impl WavNormalizer {
    pub fn new(target: TargetFormat) -> Self {
        Self { target }
    }

    /// Returns the converted WAV bytes, or None if the source already matches the target.
    fn convert(
        &self,
        bytes: &[u8],
        extension: Option<&str>,
    ) -> Result<Option<(Vec<u8>, Normalization)>, NormalizeError> {
        let decoded = decode_bytes(bytes, extension)?;
        if self.target.matches(decoded.channels, decoded.sample_rate) {
            return Ok(None);
        }

        let mono = downmix_to_mono(&decoded.samples, decoded.channels);
        let resampled = resample_mono(&mono, decoded.sample_rate, self.target.sample_rate)?;
        let wav = encode_wav(&resampled, &self.target)?;

        debug!(
            source_channels = decoded.channels,
            source_rate = decoded.sample_rate,
            target = %self.target,
            frames = resampled.len(),
            "Normalized sample"
        );

        Ok(Some((
            wav,
            Normalization::Normalized {
                source_channels: decoded.channels,
                source_rate: decoded.sample_rate,
            },
        )))
    }
}

impl Normalizer for WavNormalizer {
    fn normalize(&self, bytes: Vec<u8>, extension: Option<&str>) -> NormalizedAudio {
        match self.convert(&bytes, extension) {
            Ok(Some((wav, normalization))) => NormalizedAudio::new(wav, normalization),
            Ok(None) => NormalizedAudio::new(bytes, Normalization::AlreadyNormalized),
            Err(e) => {
                warn!(error = %e, "Normalization failed, keeping original bytes");
                NormalizedAudio::new(
                    bytes,
                    Normalization::Fallback {
                        reason: e.to_string(),
                    },
                )
            }
        }
    }
}

/// Encodes mono f32 samples as an integer PCM WAV file in memory.
fn encode_wav(samples: &[f32], target: &TargetFormat) -> Result<Vec<u8>, NormalizeError> {
    let spec = WavSpec {
        channels: target.channels,
        sample_rate: target.sample_rate,
        bits_per_sample: target.bits_per_sample,
        sample_format: SampleFormat::Int,
    };

    let scale = ((1i64 << (target.bits_per_sample - 1)) - 1) as f32;
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for sample in samples {
            let value = (sample.clamp(-1.0, 1.0) * scale).round() as i32;
            writer.write_sample(value)?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{audio_test_utils::generate_sine, wav_bytes};

    #[test]
    fn test_stereo_44k_is_converted() {
        let left = generate_sine(440.0, 44100, 0.2);
        let right = left.clone();
        let source = wav_bytes(&[left, right], 44100);

        let normalizer = WavNormalizer::default();
        let audio = normalizer.normalize(source.clone(), Some("wav"));

        assert_eq!(
            audio.normalization(),
            &Normalization::Normalized {
                source_channels: 2,
                source_rate: 44100
            }
        );
        assert!(!audio.is_original());

        let reader = hound::WavReader::new(Cursor::new(audio.bytes().to_vec())).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 22050);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.duration(), 4410);
    }

    #[test]
    fn test_mono_target_rate_is_kept() {
        let source = wav_bytes(&[generate_sine(440.0, 22050, 0.1)], 22050);

        let audio = WavNormalizer::default().normalize(source.clone(), Some("wav"));
        assert_eq!(audio.normalization(), &Normalization::AlreadyNormalized);
        assert_eq!(audio.bytes(), source.as_slice());
    }

    #[test]
    fn test_stereo_at_target_rate_is_downmixed_only() {
        let source = wav_bytes(&[vec![0.5; 64], vec![0.0; 64]], 22050);

        let audio = WavNormalizer::default().normalize(source, Some("wav"));
        let mut reader = hound::WavReader::new(Cursor::new(audio.bytes().to_vec())).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.duration(), 64);

        let first = reader.samples::<i16>().next().unwrap().unwrap();
        assert!((first as i32 - 8192).abs() < 4, "got {}", first);
    }

    #[test]
    fn test_invalid_audio_falls_back_to_original() {
        let source = b"RIFF\x00\x00\x00\x00not really a wave file".to_vec();

        let audio = WavNormalizer::default().normalize(source.clone(), Some("wav"));
        assert!(matches!(
            audio.normalization(),
            Normalization::Fallback { .. }
        ));
        assert!(audio.is_original());
        assert_eq!(audio.bytes(), source.as_slice());
    }

    #[test]
    fn test_passthrough_keeps_bytes() {
        let source = wav_bytes(&[vec![0.1; 10], vec![0.2; 10]], 48000);

        let audio = PassthroughNormalizer.normalize(source.clone(), Some("wav"));
        assert_eq!(audio.normalization(), &Normalization::Passthrough);
        assert_eq!(audio.bytes(), source.as_slice());
    }

    #[test]
    fn test_encode_wav_clamps() {
        let wav = encode_wav(&[2.0, -2.0, 0.0], &TargetFormat::default()).unwrap();
        let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![i16::MAX, -i16::MAX, 0]);
    }
}
