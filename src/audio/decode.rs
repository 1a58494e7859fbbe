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
use std::io::Cursor;

use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::conv::FromSample;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;
use symphonia::default::{get_codecs, get_probe};
use tracing::{debug, warn};

use super::error::NormalizeError;

/// A fully decoded clip held in memory as interleaved f32 samples.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Interleaved samples scaled to [-1.0, 1.0].
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl DecodedAudio {
    /// Number of frames (one sample per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }
}

/// Decodes an in-memory audio file (WAV, FLAC, MP3, etc.) into interleaved f32 samples.
/// The extension, if known, helps symphonia pick the right format reader.
pub fn decode_bytes(bytes: &[u8], extension: Option<&str>) -> Result<DecodedAudio, NormalizeError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = extension {
        hint.with_extension(extension);
    }

    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();
    let probed = get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(|e| NormalizeError::DecodeFailed(format!("unrecognized audio: {}", e)))?;
    let mut format_reader = probed.format;

    let track = format_reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| NormalizeError::DecodeFailed("No audio track found".to_string()))?;
    let track_id = track.id;
    let params = track.codec_params.clone();

    let sample_rate = params
        .sample_rate
        .ok_or_else(|| NormalizeError::DecodeFailed("Sample rate not specified".to_string()))?;

    let decoder_opts: DecoderOptions = Default::default();
    let mut decoder = get_codecs().make(&params, &decoder_opts)?;

    // Prefer the container's channel count; fall back to whatever the first decoded
    // packet reports.
    let mut channels = params.channels.map(|c| c.count() as u16).unwrap_or(0);
    let mut samples = Vec::new();

    while let Some(packet) = read_next_packet(format_reader.as_mut(), decoder.as_mut())? {
        if packet.track_id() != track_id {
            continue;
        }
        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                // A corrupt packet is skipped rather than failing the whole clip.
                warn!(error = e, "Skipping undecodable packet");
                continue;
            }
            Err(e) => return Err(NormalizeError::AudioError(e)),
        };
        let (chunk, chunk_channels) = decode_buffer_to_f32(decoded);
        if channels == 0 {
            channels = chunk_channels as u16;
        }
        samples.extend_from_slice(&chunk);
    }

    if channels == 0 {
        return Err(NormalizeError::DecodeFailed(
            "Could not determine channel count".to_string(),
        ));
    }

    debug!(
        channels,
        sample_rate,
        frames = samples.len() / channels as usize,
        "Decoded clip"
    );

    Ok(DecodedAudio {
        samples,
        channels,
        sample_rate,
    })
}

/// Reads the next packet. Returns `Ok(None)` at end of stream and resets the decoder
/// when the format reader asks for it.
fn read_next_packet(
    format_reader: &mut dyn FormatReader,
    decoder: &mut dyn Decoder,
) -> Result<Option<Packet>, NormalizeError> {
    loop {
        match format_reader.next_packet() {
            Ok(packet) => return Ok(Some(packet)),
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Ok(None)
            }
            Err(e) => return Err(NormalizeError::AudioError(e)),
        }
    }
}

/// Converts any decoded buffer into interleaved f32 samples, returning the channel count.
fn decode_buffer_to_f32(decoded: AudioBufferRef) -> (Vec<f32>, usize) {
    match decoded {
        AudioBufferRef::F32(buf) => interleave_planar_samples(&buf),
        AudioBufferRef::F64(buf) => interleave_planar_samples(&buf),
        AudioBufferRef::S8(buf) => interleave_planar_samples(&buf),
        AudioBufferRef::S16(buf) => interleave_planar_samples(&buf),
        AudioBufferRef::S24(buf) => interleave_planar_samples(&buf),
        AudioBufferRef::S32(buf) => interleave_planar_samples(&buf),
        AudioBufferRef::U8(buf) => interleave_planar_samples(&buf),
        AudioBufferRef::U16(buf) => interleave_planar_samples(&buf),
        AudioBufferRef::U24(buf) => interleave_planar_samples(&buf),
        AudioBufferRef::U32(buf) => interleave_planar_samples(&buf),
    }
}

fn interleave_planar_samples<T>(buf: &AudioBuffer<T>) -> (Vec<f32>, usize)
where
    T: Sample,
    f32: FromSample<T>,
{
    let frames = buf.frames();
    let channels = buf.spec().channels.count();
    let planes = buf.planes();
    let mut samples = Vec::with_capacity(frames * channels);
    for frame_idx in 0..frames {
        for plane in planes.planes().iter() {
            samples.push(f32::from_sample(plane[frame_idx]));
        }
    }
    (samples, channels)
}
