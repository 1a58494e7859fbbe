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
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

/// Audio test utilities for generating test signals and validating results
pub mod audio_test_utils {
    use std::f32::consts::PI;

    /// Generate a sine wave at half amplitude.
    pub fn generate_sine(frequency: f32, sample_rate: u32, duration_seconds: f64) -> Vec<f32> {
        let sample_count = (sample_rate as f64 * duration_seconds).round() as usize;
        (0..sample_count)
            .map(|i| 0.5 * (2.0 * PI * frequency * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    /// Calculate RMS (Root Mean Square) of a signal
    pub fn calculate_rms(samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }

        let sum_squares: f32 = samples.iter().map(|&x| x * x).sum();
        (sum_squares / samples.len() as f32).sqrt()
    }
}

/// Encodes planar channels as a 16-bit integer WAV file in memory.
pub fn wav_bytes(channels: &[Vec<f32>], sample_rate: u32) -> Vec<u8> {
    assert!(!channels.is_empty(), "At least one channel is required");
    let frames = channels[0].len();
    assert!(
        channels.iter().all(|channel| channel.len() == frames),
        "All channels must have the same length"
    );

    let spec = WavSpec {
        channels: channels.len() as u16,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
        for frame in 0..frames {
            for channel in channels {
                let value = (channel[frame].clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
                writer.write_sample(value).unwrap();
            }
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Writes a WAV file to disk and returns the bytes that were written.
pub fn write_wav(path: &Path, channels: &[Vec<f32>], sample_rate: u32) -> Vec<u8> {
    let bytes = wav_bytes(channels, sample_rate);
    std::fs::write(path, &bytes).unwrap();
    bytes
}

/// A minimal page with both extension points, laid out like a real one.
pub const TEMPLATE_DOCUMENT: &str = r#"<!DOCTYPE html>
<html>
<body>
    <script>
        const audioContext = new AudioContext();
        let samples = {};

        async function loadSamples() {
            const files = ['kick.wav'];
            for (const file of files) {
                if (file) {
                    console.log(file);
                }
            }
        }

        loadSamples();
    </script>
</body>
</html>
"#;
