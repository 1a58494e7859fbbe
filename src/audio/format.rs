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
use std::fmt;

use super::error::NormalizeError;

/// Target audio format for normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFormat {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Channel count of the output
    pub channels: u16,
    /// Bits per sample of the integer PCM output
    pub bits_per_sample: u16,
}

impl TargetFormat {
    /// Creates a mono, 16-bit target at the given sample rate.
    pub fn mono(sample_rate: u32) -> Result<Self, NormalizeError> {
        if sample_rate == 0 {
            return Err(NormalizeError::InvalidTarget(
                "sample rate must be greater than 0".to_string(),
            ));
        }

        Ok(TargetFormat {
            sample_rate,
            channels: 1,
            bits_per_sample: 16,
        })
    }

    /// Returns true if audio with the given layout needs no conversion.
    pub fn matches(&self, channels: u16, sample_rate: u32) -> bool {
        self.channels == channels && self.sample_rate == sample_rate
    }
}

impl Default for TargetFormat {
    /// Creates a default target format (22.05kHz, mono, 16-bit integer)
    fn default() -> Self {
        TargetFormat {
            sample_rate: 22050,
            channels: 1,
            bits_per_sample: 16,
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}Hz/{}ch/{}bit",
            self.sample_rate, self.channels, self.bits_per_sample
        )
    }
}
