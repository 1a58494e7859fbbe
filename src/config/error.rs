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

/// Typed error for config load/parse failures so callers can distinguish
/// e.g. file-not-found from an invalid sample table without string matching.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config load/parse error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Sample name \"{0}\" is not a valid identifier")]
    InvalidSampleName(String),

    #[error("Sample name \"{0}\" is defined more than once")]
    DuplicateSampleName(String),

    #[error("Sample \"{0}\" has an empty file name")]
    EmptyFileName(String),

    #[error("Anchor \"{0}\" must not be empty")]
    EmptyAnchor(&'static str),

    #[error("Target sample rate must be greater than 0")]
    InvalidSampleRate,
}
