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
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// The samples embedded when no config overrides them, in processing order.
const DEFAULT_SAMPLES: [(&str, &str); 6] = [
    ("tambourine_strong", "tambourine_strong.wav"),
    ("tambourine_weak", "tambourine_weak.wav"),
    ("kick", "kick.wav"),
    ("hihat", "hihat.wav"),
    ("rim", "rim.wav"),
    ("bell", "bell.wav"),
];

/// A YAML representation of a single sample: its logical name and the file it is read from.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct SampleEntry {
    /// The logical name. Used as the key in the generated document, so it must be
    /// a valid JavaScript identifier.
    name: String,

    /// The file name, relative to the samples directory.
    file: String,
}

impl SampleEntry {
    /// Creates a new sample entry.
    pub fn new(name: &str, file: &str) -> SampleEntry {
        SampleEntry {
            name: name.to_string(),
            file: file.to_string(),
        }
    }

    /// Gets the logical name of the sample.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the expected file name of the sample.
    pub fn file(&self) -> &str {
        &self.file
    }
}

/// The fixed, ordered set of samples for a run. Both the locator and the generated
/// loader routine read from the same set, so they cannot drift apart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleSet {
    entries: Vec<SampleEntry>,
}

impl SampleSet {
    /// Creates a validated sample set. Names must be unique identifiers and every
    /// entry must name a file.
    pub fn new(entries: Vec<SampleEntry>) -> Result<SampleSet, ConfigError> {
        let mut seen = HashSet::new();
        for entry in entries.iter() {
            if !is_identifier(&entry.name) {
                return Err(ConfigError::InvalidSampleName(entry.name.clone()));
            }
            if entry.file.trim().is_empty() {
                return Err(ConfigError::EmptyFileName(entry.name.clone()));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(ConfigError::DuplicateSampleName(entry.name.clone()));
            }
        }

        Ok(SampleSet { entries })
    }

    /// Iterates over the entries in processing order.
    pub fn iter(&self) -> impl Iterator<Item = &SampleEntry> {
        self.entries.iter()
    }

    /// Looks up the file name for a logical sample name.
    pub fn file_for(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.file.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SampleSet {
    fn default() -> Self {
        SampleSet {
            entries: DEFAULT_SAMPLES
                .iter()
                .map(|(name, file)| SampleEntry::new(name, file))
                .collect(),
        }
    }
}

/// Returns true if the name can be used as a bare key in a JavaScript object literal.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
