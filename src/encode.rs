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
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::samples::LocatedSample;

/// Error returned when an embedded payload can't be turned back into bytes.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Invalid base64 payload for {name}: {source}")]
    InvalidPayload {
        name: String,
        #[source]
        source: base64::DecodeError,
    },
}

/// Encodes bytes as standard, padded base64.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes a standard base64 payload.
pub fn decode(name: &str, payload: &str) -> Result<Vec<u8>, EncodeError> {
    STANDARD
        .decode(payload)
        .map_err(|source| EncodeError::InvalidPayload {
            name: name.to_string(),
            source,
        })
}

/// Encoded payloads keyed by sample name, in the order the samples were processed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedSamples {
    entries: Vec<(String, String)>,
}

impl EncodedSamples {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes every located sample.
    pub fn from_located(samples: &[LocatedSample]) -> Self {
        let mut encoded = Self::new();
        for sample in samples {
            encoded.insert(sample.name(), encode(sample.audio().bytes()));
        }
        encoded
    }

    /// Adds or replaces the payload for a name. Replacing keeps the original position.
    pub fn insert(&mut self, name: &str, payload: String) {
        match self.entries.iter_mut().find(|(existing, _)| existing == name) {
            Some(entry) => entry.1 = payload,
            None => self.entries.push((name.to_string(), payload)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, payload)| payload.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, payload)| (name.as_str(), payload.as_str()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
