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
use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// The literal substrings used to find the two extension points in the document.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Anchors {
    /// Opener of the sample mapping declaration. The data block goes after its close.
    #[serde(default = "default_mapping")]
    mapping: String,

    /// Closing delimiter of the sample mapping declaration.
    #[serde(default = "default_mapping_close")]
    mapping_close: String,

    /// Opener of the loader routine that gets replaced.
    #[serde(default = "default_loader")]
    loader: String,
}

fn default_mapping() -> String {
    "let samples = {".to_string()
}

fn default_mapping_close() -> String {
    "};".to_string()
}

fn default_loader() -> String {
    "async function loadSamples() {".to_string()
}

impl Anchors {
    /// Creates a new set of anchors.
    pub fn new(mapping: &str, mapping_close: &str, loader: &str) -> Result<Anchors, ConfigError> {
        let anchors = Anchors {
            mapping: mapping.to_string(),
            mapping_close: mapping_close.to_string(),
            loader: loader.to_string(),
        };
        anchors.validate()?;
        Ok(anchors)
    }

    /// Empty anchors would match everywhere.
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.mapping.is_empty() {
            return Err(ConfigError::EmptyAnchor("mapping"));
        }
        if self.mapping_close.is_empty() {
            return Err(ConfigError::EmptyAnchor("mapping_close"));
        }
        if self.loader.is_empty() {
            return Err(ConfigError::EmptyAnchor("loader"));
        }
        Ok(())
    }

    pub fn mapping(&self) -> &str {
        &self.mapping
    }

    pub fn mapping_close(&self) -> &str {
        &self.mapping_close
    }

    pub fn loader(&self) -> &str {
        &self.loader
    }
}

impl Default for Anchors {
    fn default() -> Self {
        Anchors {
            mapping: default_mapping(),
            mapping_close: default_mapping_close(),
            loader: default_loader(),
        }
    }
}
