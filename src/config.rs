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
use std::path::{Path, PathBuf};

use config::{Config, File};
use serde::Deserialize;
use tracing::debug;

mod anchors;
mod error;
mod samples;

pub use anchors::Anchors;
pub use error::ConfigError;
pub use samples::{SampleEntry, SampleSet};

/// The config file picked up from the samples directory when none is given explicitly.
pub const DEFAULT_CONFIG_FILE: &str = "sampleinline.yaml";

/// The document patched when the config doesn't name one.
pub const DEFAULT_DOCUMENT: &str = "index.html";

/// Sample rate every embedded sample is converted to.
pub const DEFAULT_TARGET_SAMPLE_RATE: u32 = 22050;

/// A YAML representation of the embedder configuration. Every key is optional.
#[derive(Deserialize, Clone, Debug)]
pub struct EmbedConfig {
    /// The document to patch, relative to the samples directory.
    #[serde(default = "default_document")]
    document: String,

    /// Whether samples are converted before embedding. When false, files are
    /// embedded byte-for-byte.
    #[serde(default = "default_normalize")]
    normalize: bool,

    /// The sample rate samples are converted to.
    #[serde(default = "default_target_sample_rate")]
    target_sample_rate: u32,

    /// The samples to embed. Falls back to the built-in drum kit.
    samples: Option<Vec<SampleEntry>>,

    /// The anchors used to find the extension points in the document.
    #[serde(default)]
    anchors: Anchors,
}

fn default_document() -> String {
    DEFAULT_DOCUMENT.to_string()
}

fn default_normalize() -> bool {
    true
}

fn default_target_sample_rate() -> u32 {
    DEFAULT_TARGET_SAMPLE_RATE
}

impl EmbedConfig {
    /// Parse the embedder config from a YAML file.
    pub fn deserialize(path: &Path) -> Result<EmbedConfig, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<EmbedConfig>()?)
    }
}

impl Default for EmbedConfig {
    fn default() -> Self {
        EmbedConfig {
            document: default_document(),
            normalize: default_normalize(),
            target_sample_rate: default_target_sample_rate(),
            samples: None,
            anchors: Anchors::default(),
        }
    }
}

/// The resolved settings for one run of the pipeline.
#[derive(Clone, Debug)]
pub struct Settings {
    base_dir: PathBuf,
    document: PathBuf,
    normalize: bool,
    target_sample_rate: u32,
    samples: SampleSet,
    anchors: Anchors,
    dry_run: bool,
}

impl Settings {
    /// Resolves settings for the given samples directory. An explicit config path wins;
    /// otherwise the default config file is used if it exists in the directory.
    pub fn load(base_dir: &Path, config_path: Option<&Path>) -> Result<Settings, ConfigError> {
        let default_path = base_dir.join(DEFAULT_CONFIG_FILE);
        let config = match config_path {
            Some(path) => EmbedConfig::deserialize(path)?,
            None if default_path.is_file() => EmbedConfig::deserialize(&default_path)?,
            None => EmbedConfig::default(),
        };
        debug!(base_dir = ?base_dir, config = ?config, "Resolved embedder config");

        Settings::from_config(base_dir, config)
    }

    /// Validates a parsed config and anchors it to the samples directory.
    pub fn from_config(base_dir: &Path, config: EmbedConfig) -> Result<Settings, ConfigError> {
        if config.target_sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate);
        }
        config.anchors.validate()?;

        let samples = match config.samples {
            Some(entries) => SampleSet::new(entries)?,
            None => SampleSet::default(),
        };

        let document = PathBuf::from(&config.document);
        let document = if document.is_absolute() {
            document
        } else {
            base_dir.join(document)
        };

        Ok(Settings {
            base_dir: base_dir.to_path_buf(),
            document,
            normalize: config.normalize,
            target_sample_rate: config.target_sample_rate,
            samples,
            anchors: config.anchors,
            dry_run: false,
        })
    }

    /// Overrides the document path.
    pub fn set_document(&mut self, document: PathBuf) {
        self.document = document;
    }

    /// Turns normalization on or off.
    pub fn set_normalize(&mut self, normalize: bool) {
        self.normalize = normalize;
    }

    /// When set, the patched document is computed but never written.
    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.dry_run = dry_run;
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn document(&self) -> &Path {
        &self.document
    }

    pub fn normalize(&self) -> bool {
        self.normalize
    }

    pub fn target_sample_rate(&self) -> u32 {
        self.target_sample_rate
    }

    pub fn samples(&self) -> &SampleSet {
        &self.samples
    }

    pub fn anchors(&self) -> &Anchors {
        &self.anchors
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}
