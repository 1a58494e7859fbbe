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

//! Finds the configured sample files and runs each one through the normalizer.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::audio::{NormalizedAudio, Normalizer};
use crate::config::SampleSet;

/// Error for a sample file that exists but could not be read.
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("Failed to read sample {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A sample whose file was found, along with its normalized bytes.
#[derive(Debug, Clone)]
pub struct LocatedSample {
    name: String,
    file: String,
    audio: NormalizedAudio,
}

impl LocatedSample {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn audio(&self) -> &NormalizedAudio {
        &self.audio
    }
}

/// The samples that were found, in set order, and the names whose files were missing.
#[derive(Debug, Default)]
pub struct LocateReport {
    pub found: Vec<LocatedSample>,
    pub missing: Vec<String>,
}

/// Looks up every sample in the set under `base_dir`. Missing files are skipped and
/// recorded; present files are read whole and normalized one at a time.
pub fn locate_samples(
    base_dir: &Path,
    sample_set: &SampleSet,
    normalizer: &dyn Normalizer,
) -> Result<LocateReport, SampleError> {
    let mut report = LocateReport::default();

    for entry in sample_set.iter() {
        let path = base_dir.join(entry.file());
        if !path.is_file() {
            warn!(name = entry.name(), path = ?path, "Sample file not found");
            report.missing.push(entry.name().to_string());
            continue;
        }

        info!(name = entry.name(), path = ?path, "Processing sample");
        let bytes = fs::read(&path).map_err(|source| SampleError::Read {
            path: path.clone(),
            source,
        })?;
        let extension = path.extension().and_then(|ext| ext.to_str());
        let audio = normalizer.normalize(bytes, extension);

        report.found.push(LocatedSample {
            name: entry.name().to_string(),
            file: entry.file().to_string(),
            audio,
        });
    }

    Ok(report)
}
