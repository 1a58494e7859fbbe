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
use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::audio::{
    Normalization, NormalizeError, Normalizer, PassthroughNormalizer, TargetFormat, WavNormalizer,
};
use crate::config::Settings;
use crate::encode::{self, EncodeError, EncodedSamples};
use crate::patch::{self, DataBlockPatch, LoaderPatch, PatchError};
use crate::samples::{locate_samples, SampleError};

/// Errors that stop a run. Anything raised here leaves the document as it was.
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("Document {0} not found")]
    DocumentNotFound(PathBuf),

    #[error("Failed to read document {path}: {source}")]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write document {path}: {source}")]
    WriteDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Sample(#[from] SampleError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("Failed to patch {path}: {source}")]
    Patch {
        path: PathBuf,
        #[source]
        source: PatchError,
    },

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// One embedded sample, as reported back to the operator.
#[derive(Debug, Clone)]
pub struct SampleReport {
    pub name: String,
    pub file: String,
    pub normalization: Normalization,
    /// Length of the base64 payload in characters.
    pub encoded_len: usize,
}

/// What the document patch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchReport {
    pub data_block: DataBlockPatch,
    pub loader: LoaderPatch,
    /// False for dry runs.
    pub written: bool,
}

/// The result of a run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub document: PathBuf,
    pub samples: Vec<SampleReport>,
    pub missing: Vec<String>,
    /// None when there was nothing to embed and the document was left alone.
    pub patch: Option<PatchReport>,
}

impl RunReport {
    /// Number of samples that were embedded.
    pub fn processed(&self) -> usize {
        self.samples.len()
    }
}

/// Runs the whole pipeline: locate and normalize the samples, encode them and patch the
/// document. The document is read once and written once, and only if the patch succeeds.
pub fn run(settings: &Settings) -> Result<RunReport, EmbedError> {
    let document = settings.document().to_path_buf();
    if !document.is_file() {
        return Err(EmbedError::DocumentNotFound(document));
    }

    let normalizer: Box<dyn Normalizer> = if settings.normalize() {
        Box::new(WavNormalizer::new(TargetFormat::mono(
            settings.target_sample_rate(),
        )?))
    } else {
        Box::new(PassthroughNormalizer)
    };

    let located = locate_samples(
        settings.base_dir(),
        settings.samples(),
        normalizer.as_ref(),
    )?;
    let encoded = EncodedSamples::from_located(&located.found);

    let samples: Vec<SampleReport> = located
        .found
        .iter()
        .map(|sample| SampleReport {
            name: sample.name().to_string(),
            file: sample.file().to_string(),
            normalization: sample.audio().normalization().clone(),
            encoded_len: encoded.get(sample.name()).map(str::len).unwrap_or(0),
        })
        .collect();

    if encoded.is_empty() {
        warn!(document = ?document, "No samples found, leaving document untouched");
        return Ok(RunReport {
            document,
            samples,
            missing: located.missing,
            patch: None,
        });
    }

    let text = fs::read_to_string(&document).map_err(|source| EmbedError::ReadDocument {
        path: document.clone(),
        source,
    })?;
    let outcome = patch::patch_document(&text, &encoded, settings.samples(), settings.anchors())
        .map_err(|source| EmbedError::Patch {
            path: document.clone(),
            source,
        })?;

    let written = !settings.dry_run();
    if written {
        fs::write(&document, &outcome.text).map_err(|source| EmbedError::WriteDocument {
            path: document.clone(),
            source,
        })?;
        info!(document = ?document, bytes = outcome.text.len(), "Wrote document");
    } else {
        info!(document = ?document, "Dry run, document not written");
    }

    Ok(RunReport {
        document,
        samples,
        missing: located.missing,
        patch: Some(PatchReport {
            data_block: outcome.data_block,
            loader: outcome.loader,
            written,
        }),
    })
}

/// A payload found in the document, with its decoded size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedPayload {
    pub name: String,
    pub decoded_len: usize,
}

/// Reads the generated data block back out of the document and checks that every
/// payload decodes. Never writes.
pub fn verify(settings: &Settings) -> Result<Vec<EmbeddedPayload>, EmbedError> {
    let document = settings.document().to_path_buf();
    if !document.is_file() {
        return Err(EmbedError::DocumentNotFound(document));
    }

    let text = fs::read_to_string(&document).map_err(|source| EmbedError::ReadDocument {
        path: document.clone(),
        source,
    })?;
    let embedded = match patch::parse_data_block(&text) {
        Ok(Some(embedded)) => embedded,
        Ok(None) => return Ok(Vec::new()),
        Err(source) => {
            return Err(EmbedError::Patch {
                path: document,
                source,
            })
        }
    };

    embedded
        .iter()
        .map(|(name, payload)| -> Result<EmbeddedPayload, EmbedError> {
            let bytes = encode::decode(name, payload)?;
            Ok(EmbeddedPayload {
                name: name.to_string(),
                decoded_len: bytes.len(),
            })
        })
        .collect()
}
