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

/// Reasons the document could not be patched. Any of these leaves the document untouched.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("Anchor \"{anchor}\" not found in document")]
    AnchorMissing { anchor: String },

    #[error("Anchor \"{anchor}\" found {count} times in document, expected exactly once")]
    AnchorNotUnique { anchor: String, count: usize },

    #[error("No \"{close}\" found after the sample declaration")]
    UnterminatedDeclaration { close: String },

    #[error("No closing line found for the routine starting with \"{anchor}\"")]
    UnterminatedRoutine { anchor: String },

    #[error("Embedded sample block markers are unbalanced")]
    CorruptBlock,

    #[error("Document already declares embeddedSamples outside a marked block")]
    UnmarkedBlock,

    #[error("Malformed embedded sample entry: {0}")]
    MalformedEntry(String),

    #[error("Failed to render file name: {0}")]
    Render(#[from] serde_json::Error),
}
