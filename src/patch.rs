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

//! Text surgery on the target document.
//!
//! The document is never parsed. Two literal anchors mark the extension points: the
//! sample mapping declaration, after which the data block goes, and the loader routine,
//! which is replaced wholesale. The whole patch is computed in memory and either fully
//! succeeds or returns an error without producing any text.

use tracing::{debug, info, warn};

use crate::config::{Anchors, SampleSet};
use crate::encode::EncodedSamples;

mod block;
mod error;
mod loader;

pub use block::{parse_data_block, render_data_block, BLOCK_BEGIN, BLOCK_END, EMBEDDED_VAR};
pub use error::PatchError;
pub use loader::render_loader;

/// How the data block ended up in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBlockPatch {
    /// A new block was inserted after the sample declaration.
    Inserted,
    /// A block from an earlier run was replaced in place.
    Replaced,
}

/// What happened to the loader routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderPatch {
    Replaced,
    /// The document has no loader routine; only the data block was written.
    NotFound,
}

/// The patched document and a summary of what changed.
#[derive(Debug, Clone)]
pub struct PatchOutcome {
    pub text: String,
    pub data_block: DataBlockPatch,
    pub loader: LoaderPatch,
}

/// Patches the document text with the encoded samples and a loader routine for the
/// sample set.
///
/// The mapping anchor must occur exactly once. If it doesn't, nothing is patched, not
/// even the loader routine. The loader anchor may be absent, but not duplicated.
pub fn patch_document(
    text: &str,
    encoded: &EncodedSamples,
    samples: &SampleSet,
    anchors: &Anchors,
) -> Result<PatchOutcome, PatchError> {
    let mapping = find_unique(text, anchors.mapping())?.ok_or_else(|| {
        PatchError::AnchorMissing {
            anchor: anchors.mapping().to_string(),
        }
    })?;
    let block_indent = indentation(text, mapping);
    let data_block = render_data_block(encoded, block_indent);

    let (mut patched, data_block_patch) = match block::find_block(text)? {
        Some(span) => {
            debug!(start = span.start, end = span.end, "Replacing existing data block");
            (
                splice(text, span.start, span.end, &data_block),
                DataBlockPatch::Replaced,
            )
        }
        None => {
            if text.contains(&format!("const {} = {{", EMBEDDED_VAR)) {
                return Err(PatchError::UnmarkedBlock);
            }
            let search_from = mapping + anchors.mapping().len();
            let close = text[search_from..]
                .find(anchors.mapping_close())
                .map(|pos| search_from + pos + anchors.mapping_close().len())
                .ok_or_else(|| PatchError::UnterminatedDeclaration {
                    close: anchors.mapping_close().to_string(),
                })?;

            // Code sharing the line with the declaration's close moves below the block.
            let rest = text[close..].split('\n').next().unwrap_or("");
            let (end, insert) = if rest.trim().is_empty() {
                (close, format!("\n\n{}", data_block))
            } else {
                let code = rest.trim_start_matches(|c: char| c == ' ' || c == '\t');
                (
                    close + rest.len() - code.len(),
                    format!("\n\n{}\n{}", data_block, block_indent),
                )
            };
            debug!(offset = close, "Inserting data block");
            (splice(text, close, end, &insert), DataBlockPatch::Inserted)
        }
    };

    let loader_patch = match find_unique(&patched, anchors.loader())? {
        Some(position) => {
            let indent = indentation(&patched, position).to_string();
            let end = loader::find_routine_end(&patched, position, &indent).ok_or_else(|| {
                PatchError::UnterminatedRoutine {
                    anchor: anchors.loader().to_string(),
                }
            })?;
            // Anything before the opener on its line stays where it is.
            let routine = render_loader(samples, anchors.loader(), &indent)?;
            let routine = routine.strip_prefix(indent.as_str()).unwrap_or(&routine);
            patched = splice(&patched, position, end, routine);
            LoaderPatch::Replaced
        }
        None => {
            warn!(
                anchor = anchors.loader(),
                "Loader routine not found, leaving it untouched"
            );
            LoaderPatch::NotFound
        }
    };

    info!(
        samples = encoded.len(),
        data_block = ?data_block_patch,
        loader = ?loader_patch,
        "Patched document"
    );

    Ok(PatchOutcome {
        text: patched,
        data_block: data_block_patch,
        loader: loader_patch,
    })
}

/// Returns the position of `needle` if it occurs exactly once, None if it doesn't occur,
/// and an error if it occurs more than once.
fn find_unique(text: &str, needle: &str) -> Result<Option<usize>, PatchError> {
    let mut matches = text.match_indices(needle).map(|(position, _)| position);
    let first = matches.next();
    let rest = matches.count();
    if rest > 0 {
        return Err(PatchError::AnchorNotUnique {
            anchor: needle.to_string(),
            count: rest + 1,
        });
    }
    Ok(first)
}

/// Byte offset of the start of the line containing `position`.
fn line_start(text: &str, position: usize) -> usize {
    text[..position].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

/// The leading whitespace of the line containing `position`.
fn indentation(text: &str, position: usize) -> &str {
    let start = line_start(text, position);
    let line = &text[start..position];
    let trimmed = line.trim_start_matches(|c: char| c == ' ' || c == '\t');
    &line[..line.len() - trimmed.len()]
}

/// Prefixes every non-empty line with `indent` and joins them with newlines.
fn indent_lines(lines: &[String], indent: &str) -> String {
    lines
        .iter()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", indent, line)
            }
        })
        .collect::<Vec<String>>()
        .join("\n")
}

fn splice(text: &str, start: usize, end: usize, replacement: &str) -> String {
    let mut result = String::with_capacity(text.len() - (end - start) + replacement.len());
    result.push_str(&text[..start]);
    result.push_str(replacement);
    result.push_str(&text[end..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SampleEntry;
    use crate::testutil::TEMPLATE_DOCUMENT;

    fn kick_only() -> EncodedSamples {
        let mut encoded = EncodedSamples::new();
        encoded.insert("kick", "a2ljaw==".to_string());
        encoded
    }

    fn patch(text: &str, encoded: &EncodedSamples) -> Result<PatchOutcome, PatchError> {
        patch_document(text, encoded, &SampleSet::default(), &Anchors::default())
    }

    #[test]
    fn test_patch_template() {
        let outcome = patch(TEMPLATE_DOCUMENT, &kick_only()).unwrap();
        assert_eq!(outcome.data_block, DataBlockPatch::Inserted);
        assert_eq!(outcome.loader, LoaderPatch::Replaced);

        let text = &outcome.text;
        assert!(text.contains(
            "        let samples = {};\n\n        // @embedded-samples begin\n        const embeddedSamples = {\n            kick: 'a2ljaw==',\n        };\n        // @embedded-samples end\n\n        async function loadSamples() {\n"
        ));
        // The old routine body is gone and everything after the routine is intact.
        assert!(!text.contains("const files = ['kick.wav'];"));
        assert!(text.contains("        }\n\n        loadSamples();\n    </script>\n</body>\n</html>\n"));
        assert_eq!(text.matches("async function loadSamples() {").count(), 1);
        assert!(text.starts_with("<!DOCTYPE html>\n<html>\n<body>\n    <script>\n"));
    }

    #[test]
    fn test_data_block_contains_only_encoded_names() {
        let outcome = patch(TEMPLATE_DOCUMENT, &kick_only()).unwrap();
        let embedded = parse_data_block(&outcome.text).unwrap().unwrap();
        assert_eq!(embedded.names(), vec!["kick"]);
        assert_eq!(embedded.get("kick"), Some("a2ljaw=="));
    }

    #[test]
    fn test_loader_lists_whole_sample_set() {
        let outcome = patch(TEMPLATE_DOCUMENT, &kick_only()).unwrap();
        for entry in SampleSet::default().iter() {
            assert!(outcome
                .text
                .contains(&format!("{}: \"{}\",", entry.name(), entry.file())));
        }
    }

    #[test]
    fn test_patch_twice_is_idempotent() {
        let once = patch(TEMPLATE_DOCUMENT, &kick_only()).unwrap();
        let twice = patch(&once.text, &kick_only()).unwrap();

        assert_eq!(twice.data_block, DataBlockPatch::Replaced);
        assert_eq!(twice.loader, LoaderPatch::Replaced);
        assert_eq!(twice.text, once.text);
        assert_eq!(twice.text.matches(BLOCK_BEGIN).count(), 1);
        assert_eq!(twice.text.matches("const embeddedSamples").count(), 1);
    }

    #[test]
    fn test_repatch_refreshes_payloads() {
        let once = patch(TEMPLATE_DOCUMENT, &kick_only()).unwrap();

        let mut updated = EncodedSamples::new();
        updated.insert("kick", "bmV3".to_string());
        updated.insert("bell", "YmVsbA==".to_string());
        let twice = patch(&once.text, &updated).unwrap();

        let embedded = parse_data_block(&twice.text).unwrap().unwrap();
        assert_eq!(embedded, updated);
        assert!(!twice.text.contains("a2ljaw=="));
    }

    #[test]
    fn test_missing_mapping_anchor_patches_nothing() {
        let text = TEMPLATE_DOCUMENT.replace("let samples = {};", "let kit = {};");
        let result = patch(&text, &kick_only());
        assert!(matches!(
            result,
            Err(PatchError::AnchorMissing { anchor }) if anchor == "let samples = {"
        ));
    }

    #[test]
    fn test_duplicate_mapping_anchor() {
        let text = format!("{}\nlet samples = {{}};\n", TEMPLATE_DOCUMENT);
        assert!(matches!(
            patch(&text, &kick_only()),
            Err(PatchError::AnchorNotUnique { count: 2, .. })
        ));
    }

    #[test]
    fn test_unterminated_declaration() {
        let text = "<script>\n    let samples = {\n</script>\n";
        assert!(matches!(
            patch(text, &kick_only()),
            Err(PatchError::UnterminatedDeclaration { .. })
        ));
    }

    #[test]
    fn test_missing_loader_inserts_data_block_only() {
        let text = "<script>\n    let samples = {};\n    start();\n</script>\n";
        let outcome = patch(text, &kick_only()).unwrap();

        assert_eq!(outcome.loader, LoaderPatch::NotFound);
        assert_eq!(
            outcome.text,
            "<script>\n    let samples = {};\n\n    // @embedded-samples begin\n    const embeddedSamples = {\n        kick: 'a2ljaw==',\n    };\n    // @embedded-samples end\n    start();\n</script>\n"
        );
    }

    #[test]
    fn test_text_after_mapping_close_survives() {
        let text = "    let samples = {}; let buffers = {};\n    go();\n";
        let outcome = patch(text, &kick_only()).unwrap();

        assert_eq!(outcome.loader, LoaderPatch::NotFound);
        assert_eq!(
            outcome.text,
            "    let samples = {};\n\n    // @embedded-samples begin\n    const embeddedSamples = {\n        kick: 'a2ljaw==',\n    };\n    // @embedded-samples end\n    let buffers = {};\n    go();\n"
        );

        let twice = patch(&outcome.text, &kick_only()).unwrap();
        assert_eq!(twice.data_block, DataBlockPatch::Replaced);
        assert_eq!(twice.text, outcome.text);
    }

    #[test]
    fn test_loader_anchor_with_prefix() {
        let set = SampleSet::new(vec![SampleEntry::new("kick", "kick.wav")]).unwrap();
        let anchors = Anchors::default();
        let text = "let samples = {};\n<script>async function loadSamples() {\n    old();\n}\n</script>\n";

        let outcome = patch_document(text, &kick_only(), &set, &anchors).unwrap();
        assert_eq!(outcome.loader, LoaderPatch::Replaced);
        assert_eq!(
            outcome.text,
            format!(
                "let samples = {{}};\n\n{}\n<script>{}\n</script>\n",
                render_data_block(&kick_only(), ""),
                render_loader(&set, anchors.loader(), "").unwrap()
            )
        );

        let twice = patch_document(&outcome.text, &kick_only(), &set, &anchors).unwrap();
        assert_eq!(twice.text, outcome.text);
    }

    #[test]
    fn test_indented_loader_anchor_with_prefix() {
        let set = SampleSet::new(vec![SampleEntry::new("kick", "kick.wav")]).unwrap();
        let anchors = Anchors::default();
        let text = "let samples = {};\n    <script>async function loadSamples() {\n        old();\n    }\n    </script>\n";

        let outcome = patch_document(text, &kick_only(), &set, &anchors).unwrap();
        let routine = render_loader(&set, anchors.loader(), "    ").unwrap();
        assert!(outcome.text.contains(&format!(
            "\n    <script>{}\n    </script>\n",
            &routine[4..]
        )));
        assert!(outcome
            .text
            .contains("<script>async function loadSamples() {\n        // Embedded payloads win"));
        assert!(!outcome.text.contains("old();"));
    }

    #[test]
    fn test_unmarked_embedded_declaration() {
        let text = "let samples = {};\n\nconst embeddedSamples = {\n    kick: 'a2ljaw==',\n};\n";
        assert!(matches!(
            patch(text, &kick_only()),
            Err(PatchError::UnmarkedBlock)
        ));
    }

    #[test]
    fn test_duplicate_loader_anchor() {
        let text = format!(
            "{}\n<script>\nasync function loadSamples() {{\n}}\n</script>\n",
            TEMPLATE_DOCUMENT
        );
        assert!(matches!(
            patch(&text, &kick_only()),
            Err(PatchError::AnchorNotUnique { count: 2, .. })
        ));
    }

    #[test]
    fn test_unterminated_loader() {
        let text = "let samples = {};\nasync function loadSamples() {\n    go();\n";
        assert!(matches!(
            patch(text, &kick_only()),
            Err(PatchError::UnterminatedRoutine { .. })
        ));
    }

    #[test]
    fn test_custom_anchors() {
        let text = "var kit = [\n];\nfunction boot() {\n  old();\n}\n";
        let anchors = Anchors::new("var kit = [", "];", "function boot() {").unwrap();
        let set = SampleSet::new(vec![SampleEntry::new("kick", "kick.wav")]).unwrap();

        let outcome = patch_document(text, &kick_only(), &set, &anchors).unwrap();
        assert_eq!(outcome.loader, LoaderPatch::Replaced);
        assert!(outcome.text.starts_with("var kit = [\n];\n\n// @embedded-samples begin\n"));
        assert!(outcome.text.contains("function boot() {\n    // Embedded payloads win"));
        assert!(!outcome.text.contains("old();"));
        assert!(outcome.text.ends_with("}\n"));
    }

    #[test]
    fn test_find_unique() {
        assert_eq!(find_unique("abc", "b").unwrap(), Some(1));
        assert_eq!(find_unique("abc", "x").unwrap(), None);
        assert!(matches!(
            find_unique("abab", "ab"),
            Err(PatchError::AnchorNotUnique { count: 2, .. })
        ));
    }

    #[test]
    fn test_indentation() {
        let text = "a\n\t  let x = 1;\n";
        let position = text.find("let").unwrap();
        assert_eq!(line_start(text, position), 2);
        assert_eq!(indentation(text, position), "\t  ");
        assert_eq!(indentation("let", 0), "");
    }
}
