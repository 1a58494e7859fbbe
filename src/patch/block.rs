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
use crate::encode::EncodedSamples;

use super::error::PatchError;
use super::{find_unique, indent_lines};

/// First line of the generated data block.
pub const BLOCK_BEGIN: &str = "// @embedded-samples begin";

/// Last line of the generated data block.
pub const BLOCK_END: &str = "// @embedded-samples end";

/// The variable the data block declares and the loader routine reads.
pub const EMBEDDED_VAR: &str = "embeddedSamples";

/// Byte range of an existing generated block, marker lines included.
pub(super) struct BlockSpan {
    pub start: usize,
    pub end: usize,
}

/// Renders the data block, one `name: '<base64>',` line per sample.
pub fn render_data_block(encoded: &EncodedSamples, indent: &str) -> String {
    let mut lines = vec![
        BLOCK_BEGIN.to_string(),
        format!("const {} = {{", EMBEDDED_VAR),
    ];
    for (name, payload) in encoded.iter() {
        lines.push(format!("    {}: '{}',", name, payload));
    }
    lines.push("};".to_string());
    lines.push(BLOCK_END.to_string());

    indent_lines(&lines, indent)
}

/// Finds a previously generated block. Both markers must be present exactly once and in
/// order, or neither.
pub(super) fn find_block(text: &str) -> Result<Option<BlockSpan>, PatchError> {
    let begin = find_unique(text, BLOCK_BEGIN)?;
    let end = find_unique(text, BLOCK_END)?;

    match (begin, end) {
        (None, None) => Ok(None),
        (Some(begin), Some(end)) if end > begin => Ok(Some(BlockSpan {
            start: super::line_start(text, begin),
            end: end + BLOCK_END.len(),
        })),
        _ => Err(PatchError::CorruptBlock),
    }
}

/// Reads the payloads back out of a generated block.
pub fn parse_data_block(text: &str) -> Result<Option<EncodedSamples>, PatchError> {
    let span = match find_block(text)? {
        Some(span) => span,
        None => return Ok(None),
    };

    let mut encoded = EncodedSamples::new();
    for line in text[span.start..span.end].lines().map(str::trim) {
        if line.is_empty()
            || line == BLOCK_BEGIN
            || line == BLOCK_END
            || line == "};"
            || line.starts_with("const ")
        {
            continue;
        }

        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| PatchError::MalformedEntry(line.to_string()))?;
        let payload = value
            .trim()
            .trim_end_matches(',')
            .strip_prefix('\'')
            .and_then(|value| value.strip_suffix('\''))
            .ok_or_else(|| PatchError::MalformedEntry(line.to_string()))?;
        encoded.insert(name.trim(), payload.to_string());
    }

    Ok(Some(encoded))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payloads() -> EncodedSamples {
        let mut encoded = EncodedSamples::new();
        encoded.insert("kick", "a2ljaw==".to_string());
        encoded.insert("hihat", "aGloYXQ=".to_string());
        encoded
    }

    #[test]
    fn test_render_data_block() {
        let block = render_data_block(&sample_payloads(), "  ");
        assert_eq!(
            block,
            "  // @embedded-samples begin\n  const embeddedSamples = {\n      kick: 'a2ljaw==',\n      hihat: 'aGloYXQ=',\n  };\n  // @embedded-samples end"
        );
    }

    #[test]
    fn test_render_empty_block() {
        let block = render_data_block(&EncodedSamples::new(), "");
        assert_eq!(
            block,
            "// @embedded-samples begin\nconst embeddedSamples = {\n};\n// @embedded-samples end"
        );
    }

    #[test]
    fn test_parse_data_block() {
        let text = format!(
            "<script>\n{}\n</script>\n",
            render_data_block(&sample_payloads(), "    ")
        );
        let parsed = parse_data_block(&text).unwrap().unwrap();
        assert_eq!(parsed, sample_payloads());
    }

    #[test]
    fn test_parse_without_block() {
        assert!(parse_data_block("<html></html>").unwrap().is_none());
    }

    #[test]
    fn test_unbalanced_markers() {
        let text = format!("{}\nconst embeddedSamples = {{}};\n", BLOCK_BEGIN);
        assert!(matches!(find_block(&text), Err(PatchError::CorruptBlock)));

        let text = format!("{}\n{}\n", BLOCK_END, BLOCK_BEGIN);
        assert!(matches!(find_block(&text), Err(PatchError::CorruptBlock)));
    }

    #[test]
    fn test_malformed_entry() {
        let text = format!("{}\n    kick = 'abc'\n{}\n", BLOCK_BEGIN, BLOCK_END);
        assert!(matches!(
            parse_data_block(&text),
            Err(PatchError::MalformedEntry(_))
        ));
    }
}
