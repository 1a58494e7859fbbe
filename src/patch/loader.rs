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
use crate::config::SampleSet;

use super::block::EMBEDDED_VAR;
use super::error::PatchError;
use super::indent_lines;

/// Renders the replacement loader routine. `opener` is the routine's first line (the
/// loader anchor), so the rendered routine can be found again on the next run.
pub fn render_loader(
    samples: &SampleSet,
    opener: &str,
    indent: &str,
) -> Result<String, PatchError> {
    let mut lines = vec![
        opener.to_string(),
        "    // Embedded payloads win; anything not embedded is fetched next to the page."
            .to_string(),
        "    const sampleFiles = {".to_string(),
    ];
    for entry in samples.iter() {
        lines.push(format!(
            "        {}: {},",
            entry.name(),
            serde_json::to_string(entry.file())?
        ));
    }
    lines.push("    };".to_string());
    lines.push(String::new());

    let body = [
        "    for (const [name, file] of Object.entries(sampleFiles)) {",
        "        try {",
        "            if (EMBEDDED[name]) {",
        "                const binaryString = atob(EMBEDDED[name]);",
        "                const bytes = new Uint8Array(binaryString.length);",
        "                for (let i = 0; i < binaryString.length; i++) {",
        "                    bytes[i] = binaryString.charCodeAt(i);",
        "                }",
        "                samples[name] = await audioContext.decodeAudioData(bytes.buffer);",
        "                console.log(`✓ Loaded embedded sample: ${file}`);",
        "                continue;",
        "            }",
        "",
        "            const response = await fetch(file);",
        "            if (response.ok) {",
        "                const arrayBuffer = await response.arrayBuffer();",
        "                samples[name] = await audioContext.decodeAudioData(arrayBuffer);",
        "                console.log(`✓ Loaded sample from file: ${file}`);",
        "            } else {",
        "                console.log(`✗ Sample ${file} not found (${response.status})`);",
        "            }",
        "        } catch (e) {",
        "            console.log(`✗ Error loading ${file}:`, e.message);",
        "        }",
        "    }",
        "}",
    ];
    lines.extend(body.iter().map(|line| line.replace("EMBEDDED", EMBEDDED_VAR)));

    Ok(indent_lines(&lines, indent))
}

/// Finds the end of the routine whose opener is at `start`. The routine ends at the
/// first later line made up of exactly the opener line's indentation and `}`. Returns
/// the byte offset just past that `}`.
pub(super) fn find_routine_end(text: &str, start: usize, indent: &str) -> Option<usize> {
    let closing = format!("{}}}", indent);

    let first_line_end = text[start..].find('\n')? + start + 1;
    let mut offset = first_line_end;
    for line in text[first_line_end..].split_inclusive('\n') {
        let content = line.trim_end_matches('\n').trim_end_matches('\r');
        if content == closing {
            return Some(offset + closing.len());
        }
        offset += line.len();
    }

    None
}
