// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identifier list ingestion
//!
//! Accepts hand-edited text: identifiers separated by commas, semicolons or
//! whitespace, optionally quoted, with `#` line comments.

use std::fs;
use std::path::Path;

use rustc_hash::FxHashSet;

use crate::error::Result;

const BOM: char = '\u{feff}';

/// Tokenize identifier text.
///
/// With `dedupe`, only the first occurrence of each identifier is kept.
pub fn parse_identifier_list(content: &str, dedupe: bool) -> Vec<String> {
    let content = content.strip_prefix(BOM).unwrap_or(content);
    let mut seen = FxHashSet::default();
    let mut ids = Vec::new();

    for line in content.lines() {
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        };
        for token in line.split(|c: char| c == ',' || c == ';' || c.is_whitespace()) {
            let token = token.trim_matches(|c| c == '"' || c == '\'');
            if token.is_empty() {
                continue;
            }
            if dedupe && !seen.insert(token) {
                continue;
            }
            ids.push(token.to_string());
        }
    }

    ids
}

/// Read and tokenize an identifier file
pub fn read_identifier_file(path: impl AsRef<Path>, dedupe: bool) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(parse_identifier_list(&content, dedupe))
}
