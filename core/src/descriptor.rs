// Copyright 2026 The Graft Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Descriptor file parsing.
//!
//! A descriptor resource is UTF-8 text, one entry per line. `#` starts a
//! line comment. After trimming, an entry is `names = implementation-id` or
//! a bare `implementation-id`; the left side may list several comma-separated
//! names, the first of which is primary.

/// One parsed descriptor entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DescriptorLine {
    /// The trimmed line as it appeared, used to index captured diagnostics.
    pub raw: String,
    /// Explicit names; empty when the name is derived from the class.
    pub names: Vec<String>,
    /// Fully-qualified implementation id.
    pub id: String,
}

/// Parse one descriptor line. Comments and blank lines yield `None`.
pub(crate) fn parse_line(line: &str) -> Option<DescriptorLine> {
    let line = match line.find('#') {
        Some(i) => &line[..i],
        None => line,
    };
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (names, id) = match line.split_once('=') {
        Some((lhs, rhs)) => {
            let names = lhs
                .split(',')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect();
            (names, rhs.trim())
        }
        None => (Vec::new(), line),
    };
    if id.is_empty() {
        return None;
    }

    Some(DescriptorLine {
        raw: line.to_string(),
        names,
        id: id.to_string(),
    })
}

/// Parse a whole resource into entries, skipping comments and blanks.
pub(crate) fn parse_resource(contents: &str) -> Vec<DescriptorLine> {
    contents.lines().filter_map(parse_line).collect()
}
