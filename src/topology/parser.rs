// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Node configuration parser.
//!
//! Two mutually exclusive grammars are accepted per raw string, selected by
//! sniffing the trimmed content:
//!
//! * **Structured form** - a JSON array of node objects, or a JSON object
//!   mapping resource paths to node objects (the serialized registry form).
//! * **Compact form** - an assignment list:
//!
//!   ```text
//!   config    := entry (',' entry)*
//!   entry     := path '=' valueList
//!   valueList := '[' uri (',' uri)* ']'  |  uri (',' uri)*
//!   ```
//!
//! An unbracketed value list has no closing delimiter, so its end is
//! inferred: scan ahead to the next `=` (the start of the following entry)
//! and backtrack to the last `,` (or `;` when no comma exists) before it.
//! This heuristic can mis-read URIs that themselves contain `=`; the
//! behavior is kept as documented rather than corrected, and the bracketed
//! form is the unambiguous alternative.
//!
//! All failures are recoverable: a malformed raw string only loses its own
//! remaining entries, never descriptors already produced.

use std::collections::BTreeMap;

use log::warn;
use thiserror::Error;
use url::Url;

use super::node::NodeDescriptor;

/// Parse zero or more raw configuration strings into node descriptors.
///
/// Empty and blank strings contribute nothing; parse failures are logged
/// and skipped so one bad entry cannot take down the rest of the
/// configuration.
pub fn parse_node_configs<S: AsRef<str>>(raw_configs: &[S]) -> Vec<NodeDescriptor> {
    let mut descriptors = Vec::new();

    for raw in raw_configs {
        let raw = raw.as_ref();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }

        let structured = (trimmed.starts_with('{') && trimmed.ends_with('}'))
            || (trimmed.starts_with('[') && trimmed.ends_with(']'));

        if structured {
            match parse_structured(trimmed) {
                Ok(mut list) => descriptors.append(&mut list),
                Err(e) => warn!("Invalid structured node list: {e} [{raw}]"),
            }
        } else if let Err(e) = parse_compact(trimmed, &mut descriptors) {
            warn!("Invalid node list: {e} [{raw}]");
        }
    }

    descriptors
}

/// Parse the structured (JSON) form.
fn parse_structured(trimmed: &str) -> Result<Vec<NodeDescriptor>, serde_json::Error> {
    if trimmed.starts_with('[') {
        return serde_json::from_str::<Vec<NodeDescriptor>>(trimmed);
    }

    // An object is the serialized registry: resource path -> node. A node
    // object on its own is accepted too.
    match serde_json::from_str::<BTreeMap<String, NodeDescriptor>>(trimmed) {
        Ok(map) => Ok(map
            .into_iter()
            .map(|(resource, mut descriptor)| {
                if descriptor.resource.trim().is_empty() {
                    descriptor.resource = resource;
                }
                descriptor
            })
            .collect()),
        Err(_) => serde_json::from_str::<NodeDescriptor>(trimmed).map(|d| vec![d]),
    }
}

#[derive(Debug, Error)]
enum CompactError {
    #[error("invalid instance uri [{uri}]: {source}")]
    InvalidUri {
        uri: String,
        source: url::ParseError,
    },

    /// An unbracketed value list ran into the next `=` without any `,` or
    /// `;` to backtrack to.
    #[error("missing separator before next entry")]
    MissingSeparator,
}

/// States of the compact-form parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Consuming a resource path, up to `=`.
    ExpectPath,
    /// Consuming a bracketed or unbracketed URI list.
    ExpectValueList,
    /// Between entries; an optional `,` precedes the next path.
    ExpectSeparator,
}

/// Cursor over a raw compact-form string.
struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
    }

    /// Consume `ch` if it is next; report whether it was.
    fn eat(&mut self, ch: char) -> bool {
        if self.rest().starts_with(ch) {
            self.pos += ch.len_utf8();
            true
        } else {
            false
        }
    }

    /// Consume up to and including the next `ch`, returning the text before
    /// it. `None` when `ch` does not occur in the remaining input.
    fn take_to(&mut self, ch: char) -> Option<&'a str> {
        let rest = self.rest();
        let idx = rest.find(ch)?;
        self.pos += idx + ch.len_utf8();
        Some(&rest[..idx])
    }
}

/// Parse the compact assignment-list form, appending descriptors as entries
/// complete.
///
/// On error the descriptors parsed so far remain in `out`; only the
/// remainder of this raw string is discarded.
fn parse_compact(raw: &str, out: &mut Vec<NodeDescriptor>) -> Result<(), CompactError> {
    let mut scanner = Scanner::new(raw);
    let mut state = ParseState::ExpectPath;
    let mut path = "";

    loop {
        scanner.skip_whitespace();

        match state {
            ParseState::ExpectPath => {
                match scanner.take_to('=') {
                    Some(p) => {
                        path = p.trim();
                        state = ParseState::ExpectValueList;
                    }
                    // trailing text without '=' starts no entry
                    None => return Ok(()),
                }
            }

            ParseState::ExpectValueList => {
                let bracketed = scanner.eat('[');
                if bracketed {
                    scanner.skip_whitespace();
                }

                let rest = scanner.rest();
                let (values, consumed, next) = match bracketed.then(|| rest.find(']')).flatten() {
                    Some(end) => (&rest[..end], end + 1, ParseState::ExpectSeparator),
                    // an unterminated bracket degrades to the unbracketed rule
                    None => unbracketed_span(rest)?,
                };

                let instances = parse_uri_list(values)?;
                out.push(NodeDescriptor::from_entry(path, instances));

                scanner.advance(consumed);
                state = next;
            }

            ParseState::ExpectSeparator => {
                if scanner.rest().is_empty() {
                    return Ok(());
                }
                scanner.eat(',');
                state = ParseState::ExpectPath;
            }
        }
    }
}

/// Determine where an unbracketed value list ends.
///
/// Returns the value text, the number of bytes to consume (including a
/// trailing separator when one is part of the cut), and the follow-up state.
fn unbracketed_span(rest: &str) -> Result<(&str, usize, ParseState), CompactError> {
    match rest.find('=') {
        Some(eq) => {
            let head = &rest[..eq];
            let cut = head
                .rfind(',')
                .or_else(|| head.rfind(';'))
                .ok_or(CompactError::MissingSeparator)?;
            Ok((&rest[..cut], cut + 1, ParseState::ExpectPath))
        }
        None => Ok((rest, rest.len(), ParseState::ExpectSeparator)),
    }
}

/// Split a comma-separated URI list, trimming and parsing each entry.
fn parse_uri_list(values: &str) -> Result<Vec<Url>, CompactError> {
    values
        .split(',')
        .map(str::trim)
        .map(|uri| {
            Url::parse(uri).map_err(|source| CompactError::InvalidUri {
                uri: uri.to_string(),
                source,
            })
        })
        .collect()
}
