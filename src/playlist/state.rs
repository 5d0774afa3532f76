//! I/O-free playlist state machine
//!
//! [`ParserState`] consumes raw lines one at a time. It discards everything up
//! to and including the header line, then buffers directives until an address
//! line closes the entry and a [`Section`] is handed back. Interpreting the
//! directives happens in [`Section::into_channel`].

use std::collections::HashMap;

use super::line::{PlaylistLine, TAG_INF, TAG_VLCOPT, is_header};
use crate::errors::{ParseError, ParseResult};
use crate::models::Channel;

/// A directive waiting for its entry's address line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDirective {
    pub line_number: usize,
    pub tag: String,
    pub value: String,
}

impl PendingDirective {
    fn malformed(&self, message: &str) -> ParseError {
        ParseError::MalformedDirective {
            line_number: self.line_number,
            tag: self.tag.clone(),
            line: format!("#EXT{}:{}", self.tag, self.value),
            message: message.to_string(),
        }
    }
}

/// One complete playlist entry: its directives and the address that ended it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub directives: Vec<PendingDirective>,
    pub address: String,
    pub address_line: usize,
}

impl Section {
    /// Interpret the buffered directives into a channel
    ///
    /// `INF` names the channel with everything after its first comma, verbatim.
    /// `VLCOPT` splits at the first `=`; a repeated key keeps the last value.
    /// Other tags are ignored.
    pub fn into_channel(self) -> ParseResult<Channel> {
        let mut name = None;
        let mut extras = HashMap::new();

        for directive in &self.directives {
            match directive.tag.as_str() {
                TAG_INF => {
                    let (_duration, title) = directive
                        .value
                        .split_once(',')
                        .ok_or_else(|| directive.malformed("expected '<duration>,<name>'"))?;
                    name = Some(title.to_string());
                }
                TAG_VLCOPT => {
                    let (key, value) = directive
                        .value
                        .split_once('=')
                        .ok_or_else(|| directive.malformed("expected '<key>=<value>'"))?;
                    extras.insert(key.to_string(), value.to_string());
                }
                _ => {}
            }
        }

        Ok(Channel {
            name,
            url: self.address,
            extras,
        })
    }
}

#[derive(Debug, Default)]
pub struct ParserState {
    header_seen: bool,
    pending: Vec<PendingDirective>,
}

impl ParserState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header_seen(&self) -> bool {
        self.header_seen
    }

    /// Feed one raw line; returns a section once its address line arrives
    pub fn feed(&mut self, line_number: usize, raw: &str) -> Option<Section> {
        let line = raw.trim();
        if line.is_empty() {
            return None;
        }

        if !self.header_seen {
            if is_header(line) {
                self.header_seen = true;
            }
            return None;
        }

        match PlaylistLine::classify(line) {
            PlaylistLine::Directive { tag, value } => {
                self.pending.push(PendingDirective {
                    line_number,
                    tag,
                    value,
                });
                None
            }
            PlaylistLine::Address(address) => Some(Section {
                directives: std::mem::take(&mut self.pending),
                address,
                address_line: line_number,
            }),
        }
    }

    /// End of source: drop whatever is still buffered and report how much that was
    pub fn finish(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }
}
