use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::state::ParserState;
use crate::errors::{ParseError, ParseResult};
use crate::models::Channel;

/// What to do when a directive inside an entry is malformed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// Stop parsing and report the error
    #[default]
    Abort,
    /// Log a warning, drop the entry and keep going
    SkipEntry,
}

/// Text lines ended by `\n`, `\r\n` or a lone `\r`
///
/// `BufRead::lines` only knows `\n`; playlists saved with classic Mac line
/// endings would otherwise read as one line.
struct UniversalLines<R> {
    reader: R,
    skip_lf: bool,
}

impl<R: BufRead> UniversalLines<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            skip_lf: false,
        }
    }

    fn decode(bytes: Vec<u8>) -> io::Result<String> {
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

impl<R: BufRead> Iterator for UniversalLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = Vec::new();
        loop {
            let available = match self.reader.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Some(Err(e)),
            };
            if available.is_empty() {
                break;
            }
            // `\r` ended the previous line; a directly following `\n` belongs to it
            if self.skip_lf {
                self.skip_lf = false;
                if available[0] == b'\n' {
                    self.reader.consume(1);
                    continue;
                }
            }

            let (used, complete) = match available.iter().position(|b| matches!(b, b'\n' | b'\r')) {
                Some(end) => {
                    line.extend_from_slice(&available[..end]);
                    self.skip_lf = available[end] == b'\r';
                    (end + 1, true)
                }
                None => {
                    line.extend_from_slice(available);
                    (available.len(), false)
                }
            };
            self.reader.consume(used);
            if complete {
                return Some(Self::decode(line));
            }
        }

        if line.is_empty() {
            None
        } else {
            Some(Self::decode(line))
        }
    }
}

/// Lazy channel reader over an extended M3U playlist
///
/// Yields one [`Channel`] per entry as soon as the entry's address line is
/// read. The iterator is fused: after an error it yields nothing more.
pub struct PlaylistParser<R> {
    lines: UniversalLines<R>,
    source: PathBuf,
    state: ParserState,
    policy: MalformedPolicy,
    line_number: usize,
    emitted: usize,
    skipped: usize,
    done: bool,
}

impl PlaylistParser<BufReader<File>> {
    /// Open a playlist file; fails before any line is read if it cannot be opened
    pub fn open<P: AsRef<Path>>(path: P, policy: MalformedPolicy) -> ParseResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ParseError::source_unavailable(path, e))?;
        debug!("Opened playlist {}", path.display());
        Ok(Self::from_reader(BufReader::new(file), path, policy))
    }
}

impl<R: BufRead> PlaylistParser<R> {
    /// Parse from any buffered reader; `source` labels it in errors and logs
    pub fn from_reader<P: Into<PathBuf>>(reader: R, source: P, policy: MalformedPolicy) -> Self {
        Self {
            lines: UniversalLines::new(reader),
            source: source.into(),
            state: ParserState::new(),
            policy,
            line_number: 0,
            emitted: 0,
            skipped: 0,
            done: false,
        }
    }

    /// Entries dropped so far under [`MalformedPolicy::SkipEntry`]
    pub fn skipped_entries(&self) -> usize {
        self.skipped
    }

    fn finish(&mut self) {
        self.done = true;
        let dropped = self.state.finish();
        if !self.state.header_seen() {
            debug!(
                "No EXTM3U header found in {}, playlist yields no channels",
                self.source.display()
            );
        } else if dropped > 0 {
            debug!(
                "Dropped {} directive line(s) without a stream address at end of {}",
                dropped,
                self.source.display()
            );
        }
        debug!(
            "Finished parsing {}: {} channel(s) emitted, {} entries skipped",
            self.source.display(),
            self.emitted,
            self.skipped
        );
    }
}

impl<R: BufRead> Iterator for PlaylistParser<R> {
    type Item = ParseResult<Channel>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(ParseError::source_unavailable(self.source.clone(), e)));
                }
                None => {
                    self.finish();
                    return None;
                }
            };
            self.line_number += 1;

            let Some(section) = self.state.feed(self.line_number, &line) else {
                continue;
            };

            match section.into_channel() {
                Ok(channel) => {
                    self.emitted += 1;
                    return Some(Ok(channel));
                }
                Err(e) if self.policy == MalformedPolicy::SkipEntry => {
                    warn!("Skipping playlist entry in {}: {}", self.source.display(), e);
                    self.skipped += 1;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

impl<R: BufRead> std::iter::FusedIterator for PlaylistParser<R> {}
