use std::fmt;
use std::io::{self, Write};

use tracing::warn;

use crate::errors::BackendError;
use crate::models::Channel;

/// Outcome for a single playlist channel
#[derive(Debug)]
pub enum SyncDecision<'a> {
    Added(&'a Channel),
    Skipped(&'a Channel),
    WouldAdd(&'a Channel),
    Failed(&'a Channel, &'a BackendError),
}

impl SyncDecision<'_> {
    pub fn channel(&self) -> &Channel {
        match self {
            Self::Added(channel)
            | Self::Skipped(channel)
            | Self::WouldAdd(channel)
            | Self::Failed(channel, _) => channel,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Added(_) => "added",
            Self::Skipped(_) => "skipped",
            Self::WouldAdd(_) => "would add",
            Self::Failed(..) => "failed",
        }
    }
}

impl fmt::Display for SyncDecision<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let channel = self.channel();
        write!(
            f,
            "{}: {} at {}",
            self.label(),
            channel.display_name(),
            channel.url
        )?;
        if let Self::Failed(_, error) = self {
            write!(f, " ({error})")?;
        }
        Ok(())
    }
}

/// Receives each decision as soon as it is made
pub trait SyncObserver {
    fn on_decision(&mut self, decision: &SyncDecision<'_>);
}

impl<F> SyncObserver for F
where
    F: FnMut(&SyncDecision<'_>),
{
    fn on_decision(&mut self, decision: &SyncDecision<'_>) {
        self(decision)
    }
}

/// Writes one `<decision>: <name> at <url>` line per channel, flushed immediately
pub struct ConsoleObserver<W: Write = io::Stdout> {
    out: W,
    write_failed: bool,
}

impl ConsoleObserver<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleObserver<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            write_failed: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SyncObserver for ConsoleObserver<W> {
    fn on_decision(&mut self, decision: &SyncDecision<'_>) {
        let result = writeln!(self.out, "{decision}").and_then(|_| self.out.flush());
        if let Err(e) = result
            && !self.write_failed
        {
            warn!("Cannot write progress output: {}", e);
            self.write_failed = true;
        }
    }
}
