//! Reassembles an arbitrarily chunked text stream into logical lines.
//!
//! Fragment boundaries carry no meaning: a fragment may end mid-line, hold
//! several lines, or be a lone newline. The reassembler keeps at most one open
//! line across calls and reports every change as a [`LineUpdate`].
//!
//! Fragments must be fed in delivery order and without duplicates. There are
//! no sequence numbers on the wire, so a transport gap cannot be detected here:
//! after a resume the next fragment is simply appended to the open line.

use crate::classify::LineCategory;
use crate::classify::classify;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    seq: u64,
    content: String,
    category: LineCategory,
    is_open: bool,
}

impl LogLine {
    fn open(seq: u64) -> Self {
        Self {
            seq,
            content: String::new(),
            category: LineCategory::Plain,
            is_open: true,
        }
    }

    fn append(&mut self, piece: &str) {
        debug_assert!(self.is_open, "finalized lines are immutable");
        self.content.push_str(piece);
        self.category = classify(&self.content);
    }

    fn close(&mut self) {
        self.is_open = false;
    }

    /// Position of the line in the stream since the reassembler was created.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn category(&self) -> LineCategory {
        self.category
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Snapshot of a line after an ingest step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineUpdate {
    pub line: LogLine,
    /// The line did not exist before this update, so nothing has been
    /// rendered for it yet.
    pub is_new_line: bool,
}

impl LineUpdate {
    pub fn is_final(&self) -> bool {
        !self.line.is_open
    }
}

#[derive(Debug, Default)]
pub struct StreamReassembler {
    open: Option<LogLine>,
    next_seq: u64,
}

impl StreamReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_line(&self) -> Option<&LogLine> {
        self.open.as_ref()
    }

    pub fn ingest(&mut self, fragment: &str) -> Vec<LineUpdate> {
        let mut updates = Vec::new();
        if fragment.is_empty() {
            return updates;
        }

        let mut rest = fragment;
        while let Some(newline) = rest.find('\n') {
            let (mut line, is_new_line) = match self.open.take() {
                Some(line) => (line, false),
                None => (self.start_line(), true),
            };
            line.append(&rest[..newline]);
            line.close();
            updates.push(LineUpdate { line, is_new_line });
            rest = &rest[newline + 1..];
        }

        if !rest.is_empty() {
            let is_new_line = self.open.is_none();
            if is_new_line {
                let line = self.start_line();
                self.open = Some(line);
            }
            if let Some(line) = self.open.as_mut() {
                line.append(rest);
                updates.push(LineUpdate {
                    line: line.clone(),
                    is_new_line,
                });
            }
        }

        updates
    }

    /// Drop the open line without emitting it.
    pub fn reset(&mut self) {
        if let Some(line) = self.open.take() {
            tracing::debug!(seq = line.seq, "discarding open trace line");
        }
    }

    fn start_line(&mut self) -> LogLine {
        let line = LogLine::open(self.next_seq);
        self.next_seq += 1;
        line
    }
}
