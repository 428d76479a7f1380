//! Fans reassembled trace lines out to the summary and detail views.
//!
//! The summary view is a terse, append-only history written once per
//! finalized line. The detail view mirrors the stream as it grows: the open
//! line is rendered immediately and rewritten in place until its newline
//! arrives.

use cockpit_protocol::StepKind;
use time::OffsetDateTime;

use crate::classify::LineCategory;
use crate::metrics::Extraction;
use crate::metrics::MetricsExtractor;
use crate::reassembler::LineUpdate;
use crate::reassembler::StreamReassembler;

pub const DEFAULT_SUMMARY_WIDTH: usize = 100;
pub const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryEntry {
    pub category: LineCategory,
    pub content: String,
    /// Set when the entry came from a structured step event rather than the
    /// raw stream.
    pub step: Option<StepKind>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailEntry {
    pub seq: u64,
    pub category: LineCategory,
    pub timestamp: OffsetDateTime,
    pub content: String,
    pub is_open: bool,
}

pub trait SummarySink {
    fn append(&mut self, entry: SummaryEntry);
    fn clear(&mut self);
}

pub trait DetailSink {
    fn append(&mut self, entry: DetailEntry);
    /// Replace the most recently appended entry.
    fn update_last(&mut self, entry: DetailEntry);
    fn clear(&mut self);
}

/// Cut `content` to `width` characters, marking the cut with [`ELLIPSIS`].
pub fn truncate_summary(content: &str, width: usize) -> String {
    match content.char_indices().nth(width) {
        Some((cut, _)) => {
            let mut truncated = String::with_capacity(cut + ELLIPSIS.len());
            truncated.push_str(&content[..cut]);
            truncated.push_str(ELLIPSIS);
            truncated
        }
        None => content.to_string(),
    }
}

fn capture_timestamp() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

fn step_category(kind: StepKind) -> LineCategory {
    match kind {
        StepKind::Thinking => LineCategory::Thinking,
        StepKind::Action => LineCategory::Action,
        StepKind::Finish => LineCategory::Finish,
        StepKind::Result | StepKind::Error => LineCategory::Plain,
    }
}

/// Reassembler, metrics extractor and both sinks for one trace stream.
pub struct TracePipeline<S, D> {
    reassembler: StreamReassembler,
    metrics: MetricsExtractor,
    summary: S,
    detail: D,
    summary_width: usize,
}

impl<S, D> TracePipeline<S, D>
where
    S: SummarySink,
    D: DetailSink,
{
    pub fn new(summary: S, detail: D) -> Self {
        Self::with_summary_width(summary, detail, DEFAULT_SUMMARY_WIDTH)
    }

    /// `summary_width` is capped at [`DEFAULT_SUMMARY_WIDTH`] so summary
    /// entries never exceed it plus the ellipsis.
    pub fn with_summary_width(summary: S, detail: D, summary_width: usize) -> Self {
        if summary_width > DEFAULT_SUMMARY_WIDTH {
            tracing::warn!(summary_width, max = DEFAULT_SUMMARY_WIDTH, "summary width capped");
        }
        Self {
            reassembler: StreamReassembler::new(),
            metrics: MetricsExtractor::new(),
            summary,
            detail,
            summary_width: summary_width.min(DEFAULT_SUMMARY_WIDTH),
        }
    }

    pub fn ingest(&mut self, fragment: &str) {
        for update in self.reassembler.ingest(fragment) {
            self.publish(update);
        }
    }

    pub fn publish(&mut self, update: LineUpdate) {
        let LineUpdate { line, is_new_line } = update;
        let entry = DetailEntry {
            seq: line.seq(),
            category: line.category(),
            timestamp: capture_timestamp(),
            content: line.content().to_string(),
            is_open: line.is_open(),
        };
        if is_new_line {
            self.detail.append(entry);
        } else {
            self.detail.update_last(entry);
        }

        if line.is_open() {
            return;
        }
        match self.metrics.observe(&line) {
            Extraction::Passthrough if line.is_blank() => {}
            Extraction::Passthrough => self.summarize(line.category(), line.content(), None),
            Extraction::Skipped => {}
            Extraction::Entry(metric) => {
                self.summarize(LineCategory::Performance, &metric.display_text(), None);
            }
        }
    }

    pub fn record_step(&mut self, kind: StepKind, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        self.summarize(step_category(kind), text, Some(kind));
    }

    /// Drop the open line; rendered history stays.
    pub fn discard_open_line(&mut self) {
        self.reassembler.reset();
    }

    /// Mark the end of the current stream so a trailing metrics block is
    /// recorded as completed.
    pub fn end_of_stream(&mut self) {
        self.metrics.close();
    }

    /// Forget everything: open line, metrics and both views.
    pub fn reset(&mut self) {
        self.reassembler.reset();
        self.metrics.reset();
        self.summary.clear();
        self.detail.clear();
    }

    pub fn reassembler(&self) -> &StreamReassembler {
        &self.reassembler
    }

    pub fn metrics(&self) -> &MetricsExtractor {
        &self.metrics
    }

    pub fn summary(&self) -> &S {
        &self.summary
    }

    pub fn detail(&self) -> &D {
        &self.detail
    }

    fn summarize(&mut self, category: LineCategory, content: &str, step: Option<StepKind>) {
        self.summary.append(SummaryEntry {
            category,
            content: truncate_summary(content, self.summary_width),
            step,
        });
    }
}
