//! Restructures the agent's performance report into label/value/unit entries.
//!
//! The agent prints timing blocks like:
//!
//! ```text
//! ⏱️  性能指标:
//! --------------------------------------------------
//! 首 Token 延迟 (TTFT): 0.523s
//! 总推理时间: 2.345s
//! ```
//!
//! A finalized performance line opens a block; following performance lines
//! (separators skipped) are members until a blank line or any other kind of
//! line ends it.

use std::sync::OnceLock;

use regex_lite::Regex;
use serde::Serialize;
use strum_macros::Display;

use crate::classify::LineCategory;
use crate::reassembler::LogLine;

const COMPLETED_CAPACITY: usize = 8;
const TITLE_MARKERS: &[&str] = &["性能指标", "Performance"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum MetricUnit {
    #[strum(serialize = "ms")]
    #[serde(rename = "ms")]
    Milliseconds,
    #[strum(serialize = "s")]
    #[serde(rename = "s")]
    Seconds,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricEntry {
    pub label: String,
    /// Numeric text exactly as printed, empty when the line had no reading.
    pub value: String,
    pub unit: Option<MetricUnit>,
}

impl MetricEntry {
    fn raw(text: &str) -> Self {
        Self {
            label: text.trim().to_string(),
            value: String::new(),
            unit: None,
        }
    }

    pub fn as_millis(&self) -> Option<f64> {
        let value: f64 = self.value.parse().ok()?;
        match self.unit? {
            MetricUnit::Milliseconds => Some(value),
            MetricUnit::Seconds => Some(value * 1000.0),
        }
    }

    /// Single-line rendering used by the summary view.
    pub fn display_text(&self) -> String {
        match self.unit {
            Some(unit) if self.label.is_empty() => format!("{}{unit}", self.value),
            Some(unit) => format!("{}: {}{unit}", self.label, self.value),
            None => self.label.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsBlock {
    pub title: Option<String>,
    pub entries: Vec<MetricEntry>,
}

impl MetricsBlock {
    fn absorb(&mut self, content: &str) -> Extraction {
        if let Some(entry) = parse_metric_line(content) {
            self.entries.push(entry.clone());
            return Extraction::Entry(entry);
        }
        if self.restates_title(content) {
            return Extraction::Skipped;
        }
        let entry = MetricEntry::raw(content);
        self.entries.push(entry.clone());
        Extraction::Entry(entry)
    }

    fn restates_title(&self, content: &str) -> bool {
        let trimmed = content.trim();
        self.title.as_deref() == Some(trimmed)
            || TITLE_MARKERS.iter().any(|marker| trimmed.contains(marker))
    }

    fn is_empty(&self) -> bool {
        self.title.is_none() && self.entries.is_empty()
    }
}

/// What became of a finalized line handed to the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Not part of a metrics block.
    Passthrough,
    /// Block title, restated title or separator inside a block.
    Skipped,
    Entry(MetricEntry),
}

#[derive(Debug, Default)]
pub struct MetricsExtractor {
    current: Option<MetricsBlock>,
    completed: Vec<MetricsBlock>,
}

impl MetricsExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a finalized line. Open lines must not be passed here.
    pub fn observe(&mut self, line: &LogLine) -> Extraction {
        if let Some(block) = self.current.as_mut() {
            if line.is_blank() {
                self.close();
                return Extraction::Passthrough;
            }
            match line.category() {
                LineCategory::Separator => return Extraction::Skipped,
                LineCategory::Performance => return block.absorb(line.content()),
                _ => {
                    self.close();
                }
            }
        }

        if line.category() != LineCategory::Performance {
            return Extraction::Passthrough;
        }

        let mut block = MetricsBlock::default();
        let extraction = match parse_metric_line(line.content()) {
            Some(entry) => {
                block.entries.push(entry.clone());
                Extraction::Entry(entry)
            }
            None => {
                block.title = Some(line.content().trim().to_string());
                Extraction::Skipped
            }
        };
        self.current = Some(block);
        extraction
    }

    /// End the block being collected, if any.
    pub fn close(&mut self) -> Option<&MetricsBlock> {
        let block = self.current.take()?;
        if block.is_empty() {
            return None;
        }
        tracing::debug!(entries = block.entries.len(), "metrics block completed");
        if self.completed.len() == COMPLETED_CAPACITY {
            self.completed.remove(0);
        }
        self.completed.push(block);
        self.completed.last()
    }

    pub fn current(&self) -> Option<&MetricsBlock> {
        self.current.as_ref()
    }

    /// Completed blocks, oldest first.
    pub fn completed(&self) -> &[MetricsBlock] {
        &self.completed
    }

    pub fn reset(&mut self) {
        self.current = None;
        self.completed.clear();
    }
}

fn metric_token() -> Option<&'static Regex> {
    static METRIC_TOKEN: OnceLock<Option<Regex>> = OnceLock::new();
    METRIC_TOKEN
        .get_or_init(|| Regex::new(r"(\d+(?:\.\d+)?)\s*(ms|s)\b").ok())
        .as_ref()
}

/// Split a line at its first `<number><unit>` reading. Text after the reading
/// is dropped.
pub fn parse_metric_line(content: &str) -> Option<MetricEntry> {
    let captures = metric_token()?.captures(content)?;
    let reading = captures.get(0)?;
    let value = captures.get(1)?.as_str().to_string();
    let unit = match captures.get(2)?.as_str() {
        "ms" => MetricUnit::Milliseconds,
        _ => MetricUnit::Seconds,
    };
    let label = content[..reading.start()]
        .trim()
        .trim_end_matches([':', '：'])
        .trim_end()
        .to_string();
    Some(MetricEntry {
        label,
        value,
        unit: Some(unit),
    })
}
