//! Recording doubles for the view traits.

use crate::chat::ChatMessage;
use crate::chat::ChatView;
use crate::publisher::DetailEntry;
use crate::publisher::DetailSink;
use crate::publisher::SummaryEntry;
use crate::publisher::SummarySink;
use crate::session::ProcessPanel;

#[derive(Debug, Default)]
pub(crate) struct RecordingSummary {
    pub entries: Vec<SummaryEntry>,
    pub clears: usize,
}

impl SummarySink for RecordingSummary {
    fn append(&mut self, entry: SummaryEntry) {
        self.entries.push(entry);
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.clears += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DetailCall {
    Append,
    UpdateLast,
}

#[derive(Debug, Default)]
pub(crate) struct RecordingDetail {
    pub entries: Vec<DetailEntry>,
    pub calls: Vec<(DetailCall, DetailEntry)>,
    pub clears: usize,
}

impl DetailSink for RecordingDetail {
    fn append(&mut self, entry: DetailEntry) {
        self.calls.push((DetailCall::Append, entry.clone()));
        self.entries.push(entry);
    }

    fn update_last(&mut self, entry: DetailEntry) {
        self.calls.push((DetailCall::UpdateLast, entry.clone()));
        match self.entries.last_mut() {
            Some(last) => *last = entry,
            None => self.entries.push(entry),
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.clears += 1;
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingChat {
    pub messages: Vec<ChatMessage>,
    pub updates: usize,
}

impl ChatView for RecordingChat {
    fn append(&mut self, message: &ChatMessage) {
        self.messages.push(message.clone());
    }

    fn update(&mut self, message: &ChatMessage) {
        self.updates += 1;
        if let Some(existing) = self
            .messages
            .iter_mut()
            .rev()
            .find(|existing| existing.id == message.id)
        {
            *existing = message.clone();
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingPanel {
    pub visible: bool,
    pub toggles: usize,
}

impl ProcessPanel for RecordingPanel {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.toggles += 1;
    }
}
