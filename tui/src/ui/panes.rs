//! Terminal-side implementations of the engine's render traits. Each pane only
//! stores what it was given; drawing happens in [`super::CockpitView`].

use std::collections::VecDeque;

use cockpit_core::ChatMessage;
use cockpit_core::ChatView;
use cockpit_core::DetailEntry;
use cockpit_core::DetailSink;
use cockpit_core::ProcessPanel;
use cockpit_core::SummaryEntry;
use cockpit_core::SummarySink;

#[derive(Debug, Default)]
pub struct SummaryPane {
    entries: Vec<SummaryEntry>,
}

impl SummaryPane {
    pub fn entries(&self) -> &[SummaryEntry] {
        &self.entries
    }
}

impl SummarySink for SummaryPane {
    fn append(&mut self, entry: SummaryEntry) {
        self.entries.push(entry);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Bounded: the oldest entries go once `capacity` is exceeded.
#[derive(Debug)]
pub struct DetailPane {
    entries: VecDeque<DetailEntry>,
    capacity: usize,
    dropped: u64,
}

impl DetailPane {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
            dropped: 0,
        }
    }

    pub fn entries(&self) -> impl ExactSizeIterator<Item = &DetailEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries evicted since the last clear.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl DetailSink for DetailPane {
    fn append(&mut self, entry: DetailEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
            self.dropped += 1;
        }
    }

    fn update_last(&mut self, entry: DetailEntry) {
        match self.entries.back_mut() {
            Some(last) if last.seq == entry.seq => *last = entry,
            _ => {
                tracing::debug!(seq = entry.seq, "in-place update without a rendered line");
                self.append(entry);
            }
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.dropped = 0;
    }
}

#[derive(Debug)]
pub struct ChatPane {
    messages: VecDeque<ChatMessage>,
    capacity: usize,
}

impl ChatPane {
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn messages(&self) -> impl ExactSizeIterator<Item = &ChatMessage> {
        self.messages.iter()
    }
}

impl ChatView for ChatPane {
    fn append(&mut self, message: &ChatMessage) {
        self.messages.push_back(message.clone());
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
    }

    fn update(&mut self, message: &ChatMessage) {
        if let Some(existing) = self
            .messages
            .iter_mut()
            .rev()
            .find(|existing| existing.id == message.id)
        {
            existing.clone_from(message);
        }
    }
}

#[derive(Debug, Default)]
pub struct PanelToggle {
    visible: bool,
}

impl PanelToggle {
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl ProcessPanel for PanelToggle {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}
