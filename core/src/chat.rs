//! Token-by-token growth of assistant replies.

use std::collections::VecDeque;

use strum_macros::Display;
use time::OffsetDateTime;
use uuid::Uuid;

pub const DEFAULT_CHAT_HISTORY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    /// Locally synthesized notice.
    System,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub text: String,
    pub sealed: bool,
    pub created_at: OffsetDateTime,
}

impl ChatMessage {
    fn new(role: ChatRole, text: impl Into<String>, sealed: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            sealed,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

pub trait ChatView {
    fn append(&mut self, message: &ChatMessage);
    /// Re-render a previously appended message, matched by `message.id`.
    fn update(&mut self, message: &ChatMessage);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulatorState {
    Idle,
    Accumulating,
}

pub struct ChatAccumulator<V> {
    view: V,
    history: VecDeque<ChatMessage>,
    capacity: usize,
    current: Option<Uuid>,
}

impl<V: ChatView> ChatAccumulator<V> {
    pub fn new(view: V) -> Self {
        Self::with_capacity(view, DEFAULT_CHAT_HISTORY)
    }

    pub fn with_capacity(view: V, capacity: usize) -> Self {
        Self {
            view,
            history: VecDeque::new(),
            capacity: capacity.max(1),
            current: None,
        }
    }

    pub fn state(&self) -> AccumulatorState {
        if self.current.is_some() {
            AccumulatorState::Accumulating
        } else {
            AccumulatorState::Idle
        }
    }

    pub fn on_chunk(&mut self, text: &str) {
        if let Some(id) = self.current {
            if let Some(message) = self.history.iter_mut().rev().find(|message| message.id == id) {
                message.text.push_str(text);
                self.view.update(message);
                return;
            }
            // Evicted while streaming; start over with a fresh message.
            self.current = None;
        }
        let message = ChatMessage::new(ChatRole::Assistant, text, false);
        self.current = Some(message.id);
        self.push(message);
    }

    pub fn on_complete(&mut self) {
        let Some(id) = self.current.take() else {
            tracing::debug!("completion signal without a streaming reply");
            return;
        };
        if let Some(message) = self.history.iter_mut().rev().find(|message| message.id == id) {
            message.sealed = true;
            self.view.update(message);
        }
    }

    pub fn push_user(&mut self, text: &str) {
        self.push(ChatMessage::new(ChatRole::User, text, true));
    }

    pub fn push_notice(&mut self, role: ChatRole, text: impl Into<String>) {
        self.push(ChatMessage::new(role, text, true));
    }

    pub fn current(&self) -> Option<&ChatMessage> {
        let id = self.current?;
        self.history.iter().rev().find(|message| message.id == id)
    }

    pub fn history(&self) -> impl Iterator<Item = &ChatMessage> {
        self.history.iter()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    fn push(&mut self, message: ChatMessage) {
        self.view.append(&message);
        self.history.push_back(message);
        while self.history.len() > self.capacity {
            if let Some(evicted) = self.history.pop_front()
                && self.current == Some(evicted.id)
            {
                self.current = None;
            }
        }
    }
}
