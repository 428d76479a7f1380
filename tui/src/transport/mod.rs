//! Event sources feeding the console. A transport decodes whatever it reads
//! into [`TransportEvent`]s and fans them out to every subscriber, in order.

mod demo;
mod replay;

use std::sync::Arc;
use std::time::Duration;

use cockpit_protocol::InboundEvent;
use cockpit_protocol::OutboundCommand;
use color_eyre::eyre::Result;
use crossbeam_channel::Receiver;
use crossbeam_channel::RecvTimeoutError;
use crossbeam_channel::Sender;
use crossbeam_channel::unbounded;
use parking_lot::Mutex;

pub use demo::DemoTransport;
pub use demo::chop_at_char_boundaries;
pub use replay::ReplaySource;
pub use replay::ReplayTransport;

#[derive(Clone, Debug, PartialEq)]
pub enum TransportEvent {
    Connected,
    Inbound(InboundEvent),
    DecodeFailed(String),
    Disconnected { reason: String },
    /// The source is exhausted; nothing follows.
    Finished,
}

pub trait Transport: Send + Sync {
    fn subscribe(&self) -> Result<EventStream>;
    fn send(&self, command: OutboundCommand) -> Result<()>;
}

#[derive(Clone)]
pub struct TransportHandle {
    transport: Arc<dyn Transport>,
}

impl TransportHandle {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn subscribe(&self) -> Result<EventStream> {
        self.transport.subscribe()
    }

    pub fn send(&self, command: OutboundCommand) -> Result<()> {
        self.transport.send(command)
    }
}

#[derive(Clone, Debug)]
pub struct EventStream {
    inner: Receiver<TransportEvent>,
}

impl EventStream {
    pub fn try_next(&self) -> Option<TransportEvent> {
        self.inner.try_recv().ok()
    }

    /// `None` once `timeout` passes without an event or every sender is gone.
    pub fn next_timeout(&self, timeout: Duration) -> Option<TransportEvent> {
        match self.inner.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl From<Receiver<TransportEvent>> for EventStream {
    fn from(inner: Receiver<TransportEvent>) -> Self {
        Self { inner }
    }
}

#[derive(Default)]
pub(crate) struct Subscribers {
    senders: Mutex<Vec<Sender<TransportEvent>>>,
}

impl Subscribers {
    pub(crate) fn add(&self) -> EventStream {
        let (tx, rx) = unbounded();
        self.senders.lock().push(tx);
        EventStream { inner: rx }
    }

    pub(crate) fn broadcast(&self, event: TransportEvent) {
        self.senders
            .lock()
            .retain(|sender| sender.send(event.clone()).is_ok());
    }
}
