//! Wire types exchanged between the cockpit server and console front ends.
//!
//! Every message is a JSON object of the form `{"event": <name>, "data": {...}}`.
//! Inbound events are decoded into [`InboundEvent`]; commands sent back to the
//! server are encoded from [`OutboundCommand`].

mod command;
mod error;
mod event;

pub use command::OutboundCommand;
pub use command::encode_command;
pub use error::ProtocolError;
pub use event::InboundEvent;
pub use event::StepKind;
pub use event::WireMode;
pub use event::decode_event;
