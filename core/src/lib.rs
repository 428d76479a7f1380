//! Streaming engine behind the cockpit console: chat reply accumulation,
//! trace reassembly, line classification, metrics extraction and the
//! session state machine that ties them together.
//!
//! Every component is a plain state object driven synchronously by one
//! caller. Rendering collaborators are injected through the sink traits.

pub mod chat;
pub mod classify;
pub mod config;
mod error;
pub mod metrics;
pub mod publisher;
pub mod reassembler;
pub mod session;

#[cfg(test)]
mod test_support;

pub use chat::ChatAccumulator;
pub use chat::ChatMessage;
pub use chat::ChatRole;
pub use chat::ChatView;
pub use classify::LineCategory;
pub use classify::classify;
pub use config::CockpitConfig;
pub use error::ConfigError;
pub use metrics::MetricEntry;
pub use metrics::MetricsBlock;
pub use publisher::DetailEntry;
pub use publisher::DetailSink;
pub use publisher::SummaryEntry;
pub use publisher::SummarySink;
pub use publisher::TracePipeline;
pub use reassembler::LogLine;
pub use reassembler::StreamReassembler;
pub use session::Mode;
pub use session::ProcessPanel;
pub use session::SessionController;
pub use session::SessionState;
