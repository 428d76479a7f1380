use serde::Deserialize;
use serde::Serialize;
use strum_macros::Display;

use crate::ProtocolError;

/// Phase reported by a structured `autoglm_step` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StepKind {
    Thinking,
    Action,
    Finish,
    Error,
    /// Also used for step types this client does not know about.
    #[serde(other)]
    Result,
}

/// Mode names as the server spells them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WireMode {
    #[serde(alias = "chat")]
    Normal,
    #[serde(alias = "control")]
    Autoglm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum InboundEvent {
    UserMessage {
        message: String,
    },
    AiMessageChunk {
        chunk: String,
    },
    AiMessageComplete {
        #[serde(default)]
        message: Option<String>,
    },
    AutoglmStep {
        #[serde(rename = "type")]
        kind: StepKind,
        #[serde(default)]
        content: String,
    },
    AutoglmRealtimeLog {
        content: String,
    },
    AdbStatus {
        connected: bool,
        #[serde(default)]
        message: Option<String>,
    },
    AdbConnectResult {
        success: bool,
        #[serde(default)]
        message: Option<String>,
    },
    AdbPairResult {
        success: bool,
        #[serde(default)]
        message: Option<String>,
    },
    AdbDisconnectResult {
        success: bool,
        #[serde(default)]
        message: Option<String>,
    },
    AdbDevicesList {
        #[serde(default)]
        devices: Vec<String>,
    },
    ScrcpyStarted {
        #[serde(default)]
        message: Option<String>,
    },
    ScreenFrame {
        frame: String,
    },
    ModeSwitched {
        mode: WireMode,
    },
    Error {
        message: String,
    },
    Status {
        message: String,
    },
}

impl InboundEvent {
    /// Event name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            InboundEvent::UserMessage { .. } => "user_message",
            InboundEvent::AiMessageChunk { .. } => "ai_message_chunk",
            InboundEvent::AiMessageComplete { .. } => "ai_message_complete",
            InboundEvent::AutoglmStep { .. } => "autoglm_step",
            InboundEvent::AutoglmRealtimeLog { .. } => "autoglm_realtime_log",
            InboundEvent::AdbStatus { .. } => "adb_status",
            InboundEvent::AdbConnectResult { .. } => "adb_connect_result",
            InboundEvent::AdbPairResult { .. } => "adb_pair_result",
            InboundEvent::AdbDisconnectResult { .. } => "adb_disconnect_result",
            InboundEvent::AdbDevicesList { .. } => "adb_devices_list",
            InboundEvent::ScrcpyStarted { .. } => "scrcpy_started",
            InboundEvent::ScreenFrame { .. } => "screen_frame",
            InboundEvent::ModeSwitched { .. } => "mode_switched",
            InboundEvent::Error { .. } => "error",
            InboundEvent::Status { .. } => "status",
        }
    }
}

/// Decode one newline-delimited JSON event.
pub fn decode_event(line: &str) -> Result<InboundEvent, ProtocolError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(ProtocolError::EmptyLine);
    }
    serde_json::from_str(trimmed).map_err(ProtocolError::decode)
}
