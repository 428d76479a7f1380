use serde::Deserialize;
use serde::Serialize;

use crate::ProtocolError;
use crate::WireMode;

/// Requests the console sends back to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum OutboundCommand {
    SwitchMode { mode: WireMode },
    SendMessage { message: String },
    StartScrcpy,
    AdbConnect,
}

pub fn encode_command(command: &OutboundCommand) -> Result<String, ProtocolError> {
    serde_json::to_string(command).map_err(ProtocolError::encode)
}
