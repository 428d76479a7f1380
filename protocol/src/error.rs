use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("empty event line")]
    EmptyLine,
    #[error("failed to decode event: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode command: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
}

impl ProtocolError {
    pub(crate) fn decode(source: serde_json::Error) -> Self {
        Self::Decode { source }
    }

    pub(crate) fn encode(source: serde_json::Error) -> Self {
        Self::Encode { source }
    }
}
