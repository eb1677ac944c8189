use thiserror::Error;

use super::message::MessageColor;

/// Everything the orchestrator reacts to. Handled strictly one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Tick,
    QuitRequested,
    InputKey(KeyInput),
    Push(PushSignal),
    ReconnectDue,
    Api(ApiResponse),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub key: String,
    pub ctrl: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>, ctrl: bool) -> Self {
        Self {
            key: key.into(),
            ctrl,
        }
    }
}

/// Lifecycle signals of one push subscription, tagged with the generation
/// assigned when it was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushSignal {
    Opened { generation: u64 },
    Payload { generation: u64, data: String },
    Failed { generation: u64, reason: String },
}

impl PushSignal {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Opened { generation }
            | Self::Payload { generation, .. }
            | Self::Failed { generation, .. } => *generation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiFailure {
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    InvalidData(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub username: String,
    pub message: String,
    pub color: MessageColor,
}

/// Completion of a fire-and-forget server request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResponse {
    Registered {
        username: String,
        result: Result<(), ApiFailure>,
    },
    MessagePosted {
        room: String,
        result: Result<(), ApiFailure>,
    },
    RoomsListed(Result<Vec<String>, ApiFailure>),
    OnlineUsersListed(Result<Vec<String>, ApiFailure>),
    HistoryFetched {
        room: String,
        result: Result<Vec<HistoryEntry>, ApiFailure>,
    },
}
