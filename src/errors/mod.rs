use serde::Serialize;

pub const SYNC_FAILED_MESSAGE: &str = "Failed to sync order status with server. Please refresh.";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("{0}")]
    InvalidResponse(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// HTTP status of the failed call, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Last failed operation, as kept in store state for passive display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreError {
    pub message: String,
    pub status: Option<u16>,
}

impl StoreError {
    pub fn new(message: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    pub fn sync_failed(status: Option<u16>) -> Self {
        Self::new(SYNC_FAILED_MESSAGE, status)
    }

    pub fn is_sync_failure(&self) -> bool {
        self.message == SYNC_FAILED_MESSAGE
    }
}

impl From<&ClientError> for StoreError {
    fn from(err: &ClientError) -> Self {
        Self::new(err.to_string(), err.status())
    }
}
