use thiserror::Error;

use super::format::format_size;
use super::task::MAX_FILE_SIZE;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server error: status code {status_code}, message: {message}")]
    Server { status_code: u16, message: String },

    #[error("Unexpected provider response: {0}")]
    Protocol(String),

    #[error("File too large: {} is over the {} limit", format_size(*.size), format_size(MAX_FILE_SIZE))]
    SizeLimit { size: u64 },

    #[error("Telegram API error: {0}")]
    Transport(#[from] teloxide::RequestError),
}

impl RelayError {
    pub fn server_error(status_code: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status_code,
            message: message.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}

// A download failure is either the wire or the local disk; keep the two
// apart so callers see the same taxonomy everywhere.
impl From<teloxide::DownloadError> for RelayError {
    fn from(err: teloxide::DownloadError) -> Self {
        match err {
            teloxide::DownloadError::Network(err) => Self::Network(err),
            teloxide::DownloadError::Io(err) => Self::Io(err),
        }
    }
}

/// Error alias
pub type Result<T, E = RelayError> = std::result::Result<T, E>;
