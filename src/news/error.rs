use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Error sending request to news provider: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("News provider responded with {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("News provider did not respond within {0:?}")]
    Timeout(Duration),

    #[error("News provider unavailable: {0}")]
    Unavailable(String),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        match self {
            FetchError::Timeout(_) => true,
            FetchError::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }
}
