use thiserror::Error;

/// Ways a live quote fetch can fail. None of them are fatal to the polling loop.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Network failure, timeout, non-200 status or a provider `code` other than 200.
    #[error("transport error: {0}")]
    Transport(String),

    /// Body isn't JSON, has no `rates` mapping, or the entry is malformed.
    #[error("malformed response: {0}")]
    Schema(String),

    /// The requested pair is absent from the `rates` mapping.
    #[error("pair {0} not found in response")]
    NotFound(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Transport(format!("request timed out: {}", err))
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}
