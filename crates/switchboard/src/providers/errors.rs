use thiserror::Error;

/// Failures from the language-model backend. Transport problems are always
/// surfaced, never swallowed, so callers can pick their fallback path.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Invalid response: {0}")]
    ResponseParseError(String),

    #[error("Request timed out: {0}")]
    Timeout(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ProviderError::Timeout(error.to_string())
        } else {
            ProviderError::RequestFailed(error.to_string())
        }
    }
}
