use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error("api error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Parse(String),

    #[error("filesystem error: {0}")]
    Fs(#[from] std::io::Error),

    #[error("download failed: {0}")]
    Download(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ProviderError {
    /// Whether retrying the same request may succeed.
    ///
    /// Only transport failures, rate limiting and server side errors qualify;
    /// a provider saying "no such item" or rejecting a payload is final.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Transport(err) => {
                err.is_timeout()
                    || err.is_connect()
                    || err.is_request()
                    || err
                        .status()
                        .is_some_and(|s| s.is_server_error() || s.as_u16() == 429)
            }
            ProviderError::Api { status, .. } => *status >= 500 || *status == 429,
            ProviderError::NotFound(_)
            | ProviderError::Parse(_)
            | ProviderError::Fs(_)
            | ProviderError::Download(_)
            | ProviderError::Config(_) => false,
        }
    }
}
