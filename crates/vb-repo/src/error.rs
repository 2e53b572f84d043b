use thiserror::Error;

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("No adapter found to handle VCS repository \"{url}\".")]
    NoAdapter { url: String },

    #[error("Unknown VCS adapter: {0}")]
    UnknownAdapter(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VcsError {
    /// Create a new no-adapter error for the given repository URL.
    pub fn no_adapter<S: Into<String>>(url: S) -> Self {
        Self::NoAdapter { url: url.into() }
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }
}

pub type VcsResult<T> = Result<T, VcsError>;
