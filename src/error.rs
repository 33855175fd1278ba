use thiserror::Error;

#[derive(Error, Debug)]
pub enum StackError {
    /// The caller may not perform the request. Only this kind triggers the
    /// namespace discovery fallback.
    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("{context}: {source}")]
    Transport {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{context}: {source}")]
    Socket {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{context} (status {status}): {body}")]
    Protocol {
        context: String,
        status: u16,
        body: String,
    },

    #[error("{context}: {source}: {body}")]
    Decode {
        context: String,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StackError {
    pub fn is_authorization_denied(&self) -> bool {
        matches!(self, StackError::AuthorizationDenied(_))
    }
}

pub type Result<T> = std::result::Result<T, StackError>;
