use thiserror::Error;

/// dealerdash error types
#[derive(Error, Debug)]
pub enum DashError {
    /// Failed to parse a snapshot or timestamp
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport failure talking to the backend API
    #[error("http error: {0}")]
    Http(String),

    /// Backend answered with `success: false`
    #[error("api error: {message}")]
    Api { message: String },

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for dealerdash
pub type Result<T> = std::result::Result<T, DashError>;
