use thiserror::Error;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors from terminal handling.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-level HTTP failures (connect, timeout, body decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the tracking server.
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// Malformed tracking-server base URL.
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    /// Invalid command-line arguments.
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),
}
