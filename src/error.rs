use thiserror::Error;

/// Shown when a failure carries no message of its own.
pub const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// A failed load, reduced to the message a reader should see.
///
/// Whatever went wrong underneath (network, HTTP status, malformed XML) is
/// not preserved past this point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LoadError {
    message: String,
}

impl LoadError {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            return Self::unknown();
        }
        Self { message }
    }

    pub fn unknown() -> Self {
        Self {
            message: UNKNOWN_ERROR.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_message(self) -> String {
        self.message
    }

    /// Collapses any error into its display message.
    pub fn from_error<E: std::fmt::Display + ?Sized>(err: &E) -> Self {
        Self::new(err.to_string())
    }
}

/// Outcome of fetching and normalizing the feed.
pub type LoadResult<T> = Result<T, LoadError>;
