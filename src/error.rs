// Error types for the library side of the CLI.
//
// HTTP call results are not errors: they come back as `api::Outcome`
// values so the presenter can show status and body for every case. The
// variants here cover everything that stops an action before (or instead
// of) a network call.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur outside of an HTTP exchange.
#[derive(Error, Debug)]
pub enum CliError {
    /// No API key could be obtained from any source.
    #[error("no API key available: set MOLTBOOK_API_KEY, save a key to the credentials file, or run interactively")]
    MissingCredential,

    /// The configured URL does not resolve to the allow-listed origin.
    #[error("refusing to use unsafe base URL {url:?}: requests must go to https://www.moltbook.com/api/v1")]
    UnsafeOrigin { url: String },

    /// Reading or writing the credentials file failed.
    #[error("credential store I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The credential record could not be encoded.
    #[error("failed to encode credential record: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operator input was rejected before any request was built.
    #[error("{0}")]
    Validation(String),

    /// The terminal prompt itself failed (closed stdin, no TTY, ...).
    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// Writing to the terminal failed.
    #[error("terminal output failed: {0}")]
    Output(#[from] std::io::Error),

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl CliError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the dispatcher can report this error and return to the menu.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Io { .. } | Self::Serialization(_) | Self::UnsafeOrigin { .. }
        )
    }
}
