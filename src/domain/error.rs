//! Error types for the knowledge-file store.
//!
//! A non-zero `retcode` from the remote service is not an error here: it is
//! a normal outcome that operations hand back to their caller. [`KnowledgeFileError`]
//! covers everything else, i.e. failures the store does not handle itself and
//! propagates to whoever invoked the operation.

use thiserror::Error;

/// The main error type for knowledge-file operations.
///
/// Most variants wrap underlying errors from external crates using `#[from]`
/// for automatic conversion.
///
/// # Examples
///
/// ```
/// use knowledge_file::KnowledgeFileError;
///
/// fn validate() -> Result<(), KnowledgeFileError> {
///     Err(KnowledgeFileError::Config("api_base_url is empty".to_string()))
/// }
/// assert!(validate().is_err());
/// ```
#[derive(Debug, Error)]
pub enum KnowledgeFileError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote service answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// A response envelope or its `data` field did not have the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// Configuration is invalid or could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An operation was dispatched by a name the store does not know.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
}

/// A specialized `Result` type for knowledge-file operations.
pub type Result<T> = std::result::Result<T, KnowledgeFileError>;
