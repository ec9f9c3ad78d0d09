//! Error types for prompt-forge operations.
//!
//! Three kinds of failure exist:
//! - Validation of the user's request (surfaced, generation never starts)
//! - Collaborator calls (caught per section and resolved by a fallback)
//! - Configuration (surfaced once, at startup)

use thiserror::Error;

/// Errors raised while building a [`crate::input::PromptRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Task description must not be empty")]
    EmptyTask,

    #[error("Unknown output format '{0}'")]
    UnknownFormat(String),

    #[error("Unknown task complexity '{0}'")]
    UnknownComplexity(String),
}

/// Errors that can occur while consulting the text-generation collaborator.
///
/// These never escape the assembler: every variant is turned into a template
/// fallback plus a warning.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("No collaborator configured")]
    Unavailable,

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Connection to collaborator failed: {0}")]
    Connection(String),

    #[error("Authentication rejected ({code}): {message}")]
    Unauthorized { code: u16, message: String },

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    #[error("Failed to parse collaborator response: {0}")]
    ParseError(String),

    #[error("Collaborator returned an empty response")]
    EmptyResponse,

    #[error("Collaborator response was malformed: {0}")]
    Malformed(String),

    #[error("Collaborator did not answer within {seconds} seconds")]
    Timeout { seconds: u64 },
}

impl CollaboratorError {
    /// Whether a single immediate retry is worth attempting.
    pub fn is_transient(&self) -> bool {
        match self {
            CollaboratorError::Connection(_) => true,
            CollaboratorError::RateLimited(_) => true,
            CollaboratorError::ApiError { code, .. } => *code >= 500 || *code == 429,
            _ => false,
        }
    }
}

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
