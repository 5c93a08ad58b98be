//! Crate-wide error taxonomy.
//!
//! Adapters keep their own narrow error types ([`SourceError`],
//! [`PdfExtractError`], [`ConfigError`]) and convert into [`Error`] at the
//! registry boundary, where the chat loop and the MCP server report them.

use crate::config::ConfigError;
use crate::sources::SourceError;
use crate::utils::{PdfExtractError, ValidationError};

/// Which registry table a name was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Tool,
    Resource,
    Prompt,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tool => "tool",
            Category::Resource => "resource",
            Category::Prompt => "prompt",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by registry invocations and startup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// External API (arXiv, Azure OpenAI) unreachable or returned an error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Referenced paper id or topic is not in the local store
    #[error("Not found: {0}")]
    NotFound(String),

    /// Arguments do not satisfy the declared schema
    #[error("Invalid arguments: {0}")]
    SchemaValidation(String),

    /// PDF could not be fetched
    #[error("Download failed: {0}")]
    Download(String),

    /// PDF was fetched but no text could be extracted
    #[error("Text extraction failed: {0}")]
    Extraction(String),

    /// No tool, resource or prompt registered under this name
    #[error("Unknown {category}: {name}")]
    UnknownName { category: Category, name: String },

    /// Missing or invalid startup configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Store file exists but cannot be decoded
    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn unknown(category: Category, name: impl Into<String>) -> Self {
        Error::UnknownName {
            category,
            name: name.into(),
        }
    }
}

impl From<SourceError> for Error {
    fn from(err: SourceError) -> Self {
        Error::Provider(err.to_string())
    }
}

impl From<PdfExtractError> for Error {
    fn from(err: PdfExtractError) -> Self {
        Error::Extraction(err.to_string())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Configuration(err.to_string())
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::SchemaValidation(err.to_string())
    }
}

/// Result alias used across the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;
