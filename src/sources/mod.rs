//! Search provider plugins.
//!
//! [`Source`] is the seam between the `search_papers` tool and the external
//! paper-search API. [`ArxivSource`] talks to the arXiv Atom API;
//! [`MockSource`] returns scripted responses for tests.

mod arxiv;
pub mod mock;

pub use arxiv::ArxivSource;
pub use mock::MockSource;

use async_trait::async_trait;

use crate::models::{PaperRecord, SearchQuery};

/// The Source trait defines the interface for search providers.
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g., "arxiv")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Search for papers matching the query.
    ///
    /// Returns at most `query.max_results` records in provider relevance
    /// order. The whole batch is fetched before returning, so an error means
    /// no records at all.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<PaperRecord>, SourceError>;
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error (Atom, JSON)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// API error from the source
    #[error("API error: {0}")]
    Api(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}
