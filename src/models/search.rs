//! Search request model.

use serde::{Deserialize, Serialize};

/// Results returned when the caller does not ask for a specific count
pub const DEFAULT_MAX_RESULTS: u32 = 5;

/// Search query parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Main search query string (the topic)
    pub query: String,

    /// Maximum number of results to return
    pub max_results: u32,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set maximum results
    pub fn max_results(mut self, max: u32) -> Self {
        self.max_results = max;
        self
    }
}
