//! Mock source for testing purposes.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::{Mutex, PoisonError};

use crate::models::{PaperBuilder, PaperRecord, SearchQuery};
use crate::sources::{Source, SourceError};

#[derive(Debug, Clone)]
enum Behavior {
    Papers(Vec<PaperRecord>),
    Fail(String),
}

/// A mock source for testing that returns predefined responses.
#[derive(Debug)]
pub struct MockSource {
    behavior: Mutex<Behavior>,
    queries: Mutex<Vec<SearchQuery>>,
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSource {
    /// Create a new mock source that returns no papers.
    pub fn new() -> Self {
        Self {
            behavior: Mutex::new(Behavior::Papers(Vec::new())),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock source returning these papers.
    pub fn with_papers(papers: Vec<PaperRecord>) -> Self {
        let source = Self::new();
        source.set_papers(papers);
        source
    }

    /// Set the papers to return, in this order.
    pub fn set_papers(&self, papers: Vec<PaperRecord>) {
        *self.behavior.lock().unwrap_or_else(PoisonError::into_inner) = Behavior::Papers(papers);
    }

    /// Make every subsequent search fail with a network error.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.behavior.lock().unwrap_or_else(PoisonError::into_inner) =
            Behavior::Fail(message.into());
    }

    /// Queries received so far
    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Source for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<PaperRecord>, SourceError> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.clone());

        let behavior = self
            .behavior
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        match behavior {
            Behavior::Papers(papers) => Ok(papers
                .into_iter()
                .take(query.max_results as usize)
                .collect()),
            Behavior::Fail(message) => Err(SourceError::Network(message)),
        }
    }
}

/// Helper function to create a mock paper for testing.
pub fn make_paper(paper_id: &str, title: &str) -> PaperRecord {
    let published = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or(NaiveDate::MIN);
    PaperBuilder::new(paper_id, title, published)
        .author("Ada Lovelace")
        .author("Alan Turing")
        .summary(format!("Abstract of {}.", title))
        .pdf_url(format!("http://arxiv.org/pdf/{}", paper_id))
        .build()
}
