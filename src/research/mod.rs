//! Research operations behind the registry's tools and resources.
//!
//! [`Research`] bundles the search provider, the metadata store, the shared
//! HTTP client and the chat model. Each method is one registry operation and
//! returns typed data; turning it into protocol values happens in
//! [`crate::mcp`].

pub mod render;

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::llm::{self, ChatModel};
use crate::models::{PaperRecord, SearchQuery, Topic, TopicIndex};
use crate::sources::Source;
use crate::store::{MetadataStore, TopicPapers};
use crate::utils::{extract_text_blocking, sanitize_paper_id, validate_url, HttpClient};

/// Shared research backend
#[derive(Debug, Clone)]
pub struct Research {
    source: Arc<dyn Source>,
    store: MetadataStore,
    http: HttpClient,
    model: Arc<dyn ChatModel>,
    default_max_results: u32,
}

impl Research {
    pub fn new(
        source: Arc<dyn Source>,
        store: MetadataStore,
        http: HttpClient,
        model: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            source,
            store,
            http,
            model,
            default_max_results: crate::models::DEFAULT_MAX_RESULTS,
        }
    }

    /// Results fetched when a search omits `max_results`
    pub fn with_default_max_results(mut self, max_results: u32) -> Self {
        self.default_max_results = max_results.max(1);
        self
    }

    pub fn default_max_results(&self) -> u32 {
        self.default_max_results
    }

    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    pub fn model(&self) -> &Arc<dyn ChatModel> {
        &self.model
    }

    /// Search the provider, file the results under the topic and return them
    /// in provider order. `None` uses the configured default count.
    pub async fn search_papers(
        &self,
        topic: &Topic,
        max_results: Option<u32>,
    ) -> Result<Vec<PaperRecord>> {
        let max_results = max_results.unwrap_or(self.default_max_results);
        search_and_store(self.source.as_ref(), &self.store, topic, max_results).await
    }

    /// Metadata for a stored paper
    pub fn extract_info(&self, paper_id: &str) -> Result<PaperRecord> {
        self.store
            .find_paper(paper_id)?
            .ok_or_else(|| Error::NotFound(format!("No info found for paper ID: {}", paper_id)))
    }

    /// Download a stored paper's PDF and extract its text
    pub async fn get_full_text(&self, paper_id: &str) -> Result<String> {
        let paper_id = sanitize_paper_id(paper_id)?;
        let paper = self.extract_info(&paper_id)?;
        let url = validate_url(&paper.metadata.pdf_url)
            .map_err(|e| Error::Download(format!("{}: {}", paper_id, e)))?;

        tracing::debug!(%url, "Downloading PDF");

        let response = self
            .http
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| Error::Download(format!("Failed to download PDF: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Download(format!(
                "{} returned status {}",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Download(format!("Failed to read PDF body: {}", e)))?;

        let text = extract_text_blocking(bytes.to_vec()).await?;
        tracing::info!(paper_id = %paper_id, chars = text.len(), "Extracted full text");
        Ok(text)
    }

    /// Topic directory -> stored ids
    pub fn list_all_papers(&self) -> Result<TopicIndex> {
        self.store.index()
    }

    /// Plain-language summary of arbitrary paper text
    pub async fn summarize_paper(&self, text: &str) -> Result<String> {
        llm::summarize(self.model.as_ref(), text).await
    }

    /// Topic directories on disk
    pub fn folders(&self) -> Result<Vec<String>> {
        self.store.topics()
    }

    /// Records filed under a topic; `NotFound` when it has no papers file
    pub fn topic_papers(&self, topic: &Topic) -> Result<TopicPapers> {
        self.store
            .load_topic(topic)?
            .ok_or_else(|| Error::NotFound(format!("No papers found for topic: {}", topic)))
    }
}

/// Fetch at most `max_results` papers for a topic and merge them into the
/// store.
///
/// The store is only written once the whole batch has been fetched, so a
/// provider failure leaves it untouched.
pub async fn search_and_store(
    source: &dyn Source,
    store: &MetadataStore,
    topic: &Topic,
    max_results: u32,
) -> Result<Vec<PaperRecord>> {
    if max_results == 0 {
        return Err(Error::SchemaValidation(
            "max_results must be at least 1".to_string(),
        ));
    }

    let query = SearchQuery::new(topic.label()).max_results(max_results);
    let mut papers = source.search(&query).await?;
    papers.truncate(max_results as usize);

    store.save_papers(topic, &papers)?;

    tracing::info!(
        topic = topic.dir_name(),
        source = source.id(),
        count = papers.len(),
        "Stored search results"
    );
    Ok(papers)
}
