//! arXiv research source implementation.

use async_trait::async_trait;
use feed_rs::parser;

use crate::config::ARXIV_API_URL;
use crate::models::{PaperBuilder, PaperRecord, SearchQuery};
use crate::sources::{Source, SourceError};
use crate::utils::HttpClient;

/// Base URL for arXiv PDFs
const ARXIV_PDF_URL: &str = "http://arxiv.org/pdf";

/// arXiv caps a single query page at this many results
const ARXIV_MAX_RESULTS: u32 = 2000;

/// arXiv research source
#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: HttpClient,
    api_url: String,
}

impl ArxivSource {
    /// Create a new arXiv source against the public API
    pub fn new(client: HttpClient) -> Self {
        Self::with_api_url(client, ARXIV_API_URL)
    }

    /// Create with a custom query endpoint (mirrors, tests)
    pub fn with_api_url(client: HttpClient, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }

    /// Short id from an entry URL, keeping the version suffix.
    ///
    /// - "http://arxiv.org/abs/2301.12345v1" -> "2301.12345v1"
    /// - "http://arxiv.org/abs/hep-th/9901001v2" -> "hep-th/9901001v2"
    pub fn short_id(entry_id: &str) -> Option<&str> {
        let id = match entry_id.find("/abs/") {
            Some(pos) => &entry_id[pos + 5..],
            None => entry_id,
        };
        let id = id.trim().trim_end_matches('/');
        (!id.is_empty()).then_some(id)
    }

    /// Build search query for arXiv API
    fn build_search_query(query: &SearchQuery) -> String {
        let terms = query.query.trim();
        if terms.is_empty() {
            "all:*".to_string()
        } else {
            format!("all:{}", terms)
        }
    }

    /// Parse arXiv Atom feed entry into a PaperRecord
    fn parse_entry(entry: &feed_rs::model::Entry) -> Result<PaperRecord, SourceError> {
        let paper_id = Self::short_id(&entry.id)
            .ok_or_else(|| SourceError::Parse("Missing paper ID".to_string()))?
            .to_string();

        let title = entry
            .title
            .as_ref()
            .map(|t| collapse_whitespace(&t.content))
            .unwrap_or_default();

        let summary = entry
            .summary
            .as_ref()
            .map(|s| collapse_whitespace(&s.content))
            .unwrap_or_default();

        let published = entry
            .published
            .or(entry.updated)
            .map(|d| d.date_naive())
            .ok_or_else(|| {
                SourceError::Parse(format!("Missing publication date for {}", paper_id))
            })?;

        let pdf_url = entry
            .links
            .iter()
            .find(|link| {
                link.media_type.as_deref() == Some("application/pdf")
                    || link.title.as_deref() == Some("pdf")
            })
            .map(|link| link.href.clone())
            .unwrap_or_else(|| format!("{}/{}", ARXIV_PDF_URL, paper_id));

        Ok(PaperBuilder::new(paper_id, title, published)
            .authors(entry.authors.iter().map(|a| a.name.trim().to_string()))
            .summary(summary)
            .pdf_url(pdf_url)
            .build())
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[async_trait]
impl Source for ArxivSource {
    fn id(&self) -> &str {
        "arxiv"
    }

    fn name(&self) -> &str {
        "arXiv"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<PaperRecord>, SourceError> {
        if query.max_results == 0 {
            return Err(SourceError::InvalidRequest(
                "max_results must be at least 1".to_string(),
            ));
        }

        let search_query = Self::build_search_query(query);
        let max_results = query.max_results.min(ARXIV_MAX_RESULTS);

        let url = format!(
            "{}?search_query={}&start=0&max_results={}&sortBy=relevance&sortOrder=descending",
            self.api_url,
            urlencoding::encode(&search_query),
            max_results,
        );

        tracing::debug!(%url, "Querying arXiv");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/atom+xml")
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch arXiv results: {}", e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "arXiv API returned status: {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))?;

        let feed = parser::parse(bytes.as_ref())
            .map_err(|e| SourceError::Parse(format!("Failed to parse Atom feed: {}", e)))?;

        let papers = feed
            .entries
            .iter()
            .take(query.max_results as usize)
            .map(Self::parse_entry)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            topic = %query.query,
            count = papers.len(),
            "arXiv search returned papers"
        );

        Ok(papers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>arXiv Query Results</title>
  <id>http://arxiv.org/api/query</id>
  <updated>2024-05-01T00:00:00Z</updated>
  <entry>
    <id>http://arxiv.org/abs/2301.12345v1</id>
    <updated>2023-01-20T10:00:00Z</updated>
    <published>2023-01-15T10:00:00Z</published>
    <title>Denoising Diffusion
      Probabilistic Models</title>
    <summary>  We present high quality
      image synthesis results.</summary>
    <author><name>Jonathan Ho</name></author>
    <author><name>Ajay Jain</name></author>
    <link href="http://arxiv.org/abs/2301.12345v1" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/2301.12345v1" rel="related" type="application/pdf"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/hep-th/9901001v2</id>
    <updated>1999-01-02T00:00:00Z</updated>
    <published>1999-01-01T00:00:00Z</published>
    <title>Old Style Identifier</title>
    <summary>Legacy.</summary>
    <author><name>A. Physicist</name></author>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2402.00001v3</id>
    <updated>2024-02-01T00:00:00Z</updated>
    <published>2024-02-01T00:00:00Z</published>
    <title>Third Paper</title>
    <summary>Third.</summary>
    <author><name>C. Author</name></author>
  </entry>
</feed>"#;

    fn client() -> HttpClient {
        HttpClient::new().unwrap()
    }

    #[test]
    fn test_short_id() {
        assert_eq!(
            ArxivSource::short_id("http://arxiv.org/abs/2301.12345v1"),
            Some("2301.12345v1")
        );
        assert_eq!(
            ArxivSource::short_id("http://arxiv.org/abs/hep-th/9901001v2"),
            Some("hep-th/9901001v2")
        );
        assert_eq!(ArxivSource::short_id("2301.12345"), Some("2301.12345"));
        assert_eq!(ArxivSource::short_id("http://arxiv.org/abs/"), None);
    }

    #[test]
    fn test_build_search_query() {
        let query = SearchQuery::new("machine learning");
        assert_eq!(ArxivSource::build_search_query(&query), "all:machine learning");
        assert_eq!(ArxivSource::build_search_query(&SearchQuery::new("  ")), "all:*");
    }

    #[test]
    fn test_parse_entries() {
        let feed = parser::parse(FEED.as_bytes()).unwrap();
        let papers: Vec<PaperRecord> = feed
            .entries
            .iter()
            .map(ArxivSource::parse_entry)
            .collect::<Result<_, _>>()
            .unwrap();

        let first = &papers[0];
        assert_eq!(first.id, "2301.12345v1");
        assert_eq!(first.title(), "Denoising Diffusion Probabilistic Models");
        assert_eq!(first.authors(), ["Jonathan Ho", "Ajay Jain"]);
        assert_eq!(first.metadata.summary, "We present high quality image synthesis results.");
        assert_eq!(first.metadata.pdf_url, "http://arxiv.org/pdf/2301.12345v1");
        assert_eq!(
            first.metadata.published,
            NaiveDate::from_ymd_opt(2023, 1, 15).unwrap()
        );

        // No pdf link: fall back to the canonical URL
        assert_eq!(papers[1].id, "hep-th/9901001v2");
        assert_eq!(
            papers[1].metadata.pdf_url,
            "http://arxiv.org/pdf/hep-th/9901001v2"
        );
    }

    #[tokio::test]
    async fn test_search_truncates_to_max_results() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/query")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("search_query".into(), "all:diffusion".into()),
                mockito::Matcher::UrlEncoded("max_results".into(), "2".into()),
                mockito::Matcher::UrlEncoded("sortBy".into(), "relevance".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/atom+xml")
            .with_body(FEED)
            .create_async()
            .await;

        let source =
            ArxivSource::with_api_url(client(), format!("{}/api/query", server.url()));
        let papers = source
            .search(&SearchQuery::new("diffusion").max_results(2))
            .await
            .unwrap();

        mock.assert_async().await;
        let ids: Vec<&str> = papers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["2301.12345v1", "hep-th/9901001v2"]);
    }

    #[tokio::test]
    async fn test_search_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/query")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let source =
            ArxivSource::with_api_url(client(), format!("{}/api/query", server.url()));
        let err = source
            .search(&SearchQuery::new("diffusion"))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Api(ref msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn test_search_rejects_zero_results() {
        let source = ArxivSource::new(client());
        let err = source
            .search(&SearchQuery::new("x").max_results(0))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::InvalidRequest(_)));
    }
}
