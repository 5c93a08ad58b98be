//! Paper records and the topics they are filed under.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::utils::{validate_topic, ValidationError};

/// Metadata stored for a paper, keyed by its id in the topic file.
///
/// Field names match the on-disk JSON layout:
///
/// ```json
/// {
///   "title": "...",
///   "authors": ["..."],
///   "summary": "...",
///   "pdf_url": "http://arxiv.org/pdf/2301.12345v1",
///   "published": "2023-01-15"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperMetadata {
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
    pub pdf_url: String,
    pub published: NaiveDate,
}

/// A paper returned by a search, with its identifier attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    /// Provider identifier (arXiv short id, e.g. "2301.12345v1")
    pub id: String,

    #[serde(flatten)]
    pub metadata: PaperMetadata,
}

impl PaperRecord {
    pub fn new(id: impl Into<String>, metadata: PaperMetadata) -> Self {
        Self {
            id: id.into(),
            metadata,
        }
    }

    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    pub fn authors(&self) -> &[String] {
        &self.metadata.authors
    }

    /// Authors joined for display
    pub fn author_line(&self) -> String {
        self.metadata.authors.join(", ")
    }

    pub fn into_parts(self) -> (String, PaperMetadata) {
        (self.id, self.metadata)
    }
}

/// Builder for constructing PaperRecord objects
#[derive(Debug, Clone)]
pub struct PaperBuilder {
    id: String,
    metadata: PaperMetadata,
}

impl PaperBuilder {
    /// Create a new builder with required fields
    pub fn new(id: impl Into<String>, title: impl Into<String>, published: NaiveDate) -> Self {
        Self {
            id: id.into(),
            metadata: PaperMetadata {
                title: title.into(),
                authors: Vec::new(),
                summary: String::new(),
                pdf_url: String::new(),
                published,
            },
        }
    }

    /// Append an author
    pub fn author(mut self, name: impl Into<String>) -> Self {
        self.metadata.authors.push(name.into());
        self
    }

    /// Replace the author list
    pub fn authors<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metadata.authors = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.metadata.summary = summary.into();
        self
    }

    pub fn pdf_url(mut self, url: impl Into<String>) -> Self {
        self.metadata.pdf_url = url.into();
        self
    }

    pub fn build(self) -> PaperRecord {
        PaperRecord::new(self.id, self.metadata)
    }
}

/// A user-chosen label under which search results are grouped.
///
/// The label is kept for display; the store uses [`Topic::dir_name`], the
/// label lower-cased with spaces replaced by underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic {
    label: String,
    dir_name: String,
}

impl Topic {
    pub fn parse(label: &str) -> Result<Self, ValidationError> {
        let label = validate_topic(label)?;
        let dir_name = label.to_lowercase().replace(' ', "_");
        Ok(Self { label, dir_name })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn dir_name(&self) -> &str {
        &self.dir_name
    }

    /// Heading form of a directory name ("diffusion_models" -> "Diffusion Models")
    pub fn title_case(&self) -> String {
        self.dir_name
            .split('_')
            .filter(|w| !w.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

/// Topic directory name -> paper ids in on-disk order
pub type TopicIndex = BTreeMap<String, Vec<String>>;
