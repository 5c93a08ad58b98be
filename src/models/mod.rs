//! Core data models for papers, topics and search requests.

mod paper;
mod search;

pub use paper::{PaperBuilder, PaperMetadata, PaperRecord, Topic, TopicIndex};
pub use search::{SearchQuery, DEFAULT_MAX_RESULTS};
