//! Per-topic paper metadata on disk.
//!
//! Layout:
//!
//! ```text
//! <papers_dir>/
//!   diffusion_models/
//!     papers_info.json    {"2301.12345v1": {"title": ..., ...}, ...}
//!   transformers/
//!     papers_info.json
//! ```
//!
//! Each topic file is read and written whole. Records keep their insertion
//! order; writing an id that already exists replaces its metadata in place.
//! There is no locking: the store assumes a single writer.

use indexmap::IndexMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::{PaperMetadata, PaperRecord, Topic, TopicIndex};

/// File name of the per-topic metadata file
pub const PAPERS_FILE: &str = "papers_info.json";

/// Records of one topic in on-disk order
pub type TopicPapers = IndexMap<String, PaperMetadata>;

/// Flat-file metadata store rooted at the papers directory
#[derive(Debug, Clone)]
pub struct MetadataStore {
    root: PathBuf,
}

impl MetadataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the papers directory if it does not exist yet
    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    fn topic_file(&self, dir_name: &str) -> PathBuf {
        self.root.join(dir_name).join(PAPERS_FILE)
    }

    /// Merge papers into a topic and rewrite its file.
    ///
    /// Existing ids keep their position, new ids are appended. An existing
    /// file that cannot be decoded is replaced.
    pub fn save_papers(&self, topic: &Topic, papers: &[PaperRecord]) -> Result<()> {
        let path = self.topic_file(topic.dir_name());

        let mut info = match self.read_file(&path) {
            Ok(Some(info)) => info,
            Ok(None) => TopicPapers::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Replacing unreadable papers file");
                TopicPapers::new()
            }
        };

        for paper in papers {
            info.insert(paper.id.clone(), paper.metadata.clone());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&info)
            .map_err(|e| Error::Store(format!("{}: {}", path.display(), e)))?;
        fs::write(&path, json)?;

        tracing::debug!(
            topic = topic.dir_name(),
            added = papers.len(),
            total = info.len(),
            "Saved papers"
        );
        Ok(())
    }

    /// Records of a topic, or `None` when the topic has no papers file
    pub fn load_topic(&self, topic: &Topic) -> Result<Option<TopicPapers>> {
        self.read_file(&self.topic_file(topic.dir_name()))
    }

    fn read_file(&self, path: &Path) -> Result<Option<TopicPapers>> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| Error::Store(format!("{}: {}", path.display(), e)))
    }

    /// Names of all topic directories, sorted
    pub fn topics(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut topics = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                topics.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        topics.sort();
        Ok(topics)
    }

    /// Look a paper up by id across all topics.
    ///
    /// Topics are scanned in name order and the first match wins.
    pub fn find_paper(&self, paper_id: &str) -> Result<Option<PaperRecord>> {
        for dir_name in self.topics()? {
            let Some(mut info) = self.read_file(&self.topic_file(&dir_name))? else {
                continue;
            };
            if let Some(metadata) = info.swap_remove(paper_id) {
                return Ok(Some(PaperRecord::new(paper_id, metadata)));
            }
        }
        Ok(None)
    }

    /// Topic directory -> ids, for every topic with a papers file
    pub fn index(&self) -> Result<TopicIndex> {
        let mut index = TopicIndex::new();
        for dir_name in self.topics()? {
            if let Some(info) = self.read_file(&self.topic_file(&dir_name))? {
                index.insert(dir_name, info.into_keys().collect());
            }
        }
        Ok(index)
    }
}
