//! Markdown projections served as resources.

use std::fmt::Write;

use crate::models::Topic;
use crate::store::TopicPapers;

/// Listing of topic folders for `papers://folders`
pub fn folders_markdown(folders: &[String]) -> String {
    let mut out = String::from("# Available Topics\n\n");

    if folders.is_empty() {
        out.push_str("No topics found.\n");
        return out;
    }

    for folder in folders {
        let _ = writeln!(out, "- {}", folder);
    }
    let _ = write!(
        out,
        "\nRead `papers://<topic>` to see the papers filed under a topic.\n"
    );
    out
}

/// Digest of every paper under a topic for `papers://{topic}`
pub fn topic_markdown(topic: &Topic, papers: &TopicPapers) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Papers on {}\n", topic.title_case());
    let _ = writeln!(out, "Total papers: {}\n", papers.len());

    for (id, paper) in papers {
        let _ = writeln!(out, "## {}", paper.title);
        let _ = writeln!(out, "- **Paper ID**: {}", id);
        let _ = writeln!(out, "- **Authors**: {}", paper.authors.join(", "));
        let _ = writeln!(out, "- **Published**: {}", paper.published);
        let _ = writeln!(out, "- **PDF URL**: [{0}]({0})\n", paper.pdf_url);
        let _ = writeln!(out, "### Summary\n{}\n", paper.summary.trim());
        out.push_str("---\n\n");
    }
    out
}
