//! Instruction templates.

use serde_json::Value;
use std::fmt::Write;

use super::registry::PromptHandler;
use crate::error::{Error, Result};

/// `generate_search_prompt(topic, num_papers)`
#[derive(Debug)]
pub struct GenerateSearchPrompt;

impl PromptHandler for GenerateSearchPrompt {
    fn render(&self, args: &Value) -> Result<String> {
        let topic = args
            .get("topic")
            .and_then(Value::as_str)
            .map(str::trim)
            .ok_or_else(|| Error::SchemaValidation("Missing 'topic' parameter".to_string()))?;
        let num_papers = args
            .get("num_papers")
            .and_then(Value::as_u64)
            .ok_or_else(|| Error::SchemaValidation("Missing 'num_papers' parameter".to_string()))?;

        Ok(search_prompt(topic, num_papers))
    }
}

fn search_prompt(topic: &str, num_papers: u64) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Search for {num_papers} academic papers about '{topic}' using the search_papers tool.\n"
    );
    out.push_str("Follow these instructions:\n");
    let _ = writeln!(
        out,
        "1. First, search for papers using search_papers(topic='{topic}', max_results={num_papers})."
    );
    let _ = writeln!(
        out,
        "2. For each paper found, use extract_info to get its metadata and summarize_paper to summarize it. Note:\n   \
         - Paper title and authors\n   \
         - Publication date\n   \
         - Key findings and main contributions\n   \
         - Methodology\n   \
         - Relevance to '{topic}'"
    );
    let _ = writeln!(
        out,
        "3. Synthesize the results across all papers:\n   \
         - Current state of research in '{topic}'\n   \
         - Common themes and trends\n   \
         - Open problems and research gaps\n   \
         - The most influential papers among the {num_papers} found"
    );
    out.push_str(
        "4. Format your findings with clear headings and bullet points, presenting each paper in detail followed by the overall synthesis.\n",
    );
    out
}
