//! Tool handlers backed by [`Research`].
//!
//! Arguments reach these handlers already defaulted and schema-checked by
//! the registry, so field access only guards against shape mismatches.

use std::sync::Arc;

use serde_json::{json, Value};

use super::registry::ToolHandler;
use crate::error::{Error, Result};
use crate::models::Topic;
use crate::research::Research;

fn str_arg<'a>(args: &'a Value, name: &str) -> Result<&'a str> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::SchemaValidation(format!("Missing '{}' parameter", name)))
}

/// A positive count. Integral floats such as `2.0` pass JSON Schema's
/// `integer` check and are accepted as the same count.
fn count_arg(value: &Value, name: &str) -> Result<u32> {
    let n = value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= f64::from(u32::MAX))
            .map(|f| f as u64)
    });

    n.and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| Error::SchemaValidation(format!("{} must be a whole number, got {}", name, value)))
}

/// Handler for `search_papers`
#[derive(Debug)]
pub struct SearchPapersHandler {
    pub research: Arc<Research>,
}

#[async_trait::async_trait]
impl ToolHandler for SearchPapersHandler {
    async fn execute(&self, args: Value) -> Result<Value> {
        let topic = Topic::parse(str_arg(&args, "topic")?)?;

        let max_results = match args.get("max_results") {
            None | Some(Value::Null) => None,
            Some(value) => Some(count_arg(value, "max_results")?),
        };

        let papers = self.research.search_papers(&topic, max_results).await?;
        let ids: Vec<String> = papers.into_iter().map(|p| p.id).collect();
        Ok(json!(ids))
    }
}

/// Handler for `extract_info`
#[derive(Debug)]
pub struct ExtractInfoHandler {
    pub research: Arc<Research>,
}

#[async_trait::async_trait]
impl ToolHandler for ExtractInfoHandler {
    async fn execute(&self, args: Value) -> Result<Value> {
        let paper_id = str_arg(&args, "paper_id")?;
        let paper = self.research.extract_info(paper_id.trim())?;
        serde_json::to_value(paper).map_err(|e| Error::Store(e.to_string()))
    }
}

/// Handler for `get_full_text`
#[derive(Debug)]
pub struct GetFullTextHandler {
    pub research: Arc<Research>,
}

#[async_trait::async_trait]
impl ToolHandler for GetFullTextHandler {
    async fn execute(&self, args: Value) -> Result<Value> {
        let paper_id = str_arg(&args, "paper_id")?;
        let text = self.research.get_full_text(paper_id).await?;
        Ok(Value::String(text))
    }
}

/// Handler for `list_all_papers`
#[derive(Debug)]
pub struct ListAllPapersHandler {
    pub research: Arc<Research>,
}

#[async_trait::async_trait]
impl ToolHandler for ListAllPapersHandler {
    async fn execute(&self, _args: Value) -> Result<Value> {
        let index = self.research.list_all_papers()?;
        Ok(json!(index))
    }
}

/// Handler for `summarize_paper`
#[derive(Debug)]
pub struct SummarizePaperHandler {
    pub research: Arc<Research>,
}

#[async_trait::async_trait]
impl ToolHandler for SummarizePaperHandler {
    async fn execute(&self, args: Value) -> Result<Value> {
        let text = str_arg(&args, "text")?;
        let summary = self.research.summarize_paper(text).await?;
        Ok(Value::String(summary))
    }
}
