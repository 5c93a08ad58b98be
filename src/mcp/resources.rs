//! Read-only resources over the metadata store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::registry::ResourceHandler;
use crate::error::{Error, Result};
use crate::models::Topic;
use crate::research::{render, Research};

/// `papers://folders`
#[derive(Debug)]
pub struct FoldersResource {
    pub research: Arc<Research>,
}

#[async_trait]
impl ResourceHandler for FoldersResource {
    async fn read(&self, _params: &HashMap<String, String>) -> Result<String> {
        let folders = self.research.folders()?;
        Ok(render::folders_markdown(&folders))
    }
}

/// `papers://{topic}`
#[derive(Debug)]
pub struct TopicResource {
    pub research: Arc<Research>,
}

#[async_trait]
impl ResourceHandler for TopicResource {
    async fn read(&self, params: &HashMap<String, String>) -> Result<String> {
        let label = params
            .get("topic")
            .ok_or_else(|| Error::SchemaValidation("missing topic in URI".to_string()))?;
        let topic = Topic::parse(label)?;
        let papers = self.research.topic_papers(&topic)?;
        Ok(render::topic_markdown(&topic, &papers))
    }
}
