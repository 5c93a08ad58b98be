//! Static table of tools, resources and prompts.
//!
//! The table is built once in [`Registry::new`] and never changes. Both the
//! MCP server and the chat dispatch loop resolve names through it, so the
//! argument checks below apply to either front end.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::handlers::{
    ExtractInfoHandler, GetFullTextHandler, ListAllPapersHandler, SearchPapersHandler,
    SummarizePaperHandler,
};
use super::prompts::GenerateSearchPrompt;
use super::resources::{FoldersResource, TopicResource};
use super::schema::{self, UriTemplate};
use crate::error::{Category, Error, Result};
use crate::research::Research;

/// Executes a tool with already-validated arguments
#[async_trait]
pub trait ToolHandler: Send + Sync + std::fmt::Debug {
    async fn execute(&self, args: Value) -> Result<Value>;
}

/// Produces the text of a resource from the values bound by its URI template
#[async_trait]
pub trait ResourceHandler: Send + Sync + std::fmt::Debug {
    async fn read(&self, params: &HashMap<String, String>) -> Result<String>;
}

/// Renders prompt text from already-validated arguments
pub trait PromptHandler: Send + Sync + std::fmt::Debug {
    fn render(&self, args: &Value) -> Result<String>;
}

/// Public description of a tool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Public description of a resource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDescriptor {
    pub uri_template: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
}

/// One declared prompt parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptParameter {
    pub name: String,
    pub description: String,
    pub required: bool,
}

/// Public description of a prompt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<PromptParameter>,
}

/// Listing entry of any category
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Descriptor {
    Tool(ToolDescriptor),
    Resource(ResourceDescriptor),
    Prompt(PromptDescriptor),
}

impl Descriptor {
    /// Tool or prompt name, or resource URI template
    pub fn name(&self) -> &str {
        match self {
            Descriptor::Tool(d) => &d.name,
            Descriptor::Resource(d) => &d.uri_template,
            Descriptor::Prompt(d) => &d.name,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Descriptor::Tool(d) => &d.description,
            Descriptor::Resource(d) => &d.description,
            Descriptor::Prompt(d) => &d.description,
        }
    }
}

/// A registered tool
#[derive(Debug, Clone)]
pub struct Tool {
    pub descriptor: ToolDescriptor,
    pub handler: Arc<dyn ToolHandler>,
}

/// A registered resource
#[derive(Debug, Clone)]
pub struct Resource {
    pub descriptor: ResourceDescriptor,
    template: UriTemplate,
    pub handler: Arc<dyn ResourceHandler>,
}

/// A registered prompt
#[derive(Debug, Clone)]
pub struct Prompt {
    pub descriptor: PromptDescriptor,
    /// Object schema derived from the parameters, used for validation
    schema: Value,
    pub handler: Arc<dyn PromptHandler>,
}

/// Contents returned by a resource read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceContents {
    pub uri: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub text: String,
}

/// A prompt rendered to instruction text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedPrompt {
    pub name: String,
    pub description: String,
    pub text: String,
}

/// The tool/resource/prompt table
#[derive(Debug, Clone)]
pub struct Registry {
    tools: BTreeMap<String, Tool>,
    resources: Vec<Resource>,
    prompts: BTreeMap<String, Prompt>,
    research: Arc<Research>,
}

impl Registry {
    /// Build the fixed table over a research backend
    pub fn new(research: Arc<Research>) -> Self {
        let mut registry = Self {
            tools: BTreeMap::new(),
            resources: Vec::new(),
            prompts: BTreeMap::new(),
            research: research.clone(),
        };
        registry.register_tools(&research);
        registry.register_resources(&research);
        registry.register_prompts(research.default_max_results());
        registry
    }

    fn register_tools(&mut self, research: &Arc<Research>) {
        let default_max = research.default_max_results();

        self.register_tool(
            "search_papers",
            "Search arXiv for papers matching a topic and save their metadata locally. Returns the paper IDs in relevance order.",
            json!({
                "type": "object",
                "properties": {
                    "topic": {
                        "type": "string",
                        "minLength": 1,
                        "description": "The topic to search for"
                    },
                    "max_results": {
                        "type": "integer",
                        "minimum": 1,
                        "default": default_max,
                        "description": "Maximum number of results to retrieve"
                    }
                },
                "required": ["topic"]
            }),
            Arc::new(SearchPapersHandler {
                research: research.clone(),
            }),
        );

        self.register_tool(
            "extract_info",
            "Get the stored metadata for a paper by its ID.",
            json!({
                "type": "object",
                "properties": {
                    "paper_id": {
                        "type": "string",
                        "minLength": 1,
                        "description": "The paper ID to look for (e.g. '2301.12345v1')"
                    }
                },
                "required": ["paper_id"]
            }),
            Arc::new(ExtractInfoHandler {
                research: research.clone(),
            }),
        );

        self.register_tool(
            "get_full_text",
            "Download the PDF of a stored paper and return its extracted plain text.",
            json!({
                "type": "object",
                "properties": {
                    "paper_id": {
                        "type": "string",
                        "minLength": 1,
                        "description": "The ID of a paper previously returned by search_papers"
                    }
                },
                "required": ["paper_id"]
            }),
            Arc::new(GetFullTextHandler {
                research: research.clone(),
            }),
        );

        self.register_tool(
            "list_all_papers",
            "List the IDs of all stored papers, grouped by topic.",
            json!({
                "type": "object",
                "properties": {}
            }),
            Arc::new(ListAllPapersHandler {
                research: research.clone(),
            }),
        );

        self.register_tool(
            "summarize_paper",
            "Summarize the text of a research paper in plain English.",
            json!({
                "type": "object",
                "properties": {
                    "text": {
                        "type": "string",
                        "description": "Paper text or metadata to summarize"
                    }
                },
                "required": ["text"]
            }),
            Arc::new(SummarizePaperHandler {
                research: research.clone(),
            }),
        );
    }

    fn register_tool(
        &mut self,
        name: &str,
        description: &str,
        input_schema: Value,
        handler: Arc<dyn ToolHandler>,
    ) {
        self.tools.insert(
            name.to_string(),
            Tool {
                descriptor: ToolDescriptor {
                    name: name.to_string(),
                    description: description.to_string(),
                    input_schema,
                },
                handler,
            },
        );
    }

    fn register_resources(&mut self, research: &Arc<Research>) {
        self.register_resource(
            ResourceDescriptor {
                uri_template: "papers://folders".to_string(),
                name: "folders".to_string(),
                description: "List of topic folders in the papers directory".to_string(),
                mime_type: "text/markdown".to_string(),
            },
            Arc::new(FoldersResource {
                research: research.clone(),
            }),
        );

        self.register_resource(
            ResourceDescriptor {
                uri_template: "papers://{topic}".to_string(),
                name: "topic_papers".to_string(),
                description: "Details of every paper stored under a topic".to_string(),
                mime_type: "text/markdown".to_string(),
            },
            Arc::new(TopicResource {
                research: research.clone(),
            }),
        );
    }

    fn register_resource(&mut self, descriptor: ResourceDescriptor, handler: Arc<dyn ResourceHandler>) {
        let template = UriTemplate::new(descriptor.uri_template.clone());
        self.resources.push(Resource {
            descriptor,
            template,
            handler,
        });
        // Literal templates win over placeholders; ties keep template order
        self.resources.sort_by(|a, b| {
            b.template
                .is_static()
                .cmp(&a.template.is_static())
                .then_with(|| a.descriptor.uri_template.cmp(&b.descriptor.uri_template))
        });
    }

    fn register_prompts(&mut self, default_num_papers: u32) {
        self.register_prompt(
            PromptDescriptor {
                name: "generate_search_prompt".to_string(),
                description: "Generate a prompt that asks the assistant to find and discuss academic papers on a topic".to_string(),
                parameters: vec![
                    PromptParameter {
                        name: "topic".to_string(),
                        description: "The research topic to search for".to_string(),
                        required: true,
                    },
                    PromptParameter {
                        name: "num_papers".to_string(),
                        description: format!("Number of papers to retrieve (default {})", default_num_papers),
                        required: false,
                    },
                ],
            },
            json!({
                "type": "object",
                "properties": {
                    "topic": {"type": "string", "minLength": 1},
                    "num_papers": {"type": "integer", "minimum": 1, "default": default_num_papers}
                },
                "required": ["topic"]
            }),
            Arc::new(GenerateSearchPrompt),
        );
    }

    fn register_prompt(&mut self, descriptor: PromptDescriptor, schema: Value, handler: Arc<dyn PromptHandler>) {
        self.prompts.insert(
            descriptor.name.clone(),
            Prompt {
                descriptor,
                schema,
                handler,
            },
        );
    }

    /// Descriptors of one category, sorted by name (URI template for resources)
    pub fn list(&self, category: Category) -> Vec<Descriptor> {
        match category {
            Category::Tool => self
                .tools
                .values()
                .map(|t| Descriptor::Tool(t.descriptor.clone()))
                .collect(),
            Category::Resource => {
                let mut resources: Vec<Descriptor> = self
                    .resources
                    .iter()
                    .map(|r| Descriptor::Resource(r.descriptor.clone()))
                    .collect();
                resources.sort_by(|a, b| a.name().cmp(b.name()));
                resources
            }
            Category::Prompt => self
                .prompts
                .values()
                .map(|p| Descriptor::Prompt(p.descriptor.clone()))
                .collect(),
        }
    }

    /// Invoke any entry by category. For resources `name` is the concrete URI
    /// and `args` is ignored.
    pub async fn invoke(&self, category: Category, name: &str, args: Value) -> Result<Value> {
        let value = match category {
            Category::Tool => self.call_tool(name, args).await?,
            Category::Resource => to_value(self.read_resource(name).await?)?,
            Category::Prompt => to_value(self.get_prompt(name, args)?)?,
        };
        Ok(value)
    }

    pub fn research(&self) -> &Arc<Research> {
        &self.research
    }

    /// Topic folders currently addressable as `papers://{topic}`
    pub fn topic_folders(&self) -> Result<Vec<String>> {
        self.research.folders()
    }

    pub fn tool(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    pub fn tools(&self) -> impl Iterator<Item = &Tool> {
        self.tools.values()
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    pub fn prompts(&self) -> impl Iterator<Item = &Prompt> {
        self.prompts.values()
    }

    /// Validate arguments against the tool's schema and run it
    pub async fn call_tool(&self, name: &str, args: Value) -> Result<Value> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| Error::unknown(Category::Tool, name))?;

        let args = schema::apply_defaults(&tool.descriptor.input_schema, args);
        schema::validate(&tool.descriptor.input_schema, &args)?;

        tracing::debug!(tool = name, %args, "Calling tool");
        tool.handler.execute(args).await
    }

    /// Read the resource whose template matches `uri`
    pub async fn read_resource(&self, uri: &str) -> Result<ResourceContents> {
        for resource in &self.resources {
            if let Some(params) = resource.template.matches(uri) {
                tracing::debug!(uri, template = resource.template.as_str(), "Reading resource");
                let text = resource.handler.read(&params).await?;
                return Ok(ResourceContents {
                    uri: uri.to_string(),
                    mime_type: resource.descriptor.mime_type.clone(),
                    text,
                });
            }
        }
        Err(Error::unknown(Category::Resource, uri))
    }

    /// Validate arguments and render a prompt
    pub fn get_prompt(&self, name: &str, args: Value) -> Result<RenderedPrompt> {
        let prompt = self
            .prompts
            .get(name)
            .ok_or_else(|| Error::unknown(Category::Prompt, name))?;

        let args = schema::apply_defaults(&prompt.schema, args);
        schema::validate(&prompt.schema, &args)?;

        Ok(RenderedPrompt {
            name: prompt.descriptor.name.clone(),
            description: prompt.descriptor.description.clone(),
            text: prompt.handler.render(&args)?,
        })
    }

    /// Render a prompt from textual `key=value` arguments, typing each value
    /// by the prompt's declared schema
    pub fn get_prompt_from_text<I, K, V>(&self, name: &str, args: I) -> Result<RenderedPrompt>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let prompt = self
            .prompts
            .get(name)
            .ok_or_else(|| Error::unknown(Category::Prompt, name))?;
        let args = schema::coerce_arguments(&prompt.schema, args);
        self.get_prompt(name, args)
    }

    /// OpenAI function-tool declarations for every registered tool
    pub fn tool_schemas(&self) -> Vec<Value> {
        self.tools
            .values()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.descriptor.name,
                        "description": tool.descriptor.description,
                        "parameters": tool.descriptor.input_schema,
                    }
                })
            })
            .collect()
    }
}

fn to_value<T: Serialize>(value: T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| Error::Store(e.to_string()))
}

/// Text form of a tool result: strings verbatim, anything else pretty JSON
pub fn result_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedModel;
    use crate::sources::mock::make_paper;
    use crate::sources::MockSource;
    use crate::store::MetadataStore;
    use crate::utils::HttpClient;

    fn registry(dir: &tempfile::TempDir) -> Registry {
        let research = Research::new(
            Arc::new(MockSource::with_papers(vec![
                make_paper("2301.00001v1", "First"),
                make_paper("2301.00002v1", "Second"),
            ])),
            MetadataStore::new(dir.path().join("papers")),
            HttpClient::new().unwrap(),
            Arc::new(ScriptedModel::default()),
        );
        Registry::new(Arc::new(research))
    }

    #[test]
    fn test_listings_are_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);

        let tools: Vec<String> = registry
            .list(Category::Tool)
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(
            tools,
            [
                "extract_info",
                "get_full_text",
                "list_all_papers",
                "search_papers",
                "summarize_paper"
            ]
        );

        let resources: Vec<String> = registry
            .list(Category::Resource)
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(resources, ["papers://folders", "papers://{topic}"]);

        let prompts = registry.list(Category::Prompt);
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].name(), "generate_search_prompt");
    }

    #[tokio::test]
    async fn test_unknown_names() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);

        for (category, name) in [
            (Category::Tool, "delete_everything"),
            (Category::Resource, "files://etc"),
            (Category::Prompt, "nope"),
        ] {
            let err = registry.invoke(category, name, json!({})).await.unwrap_err();
            assert!(
                matches!(err, Error::UnknownName { category: c, name: ref n } if c == category && n.as_str() == name),
                "{:?}",
                err
            );
        }
    }

    #[tokio::test]
    async fn test_schema_violation_skips_handler() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);

        let err = registry
            .call_tool("search_papers", json!({"topic": "llm", "max_results": 0}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SchemaValidation(_)));
        assert!(!dir.path().join("papers").exists());
    }

    #[tokio::test]
    async fn test_folders_resource_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);

        registry
            .call_tool("search_papers", json!({"topic": "folders"}))
            .await
            .unwrap();

        let contents = registry.read_resource("papers://folders").await.unwrap();
        assert!(contents.text.starts_with("# Available Topics"));
        assert_eq!(contents.mime_type, "text/markdown");
    }

    #[test]
    fn test_prompt_from_text_keeps_numeric_topics() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);

        let rendered = registry
            .get_prompt_from_text("generate_search_prompt", [("topic", "1984"), ("num_papers", "2")])
            .unwrap();
        assert!(rendered
            .text
            .contains("search_papers(topic='1984', max_results=2)"));

        let err = registry
            .get_prompt_from_text("generate_search_prompt", [("topic", "llm"), ("num_papers", "many")])
            .unwrap_err();
        assert!(matches!(err, Error::SchemaValidation(_)));

        let err = registry
            .get_prompt_from_text("missing", Vec::<(String, String)>::new())
            .unwrap_err();
        assert!(matches!(err, Error::UnknownName { .. }));
    }

    #[test]
    fn test_tool_schemas_shape() {
        let dir = tempfile::tempdir().unwrap();
        let schemas = registry(&dir).tool_schemas();
        assert_eq!(schemas.len(), 5);
        for schema in &schemas {
            assert_eq!(schema["type"], "function");
            assert_eq!(schema["function"]["parameters"]["type"], "object");
        }
    }

    #[test]
    fn test_result_text() {
        assert_eq!(result_text(&json!("plain")), "plain");
        assert_eq!(result_text(&json!(["a", "b"])), "[\n  \"a\",\n  \"b\"\n]");
    }
}
