//! MCP server implementation using pmcp (Pragmatic AI's rust-mcp-sdk).
//!
//! Adapts the [`Registry`] onto a pmcp [`Server`] served over stdio. Tools
//! and prompts are registered one handler per entry; all resources go through
//! a single [`ResourceWrapper`] that resolves URIs against the registry.

use crate::error::Error as RegistryError;
use crate::mcp::registry::{Registry, Tool};
use async_trait::async_trait;
use pmcp::types::{GetPromptResult, ListResourcesResult, PromptInfo, ReadResourceResult};
use pmcp::{
    Error, PromptHandler, RequestHandlerExtra, ResourceHandler, Server, ServerCapabilities,
    ToolHandler, ToolInfo,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// The MCP server for the research assistant
pub struct McpServer {
    server: Server,
}

impl McpServer {
    /// Create a new MCP server exposing every registry entry
    pub fn new(registry: Arc<Registry>) -> Result<Self, Error> {
        let server = Self::build_server_impl(registry)?;
        Ok(Self { server })
    }

    fn build_server_impl(registry: Arc<Registry>) -> Result<Server, Error> {
        let capabilities: ServerCapabilities = from_json(json!({
            "tools": {},
            "prompts": {},
            "resources": {}
        }))?;

        let mut builder = Server::builder()
            .name("research")
            .version(env!("CARGO_PKG_VERSION"))
            .capabilities(capabilities);

        for tool in registry.tools() {
            let wrapper = ToolWrapper {
                registry: registry.clone(),
                tool: tool.clone(),
            };
            builder = builder.tool(tool.descriptor.name.clone(), wrapper);
        }

        for prompt in registry.prompts() {
            let wrapper = PromptWrapper {
                registry: registry.clone(),
                name: prompt.descriptor.name.clone(),
            };
            builder = builder.prompt(prompt.descriptor.name.clone(), wrapper);
        }

        builder = builder.resources(ResourceWrapper { registry });

        builder.build()
    }

    /// Run the server in stdio mode
    pub async fn run(self) -> Result<(), Error> {
        tracing::info!("Starting MCP server in stdio mode");
        self.server.run_stdio().await
    }
}

fn from_json<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    serde_json::from_value(value).map_err(|e| Error::internal(e.to_string()))
}

/// Map registry failures onto protocol errors
fn protocol_error(err: RegistryError) -> Error {
    match err {
        RegistryError::UnknownName { .. }
        | RegistryError::SchemaValidation(_)
        | RegistryError::NotFound(_) => Error::invalid_params(err.to_string()),
        other => Error::internal(other.to_string()),
    }
}

/// Wrapper for adapting a registry tool to pmcp's ToolHandler
#[derive(Clone)]
struct ToolWrapper {
    registry: Arc<Registry>,
    tool: Tool,
}

#[async_trait]
impl ToolHandler for ToolWrapper {
    async fn handle(&self, args: Value, _extra: RequestHandlerExtra) -> Result<Value, Error> {
        self.registry
            .call_tool(&self.tool.descriptor.name, args)
            .await
            .map_err(protocol_error)
    }

    fn metadata(&self) -> Option<ToolInfo> {
        Some(ToolInfo::new(
            self.tool.descriptor.name.clone(),
            Some(self.tool.descriptor.description.clone()),
            self.tool.descriptor.input_schema.clone(),
        ))
    }
}

/// Wrapper for adapting a registry prompt to pmcp's PromptHandler
#[derive(Clone)]
struct PromptWrapper {
    registry: Arc<Registry>,
    name: String,
}

#[async_trait]
impl PromptHandler for PromptWrapper {
    async fn handle(
        &self,
        args: HashMap<String, String>,
        _extra: RequestHandlerExtra,
    ) -> Result<GetPromptResult, Error> {
        let rendered = self
            .registry
            .get_prompt_from_text(&self.name, args)
            .map_err(protocol_error)?;

        from_json(json!({
            "description": rendered.description,
            "messages": [{
                "role": "user",
                "content": {"type": "text", "text": rendered.text}
            }]
        }))
    }

    fn metadata(&self) -> Option<PromptInfo> {
        let prompt = self.registry.prompts().find(|p| p.descriptor.name == self.name)?;
        let arguments: Vec<Value> = prompt
            .descriptor
            .parameters
            .iter()
            .map(|p| {
                json!({
                    "name": p.name,
                    "description": p.description,
                    "required": p.required
                })
            })
            .collect();

        from_json(json!({
            "name": prompt.descriptor.name,
            "description": prompt.descriptor.description,
            "arguments": arguments
        }))
        .ok()
    }
}

/// Resolves every `resources/read` and `resources/list` through the registry
struct ResourceWrapper {
    registry: Arc<Registry>,
}

#[async_trait]
impl ResourceHandler for ResourceWrapper {
    async fn read(&self, uri: &str, _extra: RequestHandlerExtra) -> Result<ReadResourceResult, Error> {
        let contents = self
            .registry
            .read_resource(uri)
            .await
            .map_err(protocol_error)?;

        from_json(json!({
            "contents": [{
                "type": "resource",
                "uri": contents.uri,
                "mimeType": contents.mime_type,
                "text": contents.text
            }]
        }))
    }

    async fn list(
        &self,
        _cursor: Option<String>,
        _extra: RequestHandlerExtra,
    ) -> Result<ListResourcesResult, Error> {
        // Static entries plus one concrete URI per topic folder
        let mut resources = Vec::new();
        for resource in self.registry.resources() {
            let d = &resource.descriptor;
            if !d.uri_template.contains('{') {
                resources.push(json!({
                    "uri": d.uri_template,
                    "name": d.name,
                    "description": d.description,
                    "mimeType": d.mime_type
                }));
            }
        }

        let folders = self
            .registry
            .topic_folders()
            .map_err(protocol_error)?;
        for folder in folders {
            resources.push(json!({
                "uri": format!("papers://{}", folder),
                "name": folder,
                "description": format!("Papers stored under {}", folder),
                "mimeType": "text/markdown"
            }));
        }

        from_json(json!({ "resources": resources }))
    }
}
