//! MCP (Model Context Protocol) implementation.
//!
//! - [`registry`]: the static tool/resource/prompt table
//! - [`server`]: pmcp adapter serving the registry over stdio

mod handlers;
mod prompts;
pub mod registry;
mod resources;
pub mod schema;
pub mod server;

pub use registry::{
    result_text, Descriptor, PromptDescriptor, PromptParameter, Registry, RenderedPrompt,
    ResourceContents, ResourceDescriptor, ToolDescriptor,
};
pub use server::McpServer;
