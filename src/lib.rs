//! # Research Assistant
//!
//! A terminal research assistant that chains arXiv search with a hosted
//! chat-completions model, exposed both as a Model Context Protocol (MCP)
//! server and as an interactive dispatch loop.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Paper records, topics and search queries
//! - [`store`]: Per-topic `papers_info.json` files under the papers directory
//! - [`sources`]: Search provider trait with the arXiv implementation
//! - [`llm`]: Chat model trait with the Azure OpenAI implementation
//! - [`research`]: The operations tools and resources are built from
//! - [`mcp`]: Tool/resource/prompt registry and the pmcp server adapter
//! - [`chat`]: Command parsing, the tool-calling conversation and the loop
//! - [`config`]: Configuration management
//! - [`utils`]: HTTP client, PDF extraction and input validation

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod mcp;
pub mod models;
pub mod research;
pub mod sources;
pub mod store;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use error::{Category, Error, Result};
pub use mcp::Registry;
pub use models::{PaperRecord, Topic};
pub use research::Research;
pub use sources::Source;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
