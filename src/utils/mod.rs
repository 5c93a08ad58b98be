//! Utility modules supporting research operations.
//!
//! - [`HttpClient`]: shared reqwest client with timeouts and a crate user agent
//! - [`extract_text`] / [`extract_text_blocking`]: PDF text extraction
//! - [`validate_topic`], [`sanitize_paper_id`], [`validate_url`]: input checks
//!   applied before anything touches the filesystem or the network

mod http;
mod pdf;
mod validate;

pub use http::{HttpClient, DEFAULT_TIMEOUT};
pub use pdf::{extract_text, extract_text_blocking, PdfExtractError};
pub use validate::{sanitize_paper_id, validate_topic, validate_url, ValidationError};
