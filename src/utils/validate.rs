//! Input validation for topics, paper IDs and PDF URLs.
//!
//! Topics become directory names under the papers directory and paper IDs
//! arrive from the model during tool calls, so both are checked before they
//! touch the filesystem.

use thiserror::Error;

/// Validation error types
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Invalid topic: {0}")]
    InvalidTopic(String),

    #[error("Invalid paper ID: {0}")]
    InvalidPaperId(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Path traversal detected: {0}")]
    PathTraversal(String),
}

/// Longest topic label accepted as a directory name
const MAX_TOPIC_LENGTH: usize = 200;

/// Validate a topic label that will be turned into a directory name.
///
/// Returns the trimmed label.
pub fn validate_topic(topic: &str) -> Result<String, ValidationError> {
    let topic = topic.trim();

    if topic.is_empty() {
        return Err(ValidationError::InvalidTopic("empty topic".to_string()));
    }

    if topic.len() > MAX_TOPIC_LENGTH {
        return Err(ValidationError::InvalidTopic(format!(
            "longer than {} bytes",
            MAX_TOPIC_LENGTH
        )));
    }

    if topic.contains("..") || topic.contains('/') || topic.contains('\\') {
        return Err(ValidationError::PathTraversal(topic.to_string()));
    }

    if topic.chars().any(|c| c.is_control()) {
        return Err(ValidationError::InvalidTopic(
            "contains control characters".to_string(),
        ));
    }

    Ok(topic.to_string())
}

/// Validate a paper ID supplied by a user or the model.
///
/// arXiv IDs are alphanumerics with dots, dashes and at most a category
/// slash ("hep-th/9901001v1"). Shell metacharacters and control characters
/// are rejected.
pub fn sanitize_paper_id(id: &str) -> Result<String, ValidationError> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::InvalidPaperId("empty ID".to_string()));
    }

    if id.contains("..") || id.contains("./") || id.contains(".\\") {
        return Err(ValidationError::PathTraversal(id.to_string()));
    }

    if id.chars().any(|c| c.is_control()) {
        return Err(ValidationError::InvalidPaperId(
            "contains control characters".to_string(),
        ));
    }

    let dangerous_chars = [
        ';', '|', '&', '$', '`', '(', ')', '{', '}', '[', ']', '<', '>', '*', '?', '!',
    ];
    if let Some(ch) = id.chars().find(|c| dangerous_chars.contains(c)) {
        return Err(ValidationError::InvalidPaperId(format!(
            "contains dangerous character: {}",
            ch
        )));
    }

    Ok(id.to_string())
}

/// Validate a PDF URL read from the store before fetching it.
///
/// Only absolute http/https URLs are accepted.
pub fn validate_url(url: &str) -> Result<url::Url, ValidationError> {
    let url = url.trim();

    if url.is_empty() {
        return Err(ValidationError::InvalidUrl("empty URL".to_string()));
    }

    if url.contains('\0') || url.contains('\n') || url.contains('\r') {
        return Err(ValidationError::InvalidUrl(
            "contains control characters".to_string(),
        ));
    }

    let parsed = url::Url::parse(url).map_err(|e| ValidationError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ValidationError::InvalidUrl(format!(
            "invalid scheme: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_topic() {
        assert_eq!(validate_topic("  diffusion models ").unwrap(), "diffusion models");
        assert!(validate_topic("").is_err());
        assert!(validate_topic("\t").is_err());
        assert!(matches!(
            validate_topic("../../etc"),
            Err(ValidationError::PathTraversal(_))
        ));
        assert!(validate_topic("a\\b").is_err());
        assert!(validate_topic("line\nbreak").is_err());
        assert!(validate_topic(&"x".repeat(MAX_TOPIC_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_sanitize_paper_id_valid() {
        assert!(sanitize_paper_id("2301.12345").is_ok());
        assert!(sanitize_paper_id("2301.12345v2").is_ok());
        assert!(sanitize_paper_id("hep-th/9901001v1").is_ok());
        assert_eq!(sanitize_paper_id(" 2301.12345 ").unwrap(), "2301.12345");
    }

    #[test]
    fn test_sanitize_paper_id_rejects() {
        assert!(sanitize_paper_id("").is_err());
        assert!(sanitize_paper_id("../etc/passwd").is_err());
        assert!(sanitize_paper_id("foo;rm -rf /").is_err());
        assert!(sanitize_paper_id("foo$(whoami)").is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("http://arxiv.org/pdf/2301.12345v1").is_ok());
        assert!(validate_url("https://arxiv.org/pdf/2301.12345v1").is_ok());
        assert!(validate_url("").is_err());
        assert!(validate_url("ftp://example.com/a.pdf").is_err());
        assert!(validate_url("javascript:alert(1)").is_err());
        assert!(validate_url("not a url").is_err());
    }
}
