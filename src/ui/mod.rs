//! Terminal output helpers: status lines, tables and a network spinner.
//!
//! Formatting functions return `String`s so the dispatch loop can write them
//! to any `Write` sink. Colors are applied only when the caller asks for
//! them, which keeps piped output and test transcripts plain.

use comfy_table::{presets, Cell, ContentArrangement, Table};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::time::Duration;

use crate::mcp::Descriptor;
use crate::models::{PaperRecord, TopicIndex};

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
    Info,
    Search,
    Tool,
    Summary,
}

/// Status icons for different operations.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Warning => "⚠",
        Status::Info => "ℹ",
        Status::Search => "🔍",
        Status::Tool => "🛠",
        Status::Summary => "🧠",
    }
}

/// One status line, icon first
pub fn status_line(status: Status, msg: &str, color: bool) -> String {
    let icon = status_icon(status);
    if !color {
        return format!("{} {}", icon, msg);
    }
    match status {
        Status::Success => format!("{} {}", icon.green().bold(), msg),
        Status::Error => format!("{} {}", icon.red().bold(), msg.red()),
        Status::Warning => format!("{} {}", icon.yellow().bold(), msg),
        Status::Info => format!("{} {}", icon.cyan().bold(), msg),
        Status::Search => format!("{} {}", icon.yellow(), msg),
        Status::Tool => format!("{} {}", icon.magenta(), msg.dimmed()),
        Status::Summary => format!("{} {}", icon.blue(), msg),
    }
}

/// Welcome banner for the chat loop.
pub fn banner(tools: &[String], color: bool) -> String {
    let title = format!("Research Assistant v{}", env!("CARGO_PKG_VERSION"));
    let title = if color {
        title.bold().cyan().to_string()
    } else {
        title
    };
    format!(
        "\n{}\nConnected with tools: {}\nType a query, 'help' for commands or 'quit' to exit.\n",
        title,
        tools.join(", ")
    )
}

/// Print a section header.
pub fn section(title: &str, color: bool) -> String {
    let line = format!("━━━ {} ━━━", title);
    if color {
        line.bold().cyan().to_string()
    } else {
        line
    }
}

/// Truncate text to at most `max_chars` characters, ending with "..."
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if max_chars <= 3 {
        return "...".to_string();
    }
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars - 3).collect();
    format!("{}...", head)
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

/// Search results as a table
pub fn papers_table(papers: &[PaperRecord]) -> Table {
    let mut table = new_table(vec!["ID", "Title", "Authors", "Published"]);
    for paper in papers {
        table.add_row(vec![
            Cell::new(&paper.id),
            Cell::new(truncate_with_ellipsis(paper.title(), 60)),
            Cell::new(truncate_with_ellipsis(&paper.author_line(), 40)),
            Cell::new(paper.metadata.published),
        ]);
    }
    table
}

/// Registry listing as a table
pub fn descriptors_table(descriptors: &[Descriptor]) -> Table {
    let mut table = new_table(vec!["Name", "Description"]);
    for descriptor in descriptors {
        let name = match descriptor {
            Descriptor::Prompt(p) => {
                let params: Vec<String> = p
                    .parameters
                    .iter()
                    .map(|a| if a.required { a.name.clone() } else { format!("{}?", a.name) })
                    .collect();
                format!("{}({})", p.name, params.join(", "))
            }
            other => other.name().to_string(),
        };
        table.add_row(vec![Cell::new(name), Cell::new(descriptor.description())]);
    }
    table
}

/// Stored papers per topic as a table
pub fn topics_table(index: &TopicIndex) -> Table {
    let mut table = new_table(vec!["Topic", "Papers", "IDs"]);
    for (topic, ids) in index {
        table.add_row(vec![
            Cell::new(topic),
            Cell::new(ids.len()),
            Cell::new(truncate_with_ellipsis(&ids.join(", "), 60)),
        ]);
    }
    table
}

/// Spinner shown while waiting on the network.
///
/// Hidden when stdout is not a terminal.
pub struct Spinner {
    pb: indicatif::ProgressBar,
}

impl Spinner {
    /// Create a new spinner with the given message.
    pub fn new(msg: &str) -> Self {
        if !is_terminal() {
            return Self::hidden();
        }

        let pb = indicatif::ProgressBar::new_spinner();
        if let Ok(style) = indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "));
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// A spinner that never draws
    pub fn hidden() -> Self {
        Self {
            pb: indicatif::ProgressBar::hidden(),
        }
    }

    /// Set the message.
    pub fn set_message(&self, msg: &str) {
        self.pb.set_message(msg.to_string());
    }

    /// Hide the spinner while `f` writes to the terminal.
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.pb.suspend(f)
    }

    /// Remove the spinner line.
    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.pb.is_finished() {
            self.pb.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::mock::make_paper;

    #[test]
    fn test_status_line_plain() {
        assert_eq!(status_line(Status::Error, "boom", false), "✗ boom");
        assert_eq!(status_line(Status::Success, "ok", false), "✓ ok");
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("Hello", 10), "Hello");
        assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
        assert_eq!(truncate_with_ellipsis("", 10), "");
        assert_eq!(truncate_with_ellipsis("Hello", 3), "...");
        assert_eq!(truncate_with_ellipsis("Überraschung", 6), "Übe...");
    }

    #[test]
    fn test_papers_table() {
        let table = papers_table(&[make_paper("2301.00001v1", "First")]).to_string();
        assert!(table.contains("2301.00001v1"));
        assert!(table.contains("First"));
        assert!(table.contains("2024-03-01"));
    }

    #[test]
    fn test_topics_table() {
        let mut index = TopicIndex::new();
        index.insert("llm".to_string(), vec!["a".to_string(), "b".to_string()]);
        let table = topics_table(&index).to_string();
        assert!(table.contains("llm"));
        assert!(table.contains("a, b"));
    }
}
