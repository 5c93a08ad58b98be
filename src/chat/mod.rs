//! Interactive dispatch loop.
//!
//! [`Dispatcher`] resolves one input line at a time against the registry and
//! writes everything it prints to a caller-supplied sink, so the same code
//! drives the terminal session and the tests. [`run_interactive`] wraps it
//! in a rustyline editor.

pub mod command;
pub mod conversation;

pub use command::Command;
pub use conversation::{Conversation, ConversationState, Event, Observer};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde_json::Value;
use std::io::{self, Write};
use std::sync::Arc;

use crate::config::ChatConfig;
use crate::error::{Category, Result};
use crate::llm::ChatModel;
use crate::mcp::Registry;
use crate::ui::{self, Spinner, Status};

/// Characters of a tool result echoed in the trace
const PREVIEW_CHARS: usize = 400;

/// Whether the loop should keep reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Resolves input lines and prints their outcome
pub struct Dispatcher<W: Write> {
    registry: Arc<Registry>,
    model: Arc<dyn ChatModel>,
    config: ChatConfig,
    out: W,
    color: bool,
    spinner: bool,
}

impl<W: Write> Dispatcher<W> {
    pub fn new(registry: Arc<Registry>, model: Arc<dyn ChatModel>, config: ChatConfig, out: W) -> Self {
        Self {
            registry,
            model,
            config,
            out,
            color: false,
            spinner: false,
        }
    }

    /// Colorize status lines
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Show a spinner while a query waits on the network
    pub fn with_spinner(mut self, spinner: bool) -> Self {
        self.spinner = spinner;
        self
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Print the welcome banner
    pub fn greet(&mut self) -> io::Result<()> {
        let tools: Vec<String> = self
            .registry
            .list(Category::Tool)
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        writeln!(self.out, "{}", ui::banner(&tools, self.color))
    }

    /// Handle one line of input. Non-fatal errors are printed and the loop
    /// continues; only a failing output sink is returned as an error.
    pub async fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(e) => {
                self.print_error(&e)?;
                return Ok(Flow::Continue);
            }
        };

        tracing::debug!(?command, "Dispatching");

        let outcome = match command {
            Command::Empty => Ok(()),
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => writeln!(self.out, "{}", command::HELP).map_err(crate::Error::from),
            Command::List(category) => self.list(category),
            Command::ReadResource(uri) => self.read_resource(&uri).await,
            Command::RunPrompt { name, args } => self.run_prompt(&name, args).await,
            Command::Query(query) => self.query(&query).await,
        };

        if let Err(e) = outcome {
            self.print_error(&e)?;
        }
        Ok(Flow::Continue)
    }

    fn print_error(&mut self, err: &crate::Error) -> io::Result<()> {
        writeln!(
            self.out,
            "{}",
            ui::status_line(Status::Error, &err.to_string(), self.color)
        )
    }

    fn list(&mut self, category: Category) -> Result<()> {
        let descriptors = self.registry.list(category);
        writeln!(self.out, "{}", ui::descriptors_table(&descriptors))?;
        Ok(())
    }

    async fn read_resource(&mut self, uri: &str) -> Result<()> {
        let contents = self.registry.read_resource(uri).await?;
        writeln!(self.out, "{}", contents.text.trim_end())?;
        Ok(())
    }

    async fn run_prompt(&mut self, name: &str, args: Vec<(String, String)>) -> Result<()> {
        let rendered = self.registry.get_prompt_from_text(name, args)?;

        writeln!(self.out, "{}", ui::section(&format!("Prompt: {}", rendered.name), self.color))?;
        writeln!(self.out, "{}", rendered.text.trim_end())?;
        writeln!(self.out)?;

        self.query(&rendered.text).await
    }

    async fn query(&mut self, query: &str) -> Result<()> {
        let spinner = if self.spinner {
            Spinner::new("Thinking...")
        } else {
            Spinner::hidden()
        };

        let conversation = Conversation::new(&self.registry, self.model.as_ref(), &self.config);
        let mut trace = Trace {
            out: &mut self.out,
            color: self.color,
            spinner: &spinner,
            failed: None,
        };
        let answer = conversation.run(query, &mut trace).await;
        spinner.finish();

        if let Some(err) = trace.failed {
            return Err(err.into());
        }
        let answer = answer?;
        writeln!(self.out, "\n{}", answer.trim())?;
        Ok(())
    }
}

/// Prints conversation events as they happen
struct Trace<'a, W: Write> {
    out: &'a mut W,
    color: bool,
    spinner: &'a Spinner,
    /// First write failure; later events are dropped
    failed: Option<io::Error>,
}

impl<W: Write> Trace<'_, W> {
    fn line(&mut self, status: Status, msg: &str) {
        if self.failed.is_some() {
            return;
        }
        let line = ui::status_line(status, msg, self.color);
        let out = &mut *self.out;
        if let Err(e) = self.spinner.suspend(|| writeln!(out, "{}", line)) {
            tracing::warn!(error = %e, "Failed to write tool trace");
            self.failed = Some(e);
        }
    }
}

impl<W: Write> Observer for Trace<'_, W> {
    fn on_event(&mut self, event: Event<'_>) {
        match event {
            Event::ToolCall { name, arguments } => {
                let args = serde_json::from_str::<Value>(arguments)
                    .map(|v| v.to_string())
                    .unwrap_or_else(|_| arguments.to_string());
                self.spinner.set_message(&format!("Running {}...", name));
                self.line(Status::Tool, &format!("Calling tool '{}' with args: {}", name, args));
            }
            Event::ToolResult { name, text } => {
                let preview = ui::truncate_with_ellipsis(text, PREVIEW_CHARS);
                self.line(Status::Success, &format!("{} result:\n{}", name, preview));
            }
            Event::ToolError { name, message } => {
                self.line(Status::Warning, &format!("Tool {} failed: {}", name, message));
            }
            Event::ChainInfo { paper_id, info } => {
                let preview = ui::truncate_with_ellipsis(info, PREVIEW_CHARS);
                self.line(Status::Search, &format!("Info for {}:\n{}", paper_id, preview));
            }
            Event::ChainSummary { paper_id, summary } => {
                self.line(Status::Summary, &format!("Summary for {}:\n{}", paper_id, summary));
            }
            Event::ChainError { message } => {
                self.line(Status::Warning, &format!("Tool chaining error: {}", message));
            }
        }
    }
}

/// Read lines from the terminal until `quit` or end of input.
///
/// Ctrl-C discards the current line. Must run on a multi-threaded runtime.
pub async fn run_interactive(
    registry: Arc<Registry>,
    model: Arc<dyn ChatModel>,
    config: ChatConfig,
) -> anyhow::Result<()> {
    let terminal = ui::is_terminal();
    let mut dispatcher = Dispatcher::new(registry, model, config, io::stdout())
        .with_color(terminal)
        .with_spinner(terminal);
    dispatcher.greet()?;

    let mut rl = DefaultEditor::new()?;

    loop {
        let readline = tokio::task::block_in_place(|| rl.readline("\nQuery: "));
        match readline {
            Ok(line) => {
                if !line.trim().is_empty() {
                    rl.add_history_entry(line.as_str()).ok();
                }
                if dispatcher.handle_line(&line).await? == Flow::Quit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    tracing::debug!("Chat loop finished");
    Ok(())
}
