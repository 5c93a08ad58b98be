//! Terminal command grammar.
//!
//! ```text
//! list tools | list resources | list prompts
//! papers://<folders|topic>
//! run prompt <name> [key=value ...]     values may be "double quoted"
//! help
//! quit
//! <anything else>                        free-text query
//! ```
//!
//! Keywords are case-insensitive.

use crate::error::{Category, Error, Result};

/// Resource URI scheme recognized as a direct read
pub const RESOURCE_SCHEME: &str = "papers://";

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Empty,
    List(Category),
    ReadResource(String),
    RunPrompt {
        name: String,
        args: Vec<(String, String)>,
    },
    Help,
    Quit,
    Query(String),
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Command::Empty);
        }

        let lower = line.to_lowercase();
        let words: Vec<&str> = lower.split_whitespace().collect();

        match words.as_slice() {
            ["quit"] => return Ok(Command::Quit),
            ["help"] => return Ok(Command::Help),
            ["list", "tools"] => return Ok(Command::List(Category::Tool)),
            ["list", "resources"] => return Ok(Command::List(Category::Resource)),
            ["list", "prompts"] => return Ok(Command::List(Category::Prompt)),
            _ => {}
        }

        if lower.starts_with(RESOURCE_SCHEME) {
            return Ok(Command::ReadResource(line.to_string()));
        }

        if words.len() >= 2 && words[0] == "run" && words[1] == "prompt" {
            return parse_run_prompt(line);
        }

        Ok(Command::Query(line.to_string()))
    }
}

fn parse_run_prompt(line: &str) -> Result<Command> {
    let tokens = tokenize(line)?;
    // tokens[0] = "run", tokens[1] = "prompt"
    let name = tokens
        .get(2)
        .filter(|name| !name.contains('='))
        .cloned()
        .ok_or_else(|| {
            Error::SchemaValidation("usage: run prompt <name> [key=value ...]".to_string())
        })?;

    let mut args = Vec::new();
    for token in tokens.into_iter().skip(3) {
        match token.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                args.push((key.to_string(), value.to_string()));
            }
            _ => {
                return Err(Error::SchemaValidation(format!(
                    "expected key=value, got '{}'",
                    token
                )))
            }
        }
    }

    Ok(Command::RunPrompt { name, args })
}

/// Split on whitespace, keeping double-quoted spans together
fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err(Error::SchemaValidation("unterminated quote".to_string()));
    }
    if has_token {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Help text listing every command
pub const HELP: &str = "\
Commands:
  list tools                          show available tools
  list resources                      show available resources
  list prompts                        show available prompts
  papers://folders                    list topic folders
  papers://<topic>                    show papers stored under a topic
                                      (spaces may be written as-is, _ or %20)
  run prompt <name> [key=value ...]   render a prompt and send it to the model
  help                                show this message
  quit                                exit
Anything else is sent to the model as a query.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(Command::parse("QUIT").unwrap(), Command::Quit);
        assert_eq!(Command::parse("  Quit  ").unwrap(), Command::Quit);
        assert_eq!(Command::parse("help").unwrap(), Command::Help);
        assert_eq!(
            Command::parse("List   Tools").unwrap(),
            Command::List(Category::Tool)
        );
        assert_eq!(
            Command::parse("list resources").unwrap(),
            Command::List(Category::Resource)
        );
        assert_eq!(
            Command::parse("list prompts").unwrap(),
            Command::List(Category::Prompt)
        );
        assert_eq!(Command::parse("   ").unwrap(), Command::Empty);
    }

    #[test]
    fn test_resource_uri() {
        assert_eq!(
            Command::parse("papers://diffusion_models").unwrap(),
            Command::ReadResource("papers://diffusion_models".to_string())
        );
        // Topic labels with spaces are read as-is
        assert_eq!(
            Command::parse("papers://diffusion models").unwrap(),
            Command::ReadResource("papers://diffusion models".to_string())
        );
        // Only a leading URI is a read
        assert!(matches!(
            Command::parse("what is papers://x?").unwrap(),
            Command::Query(_)
        ));
    }

    #[test]
    fn test_run_prompt() {
        assert_eq!(
            Command::parse("run prompt generate_search_prompt topic=transformers num_papers=5")
                .unwrap(),
            Command::RunPrompt {
                name: "generate_search_prompt".to_string(),
                args: vec![
                    ("topic".to_string(), "transformers".to_string()),
                    ("num_papers".to_string(), "5".to_string()),
                ],
            }
        );

        assert_eq!(
            Command::parse(r#"run prompt p topic="graph neural networks""#).unwrap(),
            Command::RunPrompt {
                name: "p".to_string(),
                args: vec![("topic".to_string(), "graph neural networks".to_string())],
            }
        );
    }

    #[test]
    fn test_run_prompt_errors() {
        assert!(matches!(
            Command::parse("run prompt").unwrap_err(),
            Error::SchemaValidation(_)
        ));
        assert!(matches!(
            Command::parse("run prompt p topic").unwrap_err(),
            Error::SchemaValidation(_)
        ));
        assert!(matches!(
            Command::parse(r#"run prompt p topic="open"#).unwrap_err(),
            Error::SchemaValidation(_)
        ));
    }

    #[test]
    fn test_free_text() {
        assert_eq!(
            Command::parse("find papers on diffusion models").unwrap(),
            Command::Query("find papers on diffusion models".to_string())
        );
        assert_eq!(
            Command::parse("quit now").unwrap(),
            Command::Query("quit now".to_string())
        );
    }
}
