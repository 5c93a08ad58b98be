use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use research_assistant::chat;
use research_assistant::config::{find_config_file, load_config, Config, LlmConfig};
use research_assistant::llm::AzureOpenAi;
use research_assistant::mcp::{McpServer, Registry};
use research_assistant::models::Topic;
use research_assistant::research::{search_and_store, Research};
use research_assistant::sources::{ArxivSource, Source};
use research_assistant::store::MetadataStore;
use research_assistant::ui::{self, Spinner, Status};
use research_assistant::utils::HttpClient;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Research Assistant - chain arXiv search with a hosted LLM over MCP or an interactive chat
#[derive(Parser, Debug)]
#[command(name = "research-assistant")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search arXiv, store paper metadata and chat about it with a hosted LLM", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error logging
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Directory holding one folder per topic
    #[arg(long, global = true)]
    papers_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the interactive chat loop (default)
    Chat,

    /// Serve tools, resources and prompts over MCP (stdio)
    Serve,

    /// Search arXiv for a topic, store the results and print them
    #[command(alias = "s")]
    Search {
        /// Topic to search for
        topic: String,

        /// Maximum number of results
        #[arg(long, short = 'm')]
        max_results: Option<u32>,
    },

    /// Show stored paper ids grouped by topic
    Topics,
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("research_assistant={}", level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let path = cli.config.clone().or_else(find_config_file);
    if let Some(path) = &path {
        tracing::info!("Using config file: {}", path.display());
    }

    let mut config = load_config(path.as_deref()).context("Failed to load configuration")?;
    if let Some(timeout) = cli.timeout {
        anyhow::ensure!(timeout > 0, "--timeout must be at least 1 second");
        config.http.timeout_secs = timeout;
    }
    if let Some(dir) = &cli.papers_dir {
        config.papers_dir = dir.clone();
    }
    Ok(config)
}

/// Registry over arXiv, the papers directory and the configured model
fn build_registry(config: &Config, http: &HttpClient, source: Arc<dyn Source>) -> Result<Arc<Registry>> {
    let llm = LlmConfig::from_env().map_err(research_assistant::Error::from)?;
    tracing::debug!(?llm, "Model configuration");

    let store = MetadataStore::new(&config.papers_dir);
    store.ensure_root()?;

    let model = Arc::new(AzureOpenAi::new(http.clone(), llm));
    tracing::info!(deployment = model.deployment(), "Using Azure OpenAI");
    let research = Research::new(source, store, http.clone(), model)
        .with_default_max_results(config.search.default_max_results);

    Ok(Arc::new(Registry::new(Arc::new(research))))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;
    let http = HttpClient::with_timeout(config.http.timeout()).context("Failed to build HTTP client")?;
    let source: Arc<dyn Source> = Arc::new(ArxivSource::with_api_url(
        http.clone(),
        config.search.api_url.clone(),
    ));

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let registry = build_registry(&config, &http, source)?;
            let model = registry.research().model().clone();
            chat::run_interactive(registry, model, config.chat.clone()).await?;
        }

        Commands::Serve => {
            let registry = build_registry(&config, &http, source)?;
            let server = McpServer::new(registry)?;
            server.run().await?;
        }

        Commands::Search { topic, max_results } => {
            let topic = Topic::parse(&topic).map_err(research_assistant::Error::from)?;
            let max_results = max_results.unwrap_or(config.search.default_max_results);
            anyhow::ensure!(max_results > 0, "--max-results must be at least 1");

            let store = MetadataStore::new(&config.papers_dir);
            let spinner = Spinner::new(&format!(
                "Searching {} for \"{}\"...",
                source.name(),
                topic
            ));
            let papers = search_and_store(source.as_ref(), &store, &topic, max_results).await;
            spinner.finish();
            let papers = papers?;

            let color = ui::is_terminal();
            println!(
                "{}",
                ui::status_line(
                    Status::Search,
                    &format!(
                        "Found {} papers for \"{}\" on {}",
                        papers.len(),
                        topic,
                        source.name()
                    ),
                    color
                )
            );
            if !papers.is_empty() {
                println!("{}", ui::papers_table(&papers));
            }
            println!(
                "{}",
                ui::status_line(
                    Status::Success,
                    &format!("Saved to {}", store.root().join(topic.dir_name()).display()),
                    color
                )
            );
        }

        Commands::Topics => {
            let store = MetadataStore::new(&config.papers_dir);
            let index = store.index()?;
            if index.is_empty() {
                println!(
                    "{}",
                    ui::status_line(Status::Info, "No papers stored yet", ui::is_terminal())
                );
            } else {
                println!("{}", ui::topics_table(&index));
            }
        }
    }

    Ok(())
}
