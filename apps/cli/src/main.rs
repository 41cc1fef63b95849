use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use docs_lookup_core::{bootstrap, tools::get_docs_definition, LibraryCatalog, LookupConfig};
use indicatif::ProgressBar;
use output::{OutputFormat, Renderer};
use progress::spinner;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "docs-lookup",
    version,
    about = "Search a library's documentation site and print the text of the top pages."
)]
struct Cli {
    /// Preferred renderer for command output.
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,
    /// TOML file layered between built-in defaults and DOCS_LOOKUP_* variables.
    #[arg(long, global = true, env = "DOCS_LOOKUP_CONFIG")]
    config: Option<PathBuf>,
    /// Disable ANSI colors in log output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Only log warnings and errors.
    #[arg(long, global = true)]
    quiet: bool,
    /// Disable progress indicators for long-running tasks.
    #[arg(long, global = true)]
    no_progress: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand, Clone)]
enum Command {
    /// Look up documentation for a library.
    Get {
        /// Library identifier (see `libraries`).
        library: String,
        /// Free-text query; multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// List supported libraries and their documentation sites.
    Libraries,
    /// Print the `get_docs` tool definition.
    Schema,
    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    fn progress_enabled(&self) -> bool {
        !self.quiet && !self.no_progress
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;
    let renderer = Renderer::new(cli.format);

    match &cli.command {
        Command::Get { library, query } => {
            let query = query.join(" ");
            handle_get(&cli, &renderer, library, &query).await
        }
        Command::Libraries => renderer.libraries(&LibraryCatalog::default()),
        Command::Schema => {
            let (definition, _) = get_docs_definition(&LibraryCatalog::default());
            renderer.tool_definition(&definition)
        }
        Command::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(*shell, &mut command, "docs-lookup", &mut std::io::stdout());
            Ok(())
        }
    }
}

async fn handle_get(cli: &Cli, renderer: &Renderer, library: &str, query: &str) -> Result<()> {
    let config =
        LookupConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    let context = bootstrap(&config)?;

    info!(target: "docs_lookup_cli", library, query, "looking up documentation");
    let spinner = spinner(
        cli.progress_enabled(),
        format!("Searching {library} docs for `{query}`..."),
    );
    match context.lookup.lookup(query, library).await {
        Ok(report) => {
            finish_spinner(
                spinner,
                Some(format!("Fetched {} page(s)", report.pages.len())),
            );
            renderer.report(&report)
        }
        Err(error) => {
            finish_spinner(spinner, None);
            Err(anyhow::Error::new(error).context(format!("lookup for `{library}` failed")))
        }
    }
}

fn init_tracing(cli: &Cli) -> Result<()> {
    let default_directive = if cli.quiet {
        "warn"
    } else {
        "info,docs_lookup_cli=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .without_time()
        .with_ansi(!cli.no_color)
        .compact()
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow!("failed to initialize logging: {error}"))
}

fn finish_spinner(spinner: Option<ProgressBar>, message: Option<String>) {
    if let Some(progress) = spinner {
        if let Some(msg) = message {
            progress.finish_with_message(msg);
        } else {
            progress.finish_and_clear();
        }
    }
}

mod output {
    use anyhow::Result;
    use clap::ValueEnum;
    use docs_lookup_core::{state::ToolDefinition, LibraryCatalog, LookupReport};
    use serde_json::{self, json};

    #[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
    pub enum OutputFormat {
        Json,
        Markdown,
        Text,
    }

    #[derive(Copy, Clone, Debug)]
    pub struct Renderer {
        format: OutputFormat,
    }

    impl Renderer {
        pub fn new(format: OutputFormat) -> Self {
            Self { format }
        }

        pub fn report(&self, report: &LookupReport) -> Result<()> {
            match self.format {
                OutputFormat::Json => {
                    let mut payload = serde_json::to_value(report)?;
                    payload["text"] = json!(report.text());
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                }
                OutputFormat::Markdown => {
                    println!("# {}", report.scoped_query);
                    println!();
                    if report.is_empty() {
                        println!("{}", report.text());
                        return Ok(());
                    }
                    println!("## Sources");
                    println!();
                    for page in &report.pages {
                        let label = page.title.as_deref().unwrap_or(page.url.as_str());
                        let note = if page.timed_out { " (timed out)" } else { "" };
                        println!("- [{}]({}){note}", sanitize(label), page.url);
                    }
                    for page in &report.pages {
                        println!();
                        println!("## {}", page.url);
                        println!();
                        println!("{}", page.text.trim());
                    }
                }
                OutputFormat::Text => {
                    println!("{}", report.text());
                }
            }
            Ok(())
        }

        pub fn libraries(&self, catalog: &LibraryCatalog) -> Result<()> {
            match self.format {
                OutputFormat::Json => {
                    let payload: serde_json::Map<String, serde_json::Value> = catalog
                        .entries()
                        .map(|(library, site)| (library.to_string(), json!(site)))
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                }
                OutputFormat::Markdown => {
                    println!("| Library | Documentation site |");
                    println!("| --- | --- |");
                    for (library, site) in catalog.entries() {
                        println!("| `{library}` | {site} |");
                    }
                }
                OutputFormat::Text => {
                    for (library, site) in catalog.entries() {
                        println!("• {library} — {site}");
                    }
                }
            }
            Ok(())
        }

        pub fn tool_definition(&self, definition: &ToolDefinition) -> Result<()> {
            match self.format {
                OutputFormat::Json | OutputFormat::Text => {
                    println!("{}", serde_json::to_string_pretty(definition)?);
                }
                OutputFormat::Markdown => {
                    println!("# `{}`", definition.name);
                    println!();
                    println!("{}", sanitize(&definition.description));
                    println!();
                    println!("```json");
                    println!("{}", serde_json::to_string_pretty(&definition.input_schema)?);
                    println!("```");
                }
            }
            Ok(())
        }
    }

    pub(crate) fn sanitize(value: &str) -> String {
        value
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

mod progress {
    use std::time::Duration;

    use indicatif::{ProgressBar, ProgressStyle};

    pub fn spinner(message_enabled: bool, message: impl Into<String>) -> Option<ProgressBar> {
        if !message_enabled {
            return None;
        }
        let progress = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        progress.set_style(style);
        progress.set_message(message.into());
        progress.enable_steady_tick(Duration::from_millis(80));
        Some(progress)
    }
}
