//! Research CLI - structured research notes from free text

use clap::{Parser, Subcommand};
use research_assistant::format::{format_artifact, format_history, format_json};
use research_assistant::store::default_store_path;
use research_assistant::{
    JsonFileStore, ModelClient, Pipeline, PipelineConfig, ResearchHistory, WithTimeout,
    gemini_from_env,
};
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "research")]
#[command(about = "Summarize, reference and organize research text", long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    log_verbosity: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Result store file [default: ~/.research/assistant/history.json]
    #[arg(long, global = true, value_name = "PATH")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a text: summary, references, category and tags
    Analyze {
        /// The text to analyze (use "-" to read from stdin)
        #[arg(value_name = "TEXT", conflicts_with = "file")]
        text: Option<String>,

        /// Read the text from a file
        #[arg(short, long, value_name = "PATH")]
        file: Option<PathBuf>,

        /// Print the artifact as JSON instead of terminal format
        #[arg(long)]
        json: bool,

        /// Do not save the result to the history
        #[arg(long)]
        no_save: bool,

        /// Model to use [default: $RESEARCH_MODEL or gemini-2.5-flash]
        #[arg(long, value_name = "NAME")]
        model: Option<String>,

        /// Maximum characters of text sent for analysis
        #[arg(long, value_name = "N", value_parser = positive_usize())]
        max_chars: Option<usize>,

        /// Characters of text sent as context for reference suggestions
        #[arg(long, value_name = "N", value_parser = positive_usize())]
        snippet_chars: Option<usize>,

        /// Per-request timeout in seconds
        #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
        timeout: Option<u64>,
    },

    /// List saved research
    List {
        /// Output as JSON instead of terminal format
        #[arg(long)]
        json: bool,
    },

    /// Show a saved research report
    Show {
        /// Artifact id or unique id prefix
        #[arg(value_name = "ID")]
        id: String,

        /// Output as JSON instead of terminal format
        #[arg(long)]
        json: bool,
    },

    /// Attach a note to saved research (replaces any existing note)
    Note {
        /// Artifact id or unique id prefix
        #[arg(value_name = "ID")]
        id: String,

        /// The note text
        #[arg(value_name = "NOTE")]
        note: String,
    },

    /// Delete saved research
    Delete {
        /// Artifact id or unique id prefix
        #[arg(value_name = "ID")]
        id: String,
    },
}

/// Parser for sizes that must be at least 1, matching `PipelineConfig::from_env`
fn positive_usize() -> clap::builder::RangedU64ValueParser<usize> {
    clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
}

/// Initialize tracing subscriber based on verbosity and output format
fn init_tracing(verbose: u8, json: bool) {
    // RUST_LOG wins over -v flags
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,research_assistant=info".to_string(),
            2 => "info,research_assistant=debug".to_string(),
            _ => "debug,research_assistant=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(false)
                    .with_file(verbose >= 3)
                    .with_line_number(verbose >= 3)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    }
}

fn read_input(text: Option<String>, file: Option<PathBuf>) -> io::Result<String> {
    if let Some(path) = file {
        return std::fs::read_to_string(path);
    }
    match text {
        Some(t) if t != "-" => Ok(t),
        _ => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

async fn run_analysis<C: ModelClient>(
    client: C,
    config: PipelineConfig,
    text: &str,
) -> Result<research_assistant::ResearchArtifact, research_assistant::PipelineError> {
    let pipeline = Pipeline::new(client, config);
    pipeline
        .run(text, |phase| {
            eprintln!("  [{}/4] {}", phase.step(), phase.description());
        })
        .await
}

#[allow(clippy::too_many_arguments)]
async fn analyze_command(
    store: JsonFileStore,
    text: Option<String>,
    file: Option<PathBuf>,
    json: bool,
    no_save: bool,
    model: Option<String>,
    max_chars: Option<usize>,
    snippet_chars: Option<usize>,
    timeout: Option<u64>,
) {
    let input = read_input(text, file).unwrap_or_else(|e| fail(format!("reading input: {}", e)));
    if input.trim().is_empty() {
        fail("No text provided");
    }

    let mut config = PipelineConfig::from_env().unwrap_or_else(|e| fail(e));
    if let Some(model) = model {
        config.model = model;
    }
    if let Some(n) = max_chars {
        config.max_analyzed_chars = n;
    }
    if let Some(n) = snippet_chars {
        config.context_snippet_chars = n;
    }
    if let Some(secs) = timeout {
        config.request_timeout = Some(Duration::from_secs(secs));
    }

    let client = gemini_from_env(&config.model).unwrap_or_else(|e| fail(e));

    eprintln!("Researching with {}...\n", config.model);
    let result = match config.request_timeout {
        Some(limit) => run_analysis(WithTimeout::new(client, limit), config, &input).await,
        None => run_analysis(client, config, &input).await,
    };

    let artifact = match result {
        Ok(artifact) => artifact,
        Err(e) => {
            tracing::error!(error = %e, "Research failed");
            fail(format!("Research failed: {}", e));
        }
    };

    if !no_save {
        let mut history = ResearchHistory::open(store);
        if let Err(e) = history.record(artifact.clone()) {
            eprintln!("⚠ Could not save result: {}", e);
        }
    }

    if json {
        println!("{}", format_json(&artifact).unwrap_or_else(|e| fail(e)));
    } else {
        println!("\n{}", format_artifact(&artifact));
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_verbosity, cli.log_json);

    tracing::info!("Research CLI starting");

    let store = JsonFileStore::new(cli.store.unwrap_or_else(default_store_path));

    match cli.command {
        Commands::Analyze {
            text,
            file,
            json,
            no_save,
            model,
            max_chars,
            snippet_chars,
            timeout,
        } => {
            analyze_command(
                store,
                text,
                file,
                json,
                no_save,
                model,
                max_chars,
                snippet_chars,
                timeout,
            )
            .await;
        }

        Commands::List { json } => {
            let history = ResearchHistory::open(store);
            if json {
                println!("{}", format_json(history.items()).unwrap_or_else(|e| fail(e)));
            } else if history.is_empty() {
                println!("No saved research yet. Use `research analyze` to create some.");
            } else {
                println!("{}", format_history(history.items()));
            }
        }

        Commands::Show { id, json } => {
            let history = ResearchHistory::open(store);
            let artifact = history.resolve(&id).unwrap_or_else(|e| fail(e));
            if json {
                println!("{}", format_json(artifact).unwrap_or_else(|e| fail(e)));
            } else {
                println!("{}", format_artifact(artifact));
            }
        }

        Commands::Note { id, note } => {
            let mut history = ResearchHistory::open(store);
            let full_id = history
                .resolve(&id)
                .map(|a| a.id.clone())
                .unwrap_or_else(|e| fail(e));
            match history.save_note(&full_id, note) {
                Ok(()) => println!("✓ Note saved on {}", full_id),
                Err(e) => fail(e),
            }
        }

        Commands::Delete { id } => {
            let mut history = ResearchHistory::open(store);
            let full_id = history
                .resolve(&id)
                .map(|a| a.id.clone())
                .unwrap_or_else(|e| fail(e));
            match history.delete(&full_id) {
                Ok(removed) => println!("✓ Deleted {} [{}]", removed.id, removed.category),
                Err(e) => fail(e),
            }
        }
    }
}
