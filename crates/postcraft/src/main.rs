//! Research a topic and turn it into a LinkedIn post, interactively.
//!
//! Reads `PERPLEXITY_API_KEY` and `ANTHROPIC_API_KEY` from the environment
//! (a `.env` file in the working directory is loaded first, if present).
//!
//! # Examples
//!
//! ```sh
//! # Fully interactive
//! postcraft
//!
//! # Single-shot research and a different generation model
//! postcraft --no-stream --generation-model claude-3-5-haiku-20241022
//!
//! # Show request timings on stderr
//! postcraft -vv
//! ```

use clap::Parser;
use postcraft::config::{DEFAULT_GENERATION_MODEL, DEFAULT_MAX_TOKENS, DEFAULT_RESEARCH_MODEL};
use postcraft::{
    ClaudeFormatter, Credentials, PerplexityResearcher, ServiceConfig, Session, StdConsole,
};
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Research a topic and turn it into a LinkedIn post, interactively.
#[derive(Parser)]
#[command(name = "postcraft", version)]
struct Cli {
    /// Research model
    #[arg(long, default_value = DEFAULT_RESEARCH_MODEL)]
    research_model: String,

    /// Generation model
    #[arg(long, default_value = DEFAULT_GENERATION_MODEL)]
    generation_model: String,

    /// Maximum tokens for each generated post
    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    /// Fetch research in a single response instead of a stream
    #[arg(long)]
    no_stream: bool,

    /// Research service base URL
    #[arg(long)]
    research_url: Option<String>,

    /// Generation service endpoint
    #[arg(long)]
    generation_url: Option<String>,

    /// Increase log verbosity on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn service_config(&self) -> ServiceConfig {
        let mut config = ServiceConfig::default()
            .with_research_model(&self.research_model)
            .with_generation_model(&self.generation_model)
            .with_max_tokens(self.max_tokens)
            .with_stream(!self.no_stream);
        if let Some(url) = &self.research_url {
            config = config.with_research_url(url);
        }
        if let Some(url) = &self.generation_url {
            config = config.with_generation_url(url);
        }
        config
    }
}

/// Run `load_env` first, then build the log filter, so a `RUST_LOG` set by
/// the loaded file takes effect.
fn filter_after_env<T>(verbose: u8, load_env: impl FnOnce() -> T) -> (EnvFilter, T) {
    let loaded = load_env();
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    (filter, loaded)
}

fn init_tracing(filter: EnvFilter) {
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: &Cli) -> postcraft::Result<String> {
    let credentials = Credentials::from_env()?;
    let config = cli.service_config();
    debug!(?config, "Service configuration");

    let researcher = PerplexityResearcher::new(&credentials.research_key, &config)?;
    let formatter = ClaudeFormatter::new(&credentials.generation_key, &config)?;

    println!("\n=== LinkedIn Post Generator with Feedback ===\n");
    println!("This tool will help you create a LinkedIn post and refine it with your feedback.");

    Session::new(&researcher, &formatter, StdConsole)
        .with_stream(config.stream)
        .run()
        .await
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let (filter, dotenv) = filter_after_env(cli.verbose, dotenvy::dotenv);
    init_tracing(filter);
    match dotenv {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env loaded: {e}"),
    }

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {e}");
        process::exit(e.exit_code());
    }
}
