mod pipeline;
mod shell;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use pipeline::{build_incremental, ingest, BuildOutcome};
use shell::Shell;
use sitesearch_core::persist::load_index;
use sitesearch_core::query::{find_phrase, lookup_term, TermReport};
use sitesearch_crawler::fetch::DEFAULT_USER_AGENT;
use sitesearch_crawler::{CrawlConfig, HttpFetcher};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Crawl a site into a positional inverted index and search it", long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct Settings {
    /// Index file path
    #[arg(long, global = true, default_value = "./index.json")]
    index: PathBuf,
    /// Site to crawl on `build`
    #[arg(long, global = true, default_value = "https://quotes.toscrape.com")]
    seed: String,
    /// Delay between fetches in milliseconds
    #[arg(long, global = true, default_value_t = 0)]
    delay_ms: u64,
    /// Request timeout seconds
    #[arg(long, global = true, default_value_t = 12)]
    timeout_secs: u64,
    #[arg(long, global = true, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive command loop (default)
    Shell,
    /// Crawl new pages, merge them into the index and save it
    Build,
    /// Index pages from crawler JSONL output (file or directory)
    Ingest {
        #[arg(long)]
        input: PathBuf,
    },
    /// Print the postings of a single word
    Print { word: String },
    /// Search for a phrase
    Find {
        #[arg(required = true, num_args = 1..)]
        phrase: Vec<String>,
    },
}

impl Settings {
    fn crawl_config(&self) -> Result<CrawlConfig> {
        Ok(CrawlConfig::new(&self.seed)?.with_delay(Duration::from_millis(self.delay_ms)))
    }

    fn fetcher(&self) -> Result<HttpFetcher> {
        Ok(HttpFetcher::new(&self.user_agent, Duration::from_secs(self.timeout_secs))?)
    }
}

fn main() -> Result<()> {
    fmt().with_writer(io::stderr).with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let settings = cli.settings;

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            let mut shell = Shell::new(settings.fetcher()?, settings.crawl_config()?, settings.index.clone())?;
            shell.run(io::stdin().lock(), io::stdout().lock())
        }
        Commands::Build => {
            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
            let fetcher = settings.fetcher()?;
            let outcome = runtime.block_on(build_incremental(&fetcher, &settings.crawl_config()?, &settings.index))?;
            report(outcome);
            Ok(())
        }
        Commands::Ingest { input } => {
            report(ingest(&input, &settings.index)?);
            Ok(())
        }
        Commands::Print { word } => {
            let (index, _) = load_index(&settings.index)?;
            let hits = lookup_term(&index, &word);
            println!("{}", TermReport { term: &word, hits: hits.as_deref() });
            Ok(())
        }
        Commands::Find { phrase } => {
            let (index, _) = load_index(&settings.index)?;
            println!("{}", find_phrase(&index, &phrase.join(" ")));
            Ok(())
        }
    }
}

fn report(outcome: BuildOutcome) {
    match outcome {
        BuildOutcome::Unchanged { status, .. } => {
            tracing::info!(%status, "index before build");
            println!("No new pages found. Index remains unchanged.");
        }
        BuildOutcome::Updated { new_pages, status, .. } => {
            tracing::info!(%status, "index before build");
            println!("Indexed {new_pages} pages.");
        }
    }
}
