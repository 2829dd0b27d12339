use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use sha1::{Digest, Sha1};
use sitesearch_core::persist::load_index;
use sitesearch_crawler::fetch::DEFAULT_USER_AGENT;
use sitesearch_crawler::{crawl, CrawlConfig, HttpFetcher};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "crawler")]
#[command(about = "Crawl one site breadth-first and dump its pages to JSONL")]
struct Cli {
    /// Seed URL; only links on its host are followed
    #[arg(long, default_value = "https://quotes.toscrape.com")]
    seed: String,
    /// Output JSONL file path
    #[arg(long, default_value = "./sample_data/crawl.jsonl")]
    output: String,
    /// Delay between fetches in milliseconds
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,
    /// Skip URLs already present in this index file
    #[arg(long)]
    existing_index: Option<String>,
    /// Stop after this many pages
    #[arg(long)]
    max_pages: Option<usize>,
    /// Request timeout seconds
    #[arg(long, default_value_t = 12)]
    timeout_secs: u64,
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,
}

#[derive(Serialize)]
struct OutDoc<'a> {
    id: String,
    url: &'a str,
    text: &'a str,
    timestamp: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_writer(std::io::stderr).with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();
    if let Some(dir) = std::path::Path::new(&args.output).parent() {
        fs::create_dir_all(dir).ok();
    }

    let existing: HashSet<String> = match &args.existing_index {
        Some(path) => {
            let (index, status) = load_index(path)?;
            tracing::info!(%status, urls = index.url_count(), "existing index");
            index.urls().into_iter().map(str::to_string).collect()
        }
        None => HashSet::new(),
    };

    let fetcher = HttpFetcher::new(&args.user_agent, Duration::from_secs(args.timeout_secs))?;
    let config = CrawlConfig::new(&args.seed)?
        .with_delay(Duration::from_millis(args.delay_ms))
        .with_max_pages(args.max_pages);

    let pages = crawl(&fetcher, &config, &existing).await;

    let mut out = BufWriter::new(File::create(&args.output)?);
    for page in &pages {
        let mut hasher = Sha1::new();
        hasher.update(page.url.as_bytes());
        let id = format!("{:x}", hasher.finalize());
        let timestamp = time::OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default();
        let rec = OutDoc { id, url: &page.url, text: &page.text, timestamp };
        serde_json::to_writer(&mut out, &rec)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    tracing::info!(emitted = pages.len(), output = %args.output, "done");
    Ok(())
}
