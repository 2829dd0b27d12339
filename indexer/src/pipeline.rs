use anyhow::Result;
use sitesearch_core::persist::{load_index, save_index};
use sitesearch_core::url::normalize;
use sitesearch_core::{build, merge, InvertedIndex, LoadStatus, Page};
use sitesearch_crawler::{crawl, CrawlConfig, Fetcher};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub enum BuildOutcome {
    /// Nothing new was found; the file on disk was left untouched.
    Unchanged { index: InvertedIndex, status: LoadStatus },
    Updated { index: InvertedIndex, status: LoadStatus, new_pages: usize },
}

impl BuildOutcome {
    pub fn into_index(self) -> InvertedIndex {
        match self {
            BuildOutcome::Unchanged { index, .. } | BuildOutcome::Updated { index, .. } => index,
        }
    }
}

/// Crawl for URLs not yet indexed, merge them into the index at `index_path` and save it.
pub async fn build_incremental<F>(fetcher: &F, config: &CrawlConfig, index_path: &Path) -> Result<BuildOutcome>
where
    F: Fetcher + ?Sized,
{
    let (existing, status) = load_index(index_path)?;
    let existing_urls: HashSet<String> = existing.urls().into_iter().map(str::to_string).collect();
    tracing::info!(%status, known_urls = existing_urls.len(), seed = %config.start_url, "starting build");

    let pages = crawl(fetcher, config, &existing_urls).await;
    merge_and_save(existing, status, &pages, index_path)
}

/// Index pages from crawler JSONL dumps, skipping URLs the index already holds.
pub fn ingest(input: &Path, index_path: &Path) -> Result<BuildOutcome> {
    let (existing, status) = load_index(index_path)?;
    let known: HashSet<String> = existing.urls().into_iter().map(str::to_string).collect();

    let mut seen = HashSet::new();
    let mut pages = Vec::new();
    for file in input_files(input) {
        for page in read_pages(&file)? {
            let url = normalize(&page.url);
            if known.contains(&url) || !seen.insert(url.clone()) {
                continue;
            }
            pages.push(Page { url, text: page.text });
        }
    }
    merge_and_save(existing, status, &pages, index_path)
}

fn merge_and_save(existing: InvertedIndex, status: LoadStatus, pages: &[Page], index_path: &Path) -> Result<BuildOutcome> {
    if pages.is_empty() {
        return Ok(BuildOutcome::Unchanged { index: existing, status });
    }
    let index = merge(existing, build(pages));
    save_index(&index, index_path)?;
    Ok(BuildOutcome::Updated { index, status, new_pages: pages.len() })
}

fn input_files(input: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("jsonl") {
                files.push(p.to_path_buf());
            }
        }
        files.sort();
    } else if input.is_file() {
        files.push(input.to_path_buf());
    }
    files
}

fn read_pages(file: &Path) -> Result<Vec<Page>> {
    let reader = BufReader::new(File::open(file)?);
    let mut pages = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        pages.push(serde_json::from_str(&line)?);
    }
    Ok(pages)
}
