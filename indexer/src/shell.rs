//! Interactive command loop: `build`, `load`, `print <word>`, `find <phrase>`, `exit`.

use crate::pipeline::{build_incremental, BuildOutcome};
use anyhow::Result;
use sitesearch_core::persist::{clear_index, load_index};
use sitesearch_core::query::{find_phrase, lookup_term, TermReport};
use sitesearch_core::InvertedIndex;
use sitesearch_crawler::{CrawlConfig, Fetcher};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tokio::runtime::Runtime;

const NOT_LOADED: &str = "Index not loaded. Use 'load' command first.";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Build,
    Load,
    Print(Option<String>),
    Find(Option<String>),
    Stats,
    Clear,
    Help,
    Exit,
    Invalid,
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, Some(rest.trim()).filter(|r| !r.is_empty())),
            None => (line, None),
        };
        let arg = rest.map(str::to_string);
        match (head.to_lowercase().as_str(), &arg) {
            ("build", None) => Command::Build,
            ("load", None) => Command::Load,
            ("print", _) => Command::Print(arg),
            ("find", _) => Command::Find(arg),
            ("stats", None) => Command::Stats,
            ("clear", None) => Command::Clear,
            ("help", None) => Command::Help,
            ("exit", None) => Command::Exit,
            _ => Command::Invalid,
        }
    }
}

pub fn print_usage<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "Available commands:")?;
    writeln!(out, "  build             - Crawl the site, index new pages and save the index.")?;
    writeln!(out, "  load              - Load the index from disk.")?;
    writeln!(out, "  print <word>      - Print the inverted index for a single word.")?;
    writeln!(out, "  find <phrase>     - Find pages containing the phrase.")?;
    writeln!(out, "  stats             - Show the size of the loaded index.")?;
    writeln!(out, "  clear             - Delete the index file and unload it.")?;
    writeln!(out, "  exit              - Exit the program.")
}

/// The single owner of the in-memory index for an interactive session.
pub struct Shell<F> {
    fetcher: F,
    crawl: CrawlConfig,
    index_path: PathBuf,
    runtime: Runtime,
    index: Option<InvertedIndex>,
}

impl<F: Fetcher> Shell<F> {
    pub fn new(fetcher: F, crawl: CrawlConfig, index_path: PathBuf) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        Ok(Self { fetcher, crawl, index_path, runtime, index: None })
    }

    #[cfg(test)]
    pub fn index(&self) -> Option<&InvertedIndex> { self.index.as_ref() }

    /// Read commands until `exit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> Result<()> {
        print_usage(&mut out)?;
        let mut lines = input.lines();
        loop {
            write!(out, "\nEnter a command: ")?;
            out.flush()?;
            let Some(line) = lines.next() else { break };
            let line = line?;
            if !self.execute(&line, &mut out)? {
                break;
            }
        }
        Ok(())
    }

    /// Run one command line. Returns `false` when the session should end.
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> Result<bool> {
        match Command::parse(line) {
            Command::Build => {
                writeln!(out, "Starting the build process...")?;
                let outcome = self.runtime.block_on(build_incremental(&self.fetcher, &self.crawl, &self.index_path));
                match outcome {
                    Ok(outcome) => {
                        match &outcome {
                            BuildOutcome::Unchanged { .. } => writeln!(out, "No new pages found. Index remains unchanged.")?,
                            BuildOutcome::Updated { new_pages, .. } => writeln!(out, "Indexed {new_pages} pages.")?,
                        }
                        self.index = Some(outcome.into_index());
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "build failed");
                        writeln!(out, "Build failed: {err:#}")?;
                    }
                }
            }
            Command::Load => match load_index(&self.index_path) {
                Ok((index, status)) => {
                    writeln!(out, "{status}")?;
                    self.index = Some(index);
                }
                Err(err) => writeln!(out, "Load failed: {err}")?,
            },
            Command::Print(word) => match (&self.index, word) {
                (None, _) => writeln!(out, "{NOT_LOADED}")?,
                (Some(_), None) => writeln!(out, "Usage: print <word>")?,
                (Some(_), Some(word)) if word.split_whitespace().count() > 1 => writeln!(
                    out,
                    "The 'print' command only supports single words, not phrases. Use 'find' for phrases."
                )?,
                (Some(index), Some(word)) => {
                    let hits = lookup_term(index, &word);
                    writeln!(out, "{}", TermReport { term: &word, hits: hits.as_deref() })?;
                }
            },
            Command::Find(phrase) => match (&self.index, phrase) {
                (None, _) => writeln!(out, "{NOT_LOADED}")?,
                (Some(_), None) => writeln!(out, "Usage: find <phrase>")?,
                (Some(index), Some(phrase)) => writeln!(out, "{}", find_phrase(index, &phrase))?,
            },
            Command::Stats => match &self.index {
                None => writeln!(out, "{NOT_LOADED}")?,
                Some(index) => writeln!(out, "{} terms across {} pages.", index.term_count(), index.url_count())?,
            },
            Command::Clear => match clear_index(&self.index_path) {
                Ok(()) => {
                    self.index = None;
                    writeln!(out, "Cleared the index file {}", self.index_path.display())?;
                }
                Err(err) => {
                    tracing::error!(error = %err, "clear failed");
                    writeln!(out, "Clear failed: {err}")?;
                }
            },
            Command::Help => print_usage(out)?,
            Command::Exit => {
                writeln!(out, "Exiting the program.")?;
                return Ok(false);
            }
            Command::Invalid => writeln!(out, "Invalid command.")?,
        }
        Ok(true)
    }
}
