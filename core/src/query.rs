//! Read-only lookups over a loaded [`InvertedIndex`].
//!
//! Two entry points: [`lookup_term`] for a single word and [`find_phrase`] for
//! multi-word queries with literal phrase detection. Stopwords are removed from
//! phrase queries before alignment, so `cat and dog` only matches pages where
//! `cat` is immediately followed by `dog`.

use crate::index::Position;
use crate::tokenizer::is_stopword;
use crate::InvertedIndex;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermHit {
    pub url: String,
    pub positions: Vec<Position>,
}

/// All pages containing `term`, most occurrences first.
///
/// Returns `None` when the term is not in the index.
pub fn lookup_term(index: &InvertedIndex, term: &str) -> Option<Vec<TermHit>> {
    let term = term.to_lowercase();
    let postings = index.postings(&term)?;
    let mut hits: Vec<TermHit> = postings
        .iter()
        .map(|(url, positions)| TermHit { url: url.clone(), positions: positions.clone() })
        .collect();
    hits.sort_by(|a, b| {
        b.positions
            .len()
            .cmp(&a.positions.len())
            .then_with(|| cmp_first(&a.positions, &b.positions))
            .then_with(|| a.url.cmp(&b.url))
    });
    Some(hits)
}

/// Per-word hits of one query word on one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordHits {
    pub word: String,
    pub positions: Vec<Position>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhraseMatch {
    pub url: String,
    /// Start offsets of every aligned occurrence of the phrase.
    pub starts: Vec<Position>,
    pub total_count: usize,
    pub words: Vec<WordHits>,
}

impl PhraseMatch {
    pub fn occurrences(&self) -> usize { self.starts.len() }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialMatch {
    pub url: String,
    pub total_count: usize,
    pub earliest: Position,
    pub words: Vec<WordHits>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoResultsReason {
    /// Every query word is a stopword (or the query is empty).
    StopwordsOnly,
    /// No query word occurs in the index.
    NoMatches,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhraseReport {
    NoResults { phrase: String, reason: NoResultsReason },
    Matches {
        words: Vec<String>,
        phrase_matches: Vec<PhraseMatch>,
        partial_matches: Vec<PartialMatch>,
    },
}

/// Positions of each query word (by query slot) on one page.
struct Candidate<'a> {
    slots: Vec<Option<&'a [Position]>>,
    total_count: usize,
}

impl<'a> Candidate<'a> {
    fn word_hits(&self, words: &[String]) -> Vec<WordHits> {
        let mut seen = HashSet::new();
        words
            .iter()
            .zip(&self.slots)
            .filter_map(|(word, slot)| {
                let positions = (*slot)?;
                seen.insert(word.as_str()).then(|| WordHits { word: word.clone(), positions: positions.to_vec() })
            })
            .collect()
    }

    fn earliest(&self) -> Position {
        self.slots
            .iter()
            .flatten()
            .filter_map(|p| p.iter().min().copied())
            .min()
            .unwrap_or(Position::MAX)
    }

    /// Start offsets `p` where slot `i` has an occurrence at `p + i` for every `i`.
    fn aligned_starts(&self) -> Vec<Position> {
        let slots: Option<Vec<&[Position]>> = self.slots.iter().copied().collect();
        let Some(slots) = slots else { return Vec::new() };
        let (first, rest) = match slots.split_first() {
            Some(split) => split,
            None => return Vec::new(),
        };
        let rest: Vec<HashSet<Position>> = rest.iter().map(|p| p.iter().copied().collect()).collect();
        let mut starts: Vec<Position> = first
            .iter()
            .copied()
            .filter(|&p| rest.iter().enumerate().all(|(i, set)| p.checked_add(i + 1).is_some_and(|q| set.contains(&q))))
            .collect();
        starts.sort_unstable();
        starts.dedup();
        starts
    }
}

/// Rank pages for a whitespace-separated phrase.
pub fn find_phrase(index: &InvertedIndex, phrase: &str) -> PhraseReport {
    let words: Vec<String> = phrase.split_whitespace().map(str::to_lowercase).collect();
    if words.iter().all(|w| is_stopword(w)) {
        return PhraseReport::NoResults { phrase: phrase.to_string(), reason: NoResultsReason::StopwordsOnly };
    }
    let valid: Vec<String> = words.into_iter().filter(|w| !is_stopword(w)).collect();

    let mut candidates: BTreeMap<&str, Candidate<'_>> = BTreeMap::new();
    for (slot, word) in valid.iter().enumerate() {
        let Some(postings) = index.postings(word) else { continue };
        for (url, positions) in postings {
            let entry = candidates
                .entry(url.as_str())
                .or_insert_with(|| Candidate { slots: vec![None; valid.len()], total_count: 0 });
            entry.total_count += positions.len();
            entry.slots[slot] = Some(positions.as_slice());
        }
    }
    if candidates.is_empty() {
        return PhraseReport::NoResults { phrase: phrase.to_string(), reason: NoResultsReason::NoMatches };
    }

    let mut phrase_matches = Vec::new();
    let mut partial_matches = Vec::new();
    for (url, candidate) in &candidates {
        let starts = candidate.aligned_starts();
        if starts.is_empty() {
            partial_matches.push(PartialMatch {
                url: url.to_string(),
                total_count: candidate.total_count,
                earliest: candidate.earliest(),
                words: candidate.word_hits(&valid),
            });
        } else {
            phrase_matches.push(PhraseMatch {
                url: url.to_string(),
                starts,
                total_count: candidate.total_count,
                words: candidate.word_hits(&valid),
            });
        }
    }

    phrase_matches.sort_by(|a, b| {
        b.occurrences()
            .cmp(&a.occurrences())
            .then_with(|| b.total_count.cmp(&a.total_count))
            .then_with(|| cmp_first(&a.starts, &b.starts))
            .then_with(|| a.url.cmp(&b.url))
    });
    partial_matches.sort_by(|a, b| {
        a.earliest
            .cmp(&b.earliest)
            .then_with(|| b.total_count.cmp(&a.total_count))
            .then_with(|| a.url.cmp(&b.url))
    });

    PhraseReport::Matches { words: valid, phrase_matches, partial_matches }
}

fn cmp_first(a: &[Position], b: &[Position]) -> Ordering {
    let first = |p: &[Position]| p.first().copied().unwrap_or(Position::MAX);
    first(a).cmp(&first(b))
}

/// Formats the result of [`lookup_term`] for the command shell.
pub struct TermReport<'a> {
    pub term: &'a str,
    pub hits: Option<&'a [TermHit]>,
}

impl fmt::Display for TermReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let term = self.term.to_lowercase();
        match self.hits {
            None => write!(f, "No entries for '{term}'."),
            Some(hits) => {
                write!(f, "Inverted index for '{term}':")?;
                for hit in hits {
                    write!(f, "\n  - {} ({} occurrences at positions {:?})", hit.url, hit.positions.len(), hit.positions)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for PhraseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhraseReport::NoResults { phrase, reason: NoResultsReason::StopwordsOnly } => {
                write!(f, "No results: '{phrase}' contains only stop words.")
            }
            PhraseReport::NoResults { phrase, reason: NoResultsReason::NoMatches } => {
                write!(f, "No pages found containing '{phrase}'.")
            }
            PhraseReport::Matches { words, phrase_matches, partial_matches } => {
                let joined = words.join(" ");
                if phrase_matches.is_empty() {
                    write!(f, "No exact phrase matches for '{joined}'.")?;
                } else {
                    write!(f, "Pages containing the phrase '{joined}':")?;
                    for m in phrase_matches {
                        write!(
                            f,
                            "\n  - {} (phrase occurrences: {} at positions {:?}, total count: {})",
                            m.url,
                            m.occurrences(),
                            m.starts,
                            m.total_count
                        )?;
                    }
                }
                if !partial_matches.is_empty() {
                    write!(f, "\nPages containing individual words:")?;
                    for m in partial_matches {
                        write!(f, "\n  - {} (total count: {})", m.url, m.total_count)?;
                        for w in &m.words {
                            write!(f, "\n      {}: {} at positions {:?}", w.word, w.positions.len(), w.positions)?;
                        }
                    }
                }
                Ok(())
            }
        }
    }
}
