use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Zero-based offset of a token within one page's token stream.
pub type Position = usize;

/// Positions of one term, keyed by normalized URL.
pub type Postings = BTreeMap<String, Vec<Position>>;

/// A fetched page ready for indexing. `url` is already normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub url: String,
    pub text: String,
}

/// Term -> normalized URL -> positions.
///
/// Serializes as the plain nested JSON object stored in the index file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvertedIndex {
    terms: BTreeMap<String, Postings>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    pub fn term_count(&self) -> usize { self.terms.len() }

    /// Number of distinct documents referenced by any term.
    pub fn url_count(&self) -> usize { self.urls().len() }

    /// Append one occurrence, creating the term and URL entries on first use.
    pub fn record(&mut self, term: &str, url: &str, position: Position) {
        self.terms
            .entry(term.to_string())
            .or_default()
            .entry(url.to_string())
            .or_default()
            .push(position);
    }

    pub fn postings(&self, term: &str) -> Option<&Postings> { self.terms.get(term) }

    pub fn positions(&self, term: &str, url: &str) -> Option<&[Position]> {
        self.terms.get(term)?.get(url).map(Vec::as_slice)
    }

    /// Every document key present in the index.
    pub fn urls(&self) -> BTreeSet<&str> {
        self.terms
            .values()
            .flat_map(|postings| postings.keys().map(String::as_str))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Postings)> {
        self.terms.iter().map(|(t, p)| (t.as_str(), p))
    }
}

/// Build an index from pages in a single forward pass over each token stream.
pub fn build<'a, I>(pages: I) -> InvertedIndex
where
    I: IntoIterator<Item = &'a Page>,
{
    let mut index = InvertedIndex::new();
    for page in pages {
        for (position, term) in tokenize(&page.text).iter().enumerate() {
            index.record(term, &page.url, position);
        }
    }
    tracing::info!(num_terms = index.term_count(), "built inverted index");
    index
}

/// Fold `incoming` into `existing`, concatenating position lists per (term, URL).
///
/// URL sets are expected to be disjoint; an overlapping URL gets its positions
/// appended, not replaced.
pub fn merge(mut existing: InvertedIndex, incoming: InvertedIndex) -> InvertedIndex {
    for (term, postings) in incoming.terms {
        let target = existing.terms.entry(term).or_default();
        for (url, positions) in postings {
            target.entry(url).or_default().extend(positions);
        }
    }
    existing
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str, text: &str) -> Page {
        Page { url: url.to_string(), text: text.to_string() }
    }

    #[test]
    fn positions_are_token_offsets() {
        let pages = vec![page("https://a.com/1", "The cat saw the other cat.")];
        let index = build(&pages);
        assert_eq!(index.positions("the", "https://a.com/1"), Some(&[0, 3][..]));
        assert_eq!(index.positions("cat", "https://a.com/1"), Some(&[1, 5][..]));
        assert_eq!(index.positions("saw", "https://a.com/1"), Some(&[2][..]));
        assert_eq!(index.term_count(), 4);
    }

    #[test]
    fn positions_restart_per_page() {
        let pages = vec![page("https://a.com/1", "one two"), page("https://a.com/2", "two one")];
        let index = build(&pages);
        assert_eq!(index.positions("one", "https://a.com/2"), Some(&[1][..]));
        assert_eq!(index.positions("two", "https://a.com/2"), Some(&[0][..]));
        assert_eq!(index.url_count(), 2);
    }

    #[test]
    fn build_is_deterministic() {
        let pages = vec![page("https://a.com/1", "b a c a"), page("https://a.com/2", "c c b")];
        assert_eq!(build(&pages), build(&pages));
    }

    #[test]
    fn merge_disjoint_keeps_both_sides() {
        let a = build(&[page("https://a.com/1", "red fish")]);
        let b = build(&[page("https://a.com/2", "blue fish fish")]);
        let merged = merge(a.clone(), b.clone());
        assert_eq!(merged.positions("fish", "https://a.com/1"), a.positions("fish", "https://a.com/1"));
        assert_eq!(merged.positions("fish", "https://a.com/2"), b.positions("fish", "https://a.com/2"));
        assert_eq!(merged.positions("red", "https://a.com/1"), Some(&[0][..]));
        assert_eq!(merged.positions("blue", "https://a.com/2"), Some(&[0][..]));
        assert_eq!(merged, merge(b, a));
    }

    #[test]
    fn merge_into_empty_is_identity() {
        let b = build(&[page("https://a.com/2", "blue fish")]);
        assert_eq!(merge(InvertedIndex::new(), b.clone()), b);
    }

    #[test]
    fn merge_appends_on_overlap() {
        let mut a = InvertedIndex::new();
        a.record("x", "u", 0);
        let mut b = InvertedIndex::new();
        b.record("x", "u", 4);
        assert_eq!(merge(a, b).positions("x", "u"), Some(&[0, 4][..]));
    }
}
