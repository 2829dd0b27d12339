use sitesearch_core::query::{find_phrase, lookup_term, NoResultsReason, PhraseReport, TermReport};
use sitesearch_core::{build, InvertedIndex, Page};

fn index_of(pages: &[(&str, &str)]) -> InvertedIndex {
    let pages: Vec<Page> = pages
        .iter()
        .map(|(url, text)| Page { url: url.to_string(), text: text.to_string() })
        .collect();
    build(&pages)
}

fn matches(report: PhraseReport) -> (Vec<sitesearch_core::query::PhraseMatch>, Vec<sitesearch_core::query::PartialMatch>) {
    match report {
        PhraseReport::Matches { phrase_matches, partial_matches, .. } => (phrase_matches, partial_matches),
        other => panic!("expected matches, got {other:?}"),
    }
}

#[test]
fn lookup_orders_by_count_then_first_position() {
    let index = index_of(&[
        ("https://s.com/a", "x y love"),
        ("https://s.com/b", "love and love"),
        ("https://s.com/c", "love"),
    ]);
    let hits = lookup_term(&index, "LOVE").unwrap();
    let urls: Vec<&str> = hits.iter().map(|h| h.url.as_str()).collect();
    assert_eq!(urls, vec!["https://s.com/b", "https://s.com/c", "https://s.com/a"]);
    assert_eq!(hits[0].positions, vec![0, 2]);
}

#[test]
fn lookup_missing_term_has_no_entries() {
    let index = index_of(&[("https://s.com/a", "hello")]);
    assert!(lookup_term(&index, "absent").is_none());
    let text = TermReport { term: "absent", hits: None }.to_string();
    assert_eq!(text, "No entries for 'absent'.");
}

#[test]
fn stopword_only_query_has_no_results() {
    let index = index_of(&[("https://s.com/a", "the the the")]);
    assert_eq!(
        find_phrase(&index, "the"),
        PhraseReport::NoResults { phrase: "the".into(), reason: NoResultsReason::StopwordsOnly }
    );
    assert!(matches!(
        find_phrase(&index, "   "),
        PhraseReport::NoResults { reason: NoResultsReason::StopwordsOnly, .. }
    ));
}

#[test]
fn unknown_words_have_no_results() {
    let index = index_of(&[("https://s.com/a", "hello world")]);
    assert!(matches!(
        find_phrase(&index, "zebra crossing"),
        PhraseReport::NoResults { reason: NoResultsReason::NoMatches, .. }
    ));
}

#[test]
fn non_adjacent_words_are_partial_matches() {
    let index = index_of(&[("https://s.com/a", "a quick brown fox jumps")]);
    let (phrase, partial) = matches(find_phrase(&index, "quick fox"));
    assert!(phrase.is_empty());
    assert_eq!(partial.len(), 1);
    assert_eq!(partial[0].total_count, 2);
    assert_eq!(partial[0].earliest, 1);
    let words: Vec<(&str, Vec<usize>)> =
        partial[0].words.iter().map(|w| (w.word.as_str(), w.positions.clone())).collect();
    assert_eq!(words, vec![("quick", vec![1]), ("fox", vec![3])]);
}

#[test]
fn adjacent_words_are_one_phrase_occurrence() {
    let index = index_of(&[("https://s.com/a", "the quick fox ran")]);
    let (phrase, partial) = matches(find_phrase(&index, "quick fox"));
    assert_eq!(phrase.len(), 1);
    assert_eq!(phrase[0].starts, vec![1]);
    assert_eq!(phrase[0].occurrences(), 1);
    assert!(partial.is_empty());
}

#[test]
fn query_stopwords_are_invisible_to_alignment() {
    let index = index_of(&[
        ("https://s.com/adjacent", "cat dog"),
        ("https://s.com/literal", "cat and dog"),
    ]);
    let (phrase, partial) = matches(find_phrase(&index, "Cat AND dog"));
    assert_eq!(phrase.len(), 1);
    assert_eq!(phrase[0].url, "https://s.com/adjacent");
    assert_eq!(partial.len(), 1);
    assert_eq!(partial[0].url, "https://s.com/literal");
}

#[test]
fn phrase_matches_rank_before_partials_and_by_occurrences() {
    let index = index_of(&[
        ("https://s.com/one", "deep learning is deep"),
        ("https://s.com/two", "deep learning and deep learning"),
        ("https://s.com/partial", "learning deep"),
        ("https://s.com/late", "x x x x deep"),
    ]);
    let (phrase, partial) = matches(find_phrase(&index, "deep learning"));
    let phrase_urls: Vec<&str> = phrase.iter().map(|m| m.url.as_str()).collect();
    assert_eq!(phrase_urls, vec!["https://s.com/two", "https://s.com/one"]);
    assert_eq!(phrase[0].starts, vec![0, 3]);

    let partial_urls: Vec<&str> = partial.iter().map(|m| m.url.as_str()).collect();
    assert_eq!(partial_urls, vec!["https://s.com/partial", "https://s.com/late"]);
}

#[test]
fn phrase_ties_break_on_total_count_then_first_start() {
    let index = index_of(&[
        ("https://s.com/a", "x red car"),
        ("https://s.com/b", "red car red"),
        ("https://s.com/c", "red car"),
    ]);
    let (phrase, _) = matches(find_phrase(&index, "red car"));
    let urls: Vec<&str> = phrase.iter().map(|m| m.url.as_str()).collect();
    assert_eq!(urls, vec!["https://s.com/b", "https://s.com/c", "https://s.com/a"]);
}

#[test]
fn partial_ties_break_on_total_count() {
    let index = index_of(&[
        ("https://s.com/a", "sun"),
        ("https://s.com/b", "sun sun moon"),
    ]);
    let (phrase, partial) = matches(find_phrase(&index, "moon sun"));
    assert!(phrase.is_empty());
    let urls: Vec<&str> = partial.iter().map(|m| m.url.as_str()).collect();
    assert_eq!(urls, vec!["https://s.com/b", "https://s.com/a"]);
}

#[test]
fn three_word_phrase_requires_full_alignment() {
    let index = index_of(&[
        ("https://s.com/a", "new york city lights"),
        ("https://s.com/b", "new york is a city"),
    ]);
    let (phrase, partial) = matches(find_phrase(&index, "new york city"));
    assert_eq!(phrase.len(), 1);
    assert_eq!(phrase[0].url, "https://s.com/a");
    assert_eq!(partial.len(), 1);
    assert_eq!(partial[0].url, "https://s.com/b");
}

#[test]
fn report_renders_both_sections() {
    let index = index_of(&[
        ("https://s.com/a", "the quick fox ran"),
        ("https://s.com/b", "a quick brown fox"),
    ]);
    let text = find_phrase(&index, "quick fox").to_string();
    assert!(text.starts_with("Pages containing the phrase 'quick fox':"));
    assert!(text.contains("https://s.com/a (phrase occurrences: 1 at positions [1], total count: 2)"));
    assert!(text.contains("Pages containing individual words:"));
    assert!(text.contains("fox: 1 at positions [3]"));
}

#[test]
fn positions_near_usize_max_never_align() {
    let json = format!("{{\"xa\":{{\"u\":[{}]}},\"xb\":{{\"u\":[0]}}}}", usize::MAX);
    let index: InvertedIndex = serde_json::from_str(&json).unwrap();
    let (phrase, partial) = matches(find_phrase(&index, "xa xb"));
    assert!(phrase.is_empty());
    assert_eq!(partial.len(), 1);
    assert_eq!(partial[0].earliest, 0);
}
