use criterion::{criterion_group, criterion_main, Criterion};
use sitesearch_core::query::find_phrase;
use sitesearch_core::tokenizer::tokenize;
use sitesearch_core::{build, Page};

const QUOTE: &str = "The world as we have created it is a process of our thinking. \
It cannot be changed without changing our thinking. It is our choices, Harry, \
that show what we truly are, far more than our abilities. ";

fn corpus() -> Vec<Page> {
    (0..200)
        .map(|i| Page { url: format!("https://quotes.toscrape.com/page/{i}"), text: QUOTE.repeat(1 + i % 5) })
        .collect()
}

fn bench_tokenize(c: &mut Criterion) {
    let text = QUOTE.repeat(50);
    c.bench_function("tokenize_quotes", |b| b.iter(|| tokenize(&text)));
}

fn bench_find_phrase(c: &mut Criterion) {
    let index = build(&corpus());
    c.bench_function("find_phrase_our_thinking", |b| b.iter(|| find_phrase(&index, "our thinking")));
}

criterion_group!(benches, bench_tokenize, bench_find_phrase);
criterion_main!(benches);
