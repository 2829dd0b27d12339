use lazy_static::lazy_static;
use reqwest::Url;
use scraper::{Html, Node, Selector};

lazy_static! {
    static ref SEL_A: Selector = Selector::parse("a[href]").expect("valid selector");
}

const HIDDEN: &[&str] = &["script", "style", "noscript", "template"];

pub struct Extracted {
    pub text: String,
    pub links: Vec<Url>,
}

/// Collapse whitespace runs to single spaces and trim.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visible text and outgoing links of a document. Hrefs resolve against `base`.
pub fn extract(body: &str, base: &Url) -> Extracted {
    let doc = Html::parse_document(body);

    let mut parts: Vec<&str> = Vec::new();
    for node in doc.tree.root().descendants() {
        let Node::Text(text) = node.value() else { continue };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element())
            .is_some_and(|el| HIDDEN.contains(&el.name()));
        if !hidden {
            parts.push(&**text);
        }
    }
    let text = clean_text(&parts.join(" "));

    let links = doc
        .select(&SEL_A)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| base.join(href.trim()).ok())
        .collect();

    Extracted { text, links }
}
