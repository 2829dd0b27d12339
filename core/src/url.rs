use ::url::Url;

/// Canonical document key for a URL: `scheme://host[:port]path`.
///
/// The fragment and query are dropped and trailing slashes are removed, so
/// `https://a.com/x/`, `https://a.com/x#top` and `https://a.com/x?p=1` all map
/// to `https://a.com/x`. Strings that are not hierarchical URLs keep their raw
/// form minus fragment and query. The function is idempotent.
pub fn normalize(raw: &str) -> String {
    let without_fragment = raw.split_once('#').map_or(raw, |(head, _)| head);
    let mut key = match Url::parse(without_fragment) {
        Ok(url) if !url.cannot_be_a_base() && url.has_host() => {
            let host = url.host_str().unwrap_or_default();
            match url.port() {
                Some(port) => format!("{}://{}:{}{}", url.scheme(), host, port, url.path()),
                None => format!("{}://{}{}", url.scheme(), host, url.path()),
            }
        }
        _ => without_fragment
            .split_once('?')
            .map_or(without_fragment, |(head, _)| head)
            .to_string(),
    };
    while key.ends_with('/') {
        key.pop();
    }
    key
}
