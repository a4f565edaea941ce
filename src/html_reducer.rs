use scraper::Html;

/// Elements dropped together with everything beneath them.
pub const REMOVED_TAGS: &[&str] = &[
    "script", "style",
    "img", "audio", "video",
    "a",
    "h1", "h2", "h3", "h4", "h5", "h6",
    "footer", "nav",
];

/// Reduces an HTML document to its plausible main-content text.
///
/// Text nodes are trimmed, empty ones dropped, and the rest joined with
/// newlines. The html5ever parser recovers from any malformed markup, so
/// there is no failure path: garbage in yields whatever text it contained.
pub fn reduce(raw_html: &str) -> String {
    let document = Html::parse_document(raw_html);
    let mut pieces: Vec<&str> = Vec::new();

    for node in document.tree.root().descendants() {
        let text = match node.value().as_text() {
            Some(t) => t,
            None => continue,
        };

        let removed = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map_or(false, |el| REMOVED_TAGS.contains(&el.name()))
        });
        if removed {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            pieces.push(trimmed);
        }
    }

    pieces.join("\n")
}
