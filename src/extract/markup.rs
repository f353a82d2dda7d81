//! HTML-to-text conversion for HTML body parts.

use scraper::Html;

/// Convert an HTML fragment to its text content.
///
/// Every text node is concatenated in document order, exactly as the parser
/// exposes it: no separators are inserted between elements and whitespace is
/// left as written. html5ever recovers from any malformed input, so this
/// never fails.
pub fn strip_markup(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment.root_element().text().collect()
}
