//! Line-oriented pattern scan over flattened body text.
//!
//! Each line is checked against four independent patterns: a product after a
//! quantity label, a labeled amount, a labeled date, and a bulleted product.
//! A line may feed several candidate lists.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use crate::model::purchase::CandidateLists;

use super::date::normalize_date_on;

fn qty_product_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)Qty\s*:\s*\d+\s*(.+)").expect("invalid qty regex"))
}

fn amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(Total|Amount|Order Total|Charged|Price|Subtotal)\s*[:\-]?\s*[$€£¥]?([0-9,]+\.?[0-9]*)",
        )
        .expect("invalid amount regex")
    })
}

fn date_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(Order Date|Purchased on|Date|Order Placed)\s*[:\-]?\s*(.+)")
            .expect("invalid date label regex")
    })
}

/// Scan `text` line by line and collect candidates in document order.
///
/// `bullet_glyphs` are the line prefixes that mark a bulleted product;
/// `today` fills in missing date fields.
pub fn scan_lines(text: &str, bullet_glyphs: &[String], today: NaiveDate) -> CandidateLists {
    let mut found = CandidateLists::default();

    for raw in text.split('\n') {
        let line = raw.trim();

        if let Some(product) = product_near_quantity(line) {
            debug!(product = %product, "Found product name near 'Qty'");
            found.products.push(product);
        }

        if let Some(amount) = labeled_amount(line) {
            debug!(amount = %amount, "Found amount");
            found.amounts.push(amount);
        }

        if let Some(date) = labeled_date(line, today) {
            debug!(date = %date, "Found date");
            found.dates.push(date);
        }

        if let Some(product) = bulleted_product(line, bullet_glyphs) {
            debug!(product = %product, "Found product name in bullet point");
            found.products.push(product);
        }
    }

    found
}

/// `Qty : 2 Wireless Mouse` → `Wireless Mouse`, on lines that mention `Qty`
/// or carry an inline image tag.
fn product_near_quantity(line: &str) -> Option<String> {
    if !line.contains("<img") && !line.contains("Qty") {
        return None;
    }
    let caps = qty_product_re().captures(line)?;
    let product = caps.get(1)?.as_str().trim();
    (!product.is_empty()).then(|| product.to_string())
}

/// `Order Total: $1,234.56` → `1,234.56`.
fn labeled_amount(line: &str) -> Option<String> {
    let caps = amount_re().captures(line)?;
    Some(caps.get(2)?.as_str().to_string())
}

/// `Order Date: Jan 3` → `01/03`, only if the trailing text normalizes.
fn labeled_date(line: &str, today: NaiveDate) -> Option<String> {
    let caps = date_label_re().captures(line)?;
    normalize_date_on(caps.get(2)?.as_str().trim(), today)
}

/// `• Desk Lamp` → `Desk Lamp`.
fn bulleted_product(line: &str, bullet_glyphs: &[String]) -> Option<String> {
    bullet_glyphs
        .iter()
        .filter(|g| !g.is_empty())
        .find_map(|g| line.strip_prefix(g.as_str()))
        .map(str::trim)
        .filter(|rest| !rest.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractionConfig;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn scan(text: &str) -> CandidateLists {
        scan_lines(text, &ExtractionConfig::default().bullet_glyphs, today())
    }

    #[test]
    fn test_amount_with_separators_and_symbol() {
        assert_eq!(scan("Order Total: $1,234.56").amounts, vec!["1,234.56"]);
    }

    #[test]
    fn test_amount_without_colon() {
        assert_eq!(scan("Total $25").amounts, vec!["25"]);
    }

    #[test]
    fn test_amount_labels_are_case_insensitive() {
        let found = scan("SUBTOTAL - 10.00\ncharged: €7\nUnit price 3.5");
        assert_eq!(found.amounts, vec!["10.00", "7", "3.5"]);
    }

    #[test]
    fn test_product_after_quantity() {
        assert_eq!(scan("Qty : 2 Wireless Mouse").products, vec!["Wireless Mouse"]);
        assert_eq!(scan("Qty:1 USB-C Cable").products, vec!["USB-C Cable"]);
    }

    #[test]
    fn test_quantity_gate_is_case_sensitive() {
        // The line must mention "Qty" (or an image) before the pattern is tried.
        assert!(scan("qty : 2 Wireless Mouse").products.is_empty());
        assert_eq!(
            scan(r#"<img src="x.png"> qty: 3 Notebook"#).products,
            vec!["Notebook"]
        );
    }

    #[test]
    fn test_labeled_date() {
        assert_eq!(scan("Order Date: Jan 3").dates, vec!["01/03"]);
        assert_eq!(scan("Purchased on March 5, 2024").dates, vec!["03/05"]);
        assert!(scan("Date: to be confirmed").dates.is_empty());
    }

    #[test]
    fn test_bulleted_product() {
        let found = scan("  • Desk Lamp  \nâ€¢ Bulb\n•   \n- not a bullet");
        assert_eq!(found.products, vec!["Desk Lamp", "Bulb"]);
    }

    #[test]
    fn test_configured_bullets_replace_defaults() {
        let found = scan_lines("* Mug\n• Lamp", &["*".to_string()], today());
        assert_eq!(found.products, vec!["Mug"]);
    }

    #[test]
    fn test_one_line_can_feed_several_lists() {
        let found = scan("Qty: 1 Gift card Total: $20 Order Date: 03/04/2024");
        assert_eq!(found.products.len(), 1);
        assert_eq!(found.amounts, vec!["20"]);
        assert_eq!(found.dates, vec!["03/04"]);
    }

    #[test]
    fn test_document_order_is_preserved() {
        let text = "Order Total: $49.99\nQty : 1 Desk Lamp\nOrder Date: Jan 3\nQty : 2 Bulb\nTotal: $5\n";
        let found = scan(text);
        assert_eq!(found.products, vec!["Desk Lamp", "Bulb"]);
        assert_eq!(found.amounts, vec!["49.99", "5"]);
        assert_eq!(found.dates, vec!["01/03"]);
    }

    #[test]
    fn test_no_matches_leaves_lists_empty() {
        assert!(scan("Thanks for shopping with us!\n\n").is_empty());
    }
}
