//! Entity-recognition fallback.
//!
//! When the line heuristics find nothing for a field, the text is handed to an
//! [`EntityRecognizer`] and entities with the right label are folded into that
//! field's candidate list. The recognizer is a pluggable capability; the
//! built-in [`PatternRecognizer`] covers money, dates and capitalized
//! organization/product phrases without a language model.

use std::ops::Range;
use std::sync::{Arc, OnceLock};

use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use super::date::normalize_date_on;

/// Category of a recognized span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityLabel {
    Product,
    Organization,
    Money,
    Date,
    Person,
    Other(String),
}

/// One recognized span of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub label: EntityLabel,
    pub text: String,
}

impl Entity {
    pub fn new(label: EntityLabel, text: impl Into<String>) -> Self {
        Self {
            label,
            text: text.into(),
        }
    }
}

/// Named-entity recognition over plain text.
///
/// Implementations are shared read-only across messages and threads, so
/// `recognize` must not mutate model state.
pub trait EntityRecognizer: Send + Sync {
    /// Entities found in `text`, in the order the recognizer reports them.
    fn recognize(&self, text: &str) -> Vec<Entity>;
}

/// Product candidates from `subject + " " + body`: every product or
/// organization entity, in reported order.
pub fn fallback_products(
    recognizer: &dyn EntityRecognizer,
    subject: &str,
    body: &str,
    max_chars: usize,
    out: &mut Vec<String>,
) {
    let text = format!("{subject} {body}");
    for entity in recognizer.recognize(cap_chars(&text, max_chars)) {
        if matches!(entity.label, EntityLabel::Product | EntityLabel::Organization) {
            debug!(product = %entity.text, "Found product name via entity recognition");
            out.push(entity.text);
        }
    }
}

/// Amount candidates from `body`: money entities reduced to digits and `.`.
pub fn fallback_amounts(
    recognizer: &dyn EntityRecognizer,
    body: &str,
    max_chars: usize,
    out: &mut Vec<String>,
) {
    for entity in recognizer.recognize(cap_chars(body, max_chars)) {
        if entity.label != EntityLabel::Money {
            continue;
        }
        let amount: String = entity
            .text
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        if !amount.is_empty() {
            debug!(amount = %amount, "Found amount via entity recognition");
            out.push(amount);
        }
    }
}

/// Date candidates from `body`: date entities that normalize to `MM/DD`.
pub fn fallback_dates(
    recognizer: &dyn EntityRecognizer,
    body: &str,
    max_chars: usize,
    today: NaiveDate,
    out: &mut Vec<String>,
) {
    for entity in recognizer.recognize(cap_chars(body, max_chars)) {
        if entity.label != EntityLabel::Date {
            continue;
        }
        if let Some(date) = normalize_date_on(&entity.text, today) {
            debug!(date = %date, "Found date via entity recognition");
            out.push(date);
        }
    }
}

/// The first `max` characters of `text`.
fn cap_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ── Built-in recognizer ─────────────────────────────────────────

/// Sentence starters and receipt labels; never part of a name at either end.
const STOP_WORDS: &[&str] = &[
    "Thank", "Thanks", "Your", "You", "Dear", "Hi", "Hello", "Order", "Orders", "The", "This",
    "We", "Our", "Please", "Total", "Subtotal", "Amount", "Date", "Qty", "Charged", "Price",
    "Purchased",
];

const CORPORATE_SUFFIXES: &[&str] = &["Inc", "LLC", "Ltd", "Corp", "Co", "GmbH", "PLC"];

const MONTH_ALT: &str = "jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

/// Regex-driven recognizer for receipts.
///
/// Money: currency symbol or code next to a number. Date: month-name and
/// numeric date expressions. Runs of two or more capitalized words become
/// Product when one word mixes letters and digits (`Galaxy S24`), otherwise
/// Organization.
#[derive(Debug)]
pub struct PatternRecognizer {
    money: Regex,
    date: Regex,
    phrase: Regex,
}

impl PatternRecognizer {
    pub fn new() -> Self {
        let money = Regex::new(
            r"(?i)[$€£¥]\s?\d[\d,]*(?:\.\d+)?|\b(?:USD|EUR|GBP)\s?\d[\d,]*(?:\.\d+)?|\b\d[\d,]*(?:\.\d+)?\s?(?:USD|EUR|GBP|dollars?|euros?)\b",
        )
        .expect("invalid money regex");

        let date = Regex::new(&format!(
            r"(?i)\b(?:(?:{m})\.?\s+\d{{1,2}}(?:st|nd|rd|th)?(?:,?\s+\d{{4}})?|\d{{1,2}}(?:st|nd|rd|th)?\s+(?:of\s+)?(?:{m})\.?(?:,?\s+\d{{4}})?|\d{{4}}-\d{{2}}-\d{{2}}|\d{{1,2}}/\d{{1,2}}(?:/\d{{2,4}})?)\b",
            m = MONTH_ALT
        ))
        .expect("invalid date regex");

        let phrase = Regex::new(r"\b[A-Z][\w&'-]*(?:[ \t]+[A-Z0-9][\w&'-]*)+")
            .expect("invalid phrase regex");

        Self {
            money,
            date,
            phrase,
        }
    }

    /// Process-wide instance, built on first use and shared read-only after.
    pub fn shared() -> Arc<PatternRecognizer> {
        static SHARED: OnceLock<Arc<PatternRecognizer>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(Self::new())).clone()
    }
}

impl Default for PatternRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRecognizer for PatternRecognizer {
    fn recognize(&self, text: &str) -> Vec<Entity> {
        let mut spans: Vec<(usize, usize, EntityLabel)> = Vec::new();

        for m in self.money.find_iter(text) {
            spans.push((m.start(), m.end(), EntityLabel::Money));
        }
        for m in self.date.find_iter(text) {
            if !overlaps(&spans, m.start(), m.end()) {
                spans.push((m.start(), m.end(), EntityLabel::Date));
            }
        }

        let mut phrases = Vec::new();
        for m in self.phrase.find_iter(text) {
            let (start, mut end) = (m.start(), m.end());
            // Stop the phrase where a money or date span begins.
            if let Some(cut) = spans
                .iter()
                .filter(|(s, e, _)| *s < end && *e > start)
                .map(|(s, _, _)| *s)
                .min()
            {
                if cut <= start {
                    continue;
                }
                end = cut;
            }
            if let Some((kept, label)) = classify_phrase(&text[start..end]) {
                let surface_start = start + kept.start;
                let surface = text[surface_start..start + kept.end].trim_end_matches(['\'', '-']);
                phrases.push((surface_start, surface_start + surface.len(), label));
            }
        }
        spans.extend(phrases);

        spans.sort_by_key(|(start, _, _)| *start);
        spans
            .into_iter()
            .map(|(start, end, label)| Entity::new(label, &text[start..end]))
            .collect()
    }
}

fn overlaps(spans: &[(usize, usize, EntityLabel)], start: usize, end: usize) -> bool {
    spans.iter().any(|(s, e, _)| *s < end && *e > start)
}

/// Drop stop words from both ends and label what is left.
///
/// Returns the byte range of the kept words within `phrase`. Trimming the
/// tail matters when the phrase runs on into the next sentence, as in a
/// subject ending in `Apple` followed by a body starting with `Thank you`.
fn classify_phrase(phrase: &str) -> Option<(Range<usize>, EntityLabel)> {
    let mut words: Vec<(usize, &str)> = Vec::new();
    let mut offset = 0;
    for word in phrase.split_whitespace() {
        let at = offset + phrase[offset..].find(word)?;
        words.push((at, word));
        offset = at + word.len();
    }

    let first = words.iter().position(|(_, w)| !STOP_WORDS.contains(w))?;
    let last = words.iter().rposition(|(_, w)| !STOP_WORDS.contains(w))?;
    let kept = &words[first..=last];
    if kept.len() < 2 {
        return None;
    }

    let label = if CORPORATE_SUFFIXES.contains(&kept[kept.len() - 1].1) {
        EntityLabel::Organization
    } else if kept.iter().any(|(_, w)| is_model_token(w)) {
        EntityLabel::Product
    } else {
        EntityLabel::Organization
    };

    let (end_at, end_word) = kept[kept.len() - 1];
    Some((kept[0].0..end_at + end_word.len(), label))
}

/// `S24`, `256GB`, `M4`: letters and digits in one word.
fn is_model_token(word: &str) -> bool {
    word.chars().any(|c| c.is_ascii_digit()) && word.chars().any(char::is_alphabetic)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    struct Fixed(Vec<Entity>);

    impl EntityRecognizer for Fixed {
        fn recognize(&self, _text: &str) -> Vec<Entity> {
            self.0.clone()
        }
    }

    #[test]
    fn test_products_take_product_and_org_in_order() {
        let rec = Fixed(vec![
            Entity::new(EntityLabel::Organization, "Acme"),
            Entity::new(EntityLabel::Money, "$5"),
            Entity::new(EntityLabel::Product, "Widget Pro"),
            Entity::new(EntityLabel::Person, "Jane Doe"),
        ]);
        let mut out = Vec::new();
        fallback_products(&rec, "subject", "body", 1000, &mut out);
        assert_eq!(out, vec!["Acme", "Widget Pro"]);
    }

    #[test]
    fn test_amounts_keep_digits_and_point() {
        let rec = Fixed(vec![
            Entity::new(EntityLabel::Money, "$1,234.56"),
            Entity::new(EntityLabel::Money, "twenty dollars"),
            Entity::new(EntityLabel::Date, "Jan 3"),
        ]);
        let mut out = Vec::new();
        fallback_amounts(&rec, "body", 1000, &mut out);
        assert_eq!(out, vec!["1234.56"]);
    }

    #[test]
    fn test_dates_are_normalized_and_filtered() {
        let rec = Fixed(vec![
            Entity::new(EntityLabel::Date, "last week"),
            Entity::new(EntityLabel::Date, "March 5, 2024"),
            Entity::new(EntityLabel::Other("TIME".into()), "10:30"),
        ]);
        let mut out = Vec::new();
        fallback_dates(&rec, "body", 1000, today(), &mut out);
        assert_eq!(out, vec!["03/05"]);
    }

    #[test]
    fn test_cap_chars_respects_char_boundaries() {
        assert_eq!(cap_chars("héllo", 2), "hé");
        assert_eq!(cap_chars("abc", 10), "abc");
        assert_eq!(cap_chars("abc", 0), "");
    }

    #[test]
    fn test_pattern_recognizer_money_and_dates() {
        let rec = PatternRecognizer::new();
        let entities = rec.recognize("You paid $49.99 on March 5, 2024 and 12 USD later on 04/01.");
        let labels: Vec<(&EntityLabel, &str)> =
            entities.iter().map(|e| (&e.label, e.text.as_str())).collect();
        assert_eq!(
            labels,
            vec![
                (&EntityLabel::Money, "$49.99"),
                (&EntityLabel::Date, "March 5, 2024"),
                (&EntityLabel::Money, "12 USD"),
                (&EntityLabel::Date, "04/01"),
            ]
        );
    }

    #[test]
    fn test_pattern_recognizer_phrases() {
        let rec = PatternRecognizer::new();
        let entities = rec.recognize("Thank you for shopping at Best Buy. Your Galaxy S24 Ultra ships soon.");
        assert_eq!(
            entities,
            vec![
                Entity::new(EntityLabel::Organization, "Best Buy"),
                Entity::new(EntityLabel::Product, "Galaxy S24 Ultra"),
            ]
        );
    }

    #[test]
    fn test_phrase_stops_at_date() {
        let rec = PatternRecognizer::new();
        let entities = rec.recognize("Apple Store March 5");
        assert_eq!(
            entities,
            vec![
                Entity::new(EntityLabel::Organization, "Apple Store"),
                Entity::new(EntityLabel::Date, "March 5"),
            ]
        );
    }

    #[test]
    fn test_phrase_does_not_run_into_next_sentence() {
        let rec = PatternRecognizer::new();
        assert!(rec
            .recognize("Your receipt from Apple Thank you for shopping")
            .is_empty());

        let entities = rec.recognize("Your Galaxy S24 Ultra Order Date");
        assert_eq!(
            entities,
            vec![Entity::new(EntityLabel::Product, "Galaxy S24 Ultra")]
        );
    }

    #[test]
    fn test_product_fallback_across_subject_and_body() {
        let rec = PatternRecognizer::new();
        let mut out = Vec::new();
        fallback_products(
            &rec,
            "Your receipt from Apple",
            "Thank you for your order.\nAirPods Pro 2 Charged $249.00",
            1000,
            &mut out,
        );
        assert_eq!(out, vec!["AirPods Pro 2"]);
    }

    #[test]
    fn test_corporate_suffix_is_organization() {
        let rec = PatternRecognizer::new();
        let entities = rec.recognize("Billed by Acme Widgets LLC");
        assert_eq!(
            entities,
            vec![Entity::new(EntityLabel::Organization, "Acme Widgets LLC")]
        );
    }

    #[test]
    fn test_shared_instance_is_reused() {
        let a = PatternRecognizer::shared();
        let b = PatternRecognizer::shared();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
