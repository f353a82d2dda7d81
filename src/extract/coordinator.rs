//! Heuristic-then-fallback extraction of one purchase per message.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::config::ExtractionConfig;
use crate::model::message::RawMessage;
use crate::model::purchase::{CandidateLists, PurchaseRecord};

use super::entities::{
    fallback_amounts, fallback_dates, fallback_products, EntityRecognizer, PatternRecognizer,
};
use super::flatten::flatten_body;
use super::heuristics::scan_lines;

/// Turns raw messages into purchase records.
///
/// Holds only read-only state, so one extractor can serve any number of
/// messages (and threads). Extracting the same message twice gives the same
/// result.
#[derive(Clone)]
pub struct Extractor {
    config: ExtractionConfig,
    recognizer: Arc<dyn EntityRecognizer>,
    reference_date: Option<NaiveDate>,
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("config", &self.config)
            .field("reference_date", &self.reference_date)
            .finish_non_exhaustive()
    }
}

impl Extractor {
    pub fn new(config: ExtractionConfig, recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self {
            config,
            recognizer,
            reference_date: None,
        }
    }

    /// Extractor backed by the shared [`PatternRecognizer`].
    pub fn with_pattern_recognizer(config: ExtractionConfig) -> Self {
        Self::new(config, PatternRecognizer::shared())
    }

    /// Fill missing date fields from `date` instead of today.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// Extract the purchase described by `message`.
    ///
    /// Returns `None` when no product could be identified, even if an amount
    /// or date was found.
    pub fn extract(&self, message: &RawMessage) -> Option<PurchaseRecord> {
        let candidates = self.candidates(message);
        let record = PurchaseRecord::from_candidates(&candidates);
        match &record {
            Some(r) => info!(
                id = message.id.as_deref().unwrap_or(""),
                product = %r.product_name,
                amount = r.amount.as_deref().unwrap_or(""),
                date = r.date.as_deref().unwrap_or(""),
                "Extracted purchase"
            ),
            None => debug!(
                id = message.id.as_deref().unwrap_or(""),
                "No purchase found"
            ),
        }
        record
    }

    /// All candidates for `message`: heuristics first, then the entity
    /// fallback for every field the heuristics left empty.
    pub fn candidates(&self, message: &RawMessage) -> CandidateLists {
        let today = self
            .reference_date
            .unwrap_or_else(|| Local::now().date_naive());
        let subject = message.subject();
        let body = flatten_body(&message.payload, self.config.max_part_depth);

        debug!(
            id = message.id.as_deref().unwrap_or(""),
            subject,
            snippet = %message.snippet,
            body_chars = body.len(),
            "Scanning message"
        );

        let mut found = scan_lines(&body, &self.config.bullet_glyphs, today);
        let recognizer = self.recognizer.as_ref();
        let max_chars = self.config.max_recognizer_chars;

        if found.products.is_empty() {
            fallback_products(recognizer, subject, &body, max_chars, &mut found.products);
        }
        if found.amounts.is_empty() {
            fallback_amounts(recognizer, &body, max_chars, &mut found.amounts);
        }
        if found.dates.is_empty() {
            fallback_dates(recognizer, &body, max_chars, today, &mut found.dates);
        }

        found
    }
}
