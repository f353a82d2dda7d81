//! Price comparison against a configured reference price book.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::model::purchase::PurchaseRecord;

/// Reference prices keyed by exact product name.
#[derive(Debug, Clone, Default)]
pub struct PriceBook {
    prices: BTreeMap<String, f64>,
}

impl PriceBook {
    pub fn new(prices: BTreeMap<String, f64>) -> Self {
        Self { prices }
    }

    pub fn price_of(&self, product_name: &str) -> Option<f64> {
        self.prices.get(product_name).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// How the reference price relates to what was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceVerdict {
    /// The reference price is above the amount paid.
    Higher,
    /// The reference price is below the amount paid.
    Lower,
    Same,
    /// No reference price for this product.
    NoReference,
    /// The record carries no usable amount.
    NoAmount,
}

impl fmt::Display for PriceVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Higher => "higher",
            Self::Lower => "cheaper",
            Self::Same => "same",
            Self::NoReference => "no price data",
            Self::NoAmount => "no amount",
        };
        f.write_str(text)
    }
}

/// Result of checking one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceCheck {
    pub product_name: String,
    pub paid: Option<f64>,
    pub reference: Option<f64>,
    pub verdict: PriceVerdict,
}

/// Compare a record's amount with the book's reference price.
pub fn compare_record(book: &PriceBook, record: &PurchaseRecord) -> PriceCheck {
    let reference = book.price_of(&record.product_name);
    let paid = record.amount_value();

    let verdict = match (reference, paid) {
        (None, _) => PriceVerdict::NoReference,
        (Some(_), None) => PriceVerdict::NoAmount,
        (Some(r), Some(p)) if (r - p).abs() < 0.005 => PriceVerdict::Same,
        (Some(r), Some(p)) if r > p => PriceVerdict::Higher,
        (Some(_), Some(_)) => PriceVerdict::Lower,
    };

    PriceCheck {
        product_name: record.product_name.clone(),
        paid,
        reference,
        verdict,
    }
}
