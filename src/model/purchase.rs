//! Extraction output: candidate lists and the final purchase record.

use serde::{Deserialize, Serialize};

/// Product name used when nothing was identified. A record carrying it is dropped.
pub const UNKNOWN_PURCHASE: &str = "Unknown Purchase";

/// Tentative values for each field, in discovery order.
///
/// Lists are append-only during one extraction; the first element wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CandidateLists {
    pub products: Vec<String>,
    pub amounts: Vec<String>,
    pub dates: Vec<String>,
}

impl CandidateLists {
    pub fn first_product(&self) -> Option<&str> {
        self.products.first().map(String::as_str)
    }

    pub fn first_amount(&self) -> Option<&str> {
        self.amounts.first().map(String::as_str)
    }

    pub fn first_date(&self) -> Option<&str> {
        self.dates.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.amounts.is_empty() && self.dates.is_empty()
    }
}

/// One purchase recovered from one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    /// Identified product; never empty and never [`UNKNOWN_PURCHASE`].
    pub product_name: String,
    /// Amount as it appeared, thousands separators kept (`"1,234.56"`).
    pub amount: Option<String>,
    /// `MM/DD`.
    pub date: Option<String>,
}

impl PurchaseRecord {
    /// Assemble a record from the first candidate of each list.
    ///
    /// Returns `None` when no product was identified.
    pub fn from_candidates(candidates: &CandidateLists) -> Option<Self> {
        let product_name = candidates.first_product().unwrap_or(UNKNOWN_PURCHASE);
        if product_name == UNKNOWN_PURCHASE {
            return None;
        }
        Some(Self {
            product_name: product_name.to_string(),
            amount: candidates.first_amount().map(str::to_string),
            date: candidates.first_date().map(str::to_string),
        })
    }

    /// Amount as a number, with thousands separators removed.
    pub fn amount_value(&self) -> Option<f64> {
        self.amount
            .as_deref()
            .and_then(|a| a.replace(',', "").parse::<f64>().ok())
    }
}
