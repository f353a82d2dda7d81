//! `orderscan` — pull purchase records out of order-confirmation emails.
//!
//! A message's MIME tree is flattened to text, scanned line by line for
//! labeled amounts, dates and product lines, and any field left empty is
//! filled from a pluggable entity recognizer. The result is at most one
//! [`model::purchase::PurchaseRecord`] per message.

pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod model;
pub mod parser;
pub mod pricing;
