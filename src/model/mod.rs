//! Core data model types: raw message trees and purchase records.

pub mod message;
pub mod purchase;
