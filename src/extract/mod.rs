//! Purchase extraction: body flattening, date normalization, line heuristics,
//! the entity-recognition fallback, and the coordinator tying them together.

pub mod coordinator;
pub mod date;
pub mod entities;
pub mod flatten;
pub mod heuristics;
pub mod markup;

pub use coordinator::Extractor;
pub use entities::{Entity, EntityLabel, EntityRecognizer, PatternRecognizer};
