//! Fixture scanning and per-pair comparison

pub mod pair_scanner;

pub use pair_scanner::{collect_document_pairs, compare_structurally, compare_visually, ComparisonOutcome, ComparisonResult, DocumentPair};
