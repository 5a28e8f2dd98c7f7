//! PDF Comparison Library
//!
//! Tolerant equality checks for generated PDF documents. A line-oriented
//! structural comparison skips environment specific metadata; when it fails,
//! the rendered pages of both documents are compared instead.

pub mod core;
pub mod scanner;
pub mod reporting;

pub use crate::core::comparator;
pub use crate::scanner::pair_scanner;
pub use crate::reporting::report_writer;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::core::comparator::{Comparator, Verdict};
    pub use crate::core::error::{CompareError, Result};
    pub use crate::core::policy::IgnorePolicy;
    pub use crate::core::size::{are_contents_similar_size, are_contents_similar_size_from_readers};
    pub use crate::core::structural::{are_contents_equal, are_contents_equal_with, are_contents_equal_with_policy};
    pub use crate::core::visual::{DocumentBackend, EncodeFailure, PageSource};
    #[cfg(feature = "rendering")]
    pub use crate::core::comparator::{are_equal, are_images_same};
    #[cfg(feature = "rendering")]
    pub use crate::core::pdfium_backend::PdfiumBackend;
    pub use crate::scanner::pair_scanner::{collect_document_pairs, ComparisonOutcome, ComparisonResult, DocumentPair};
    pub use crate::reporting::report_writer::{write_json_report, write_report};
}
