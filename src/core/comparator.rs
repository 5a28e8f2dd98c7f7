//! Two-tier document equality: structural first, rendered pages as fallback

use std::io::Read;

use tracing::debug;

use super::error::Result;
use super::policy::IgnorePolicy;
use super::structural;
use super::visual::{self, DocumentBackend, EncodeFailure};

/// How a pair of documents was found equal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    StructurallyEqual,
    VisuallyEqual,
    Different,
}

impl Verdict {
    pub fn is_equal(self) -> bool {
        self != Verdict::Different
    }
}

/// Compares documents with an ignore policy and a rendering backend
///
/// Structural comparison is cheap and runs first. Only when it fails are both
/// documents loaded and rendered, so two documents are equal when either check
/// accepts them.
pub struct Comparator<B> {
    backend: B,
    policy: IgnorePolicy,
    on_encode_failure: EncodeFailure,
}

impl<B: DocumentBackend> Comparator<B> {
    /// Comparator using the default ignore policy
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            policy: IgnorePolicy::default(),
            on_encode_failure: EncodeFailure::default(),
        }
    }

    pub fn with_policy(mut self, policy: IgnorePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_encode_failure(mut self, on_encode_failure: EncodeFailure) -> Self {
        self.on_encode_failure = on_encode_failure;
        self
    }

    pub fn policy(&self) -> &IgnorePolicy {
        &self.policy
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Whether the documents are equal structurally or visually
    pub fn are_equal(&self, actual: &[u8], expected: &[u8]) -> Result<bool> {
        Ok(self.verdict(actual, expected)?.is_equal())
    }

    /// Like [`Comparator::are_equal`], reporting which check accepted the pair
    pub fn verdict(&self, actual: &[u8], expected: &[u8]) -> Result<Verdict> {
        if self.are_contents_equal(actual, expected)? {
            return Ok(Verdict::StructurallyEqual);
        }
        debug!("Structural comparison failed, comparing rendered pages");
        if self.are_images_same(actual, expected)? {
            Ok(Verdict::VisuallyEqual)
        } else {
            Ok(Verdict::Different)
        }
    }

    /// Stream form of [`Comparator::are_equal`]; streams are read fully first
    ///
    /// A missing stream is never equal.
    pub fn are_equal_from_readers<A: Read, E: Read>(&self, actual: Option<A>, expected: Option<E>) -> Result<bool> {
        let (Some(mut actual), Some(mut expected)) = (actual, expected) else {
            return Ok(false);
        };
        let mut actual_bytes = Vec::new();
        actual.read_to_end(&mut actual_bytes)?;
        let mut expected_bytes = Vec::new();
        expected.read_to_end(&mut expected_bytes)?;

        self.are_equal(&actual_bytes, &expected_bytes)
    }

    pub fn are_contents_equal(&self, actual: &[u8], expected: &[u8]) -> Result<bool> {
        structural::are_contents_equal_with_policy(actual, expected, &self.policy)
    }

    pub fn are_images_same(&self, actual: &[u8], expected: &[u8]) -> Result<bool> {
        visual::are_images_same(&self.backend, actual, expected, self.on_encode_failure)
    }
}

/// Compare two documents with the pdfium backend and the default policy
///
/// pdfium is bound only when the structural check fails.
#[cfg(feature = "rendering")]
pub fn are_equal(actual: &[u8], expected: &[u8]) -> Result<bool> {
    use super::pdfium_backend::{PdfiumBackend, DEFAULT_DPI};

    if structural::are_contents_equal(actual, expected)? {
        return Ok(true);
    }
    let comparator = Comparator::new(PdfiumBackend::bind(DEFAULT_DPI)?);
    comparator.are_images_same(actual, expected)
}

/// Whether the rendered pages of two documents match, using pdfium
#[cfg(feature = "rendering")]
pub fn are_images_same(actual: &[u8], expected: &[u8]) -> Result<bool> {
    use super::pdfium_backend::{PdfiumBackend, DEFAULT_DPI};

    let backend = PdfiumBackend::bind(DEFAULT_DPI)?;
    visual::are_images_same(&backend, actual, expected, EncodeFailure::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::CompareError;
    use crate::core::visual::PageSource;
    use image::{Rgba, RgbaImage};
    use std::cell::Cell;

    /// Renders every `BT` line of the document as one page; loading counts calls.
    struct TextPages {
        loads: Cell<usize>,
    }

    struct TextDocument {
        pages: Vec<String>,
    }

    impl PageSource for TextDocument {
        fn page_count(&self) -> usize {
            self.pages.len()
        }

        fn render_page(&self, index: usize) -> crate::core::error::Result<RgbaImage> {
            let text = self.pages[index].as_bytes();
            let mut image = RgbaImage::new(text.len().max(1) as u32, 1);
            for (x, byte) in text.iter().enumerate() {
                image.put_pixel(x as u32, 0, Rgba([*byte, 0, 0, 255]));
            }
            Ok(image)
        }
    }

    impl DocumentBackend for TextPages {
        type Document<'a> = TextDocument;

        fn load<'a>(&'a self, bytes: &'a [u8]) -> crate::core::error::Result<TextDocument> {
            self.loads.set(self.loads.get() + 1);
            let text = std::str::from_utf8(bytes).map_err(|e| CompareError::InvalidDocument(e.to_string()))?;
            let pages = text.lines().filter(|l| l.starts_with("BT")).map(str::to_string).collect();
            Ok(TextDocument { pages })
        }
    }

    fn comparator() -> Comparator<TextPages> {
        Comparator::new(TextPages { loads: Cell::new(0) })
    }

    #[test]
    fn test_structural_match_skips_rendering() {
        let comparator = comparator();
        let actual = b"%PDF-1.4\n/Producer (a)\nBT page\n";
        let expected = b"%PDF-1.4\n/Producer (b)\nBT page\n";
        assert_eq!(comparator.verdict(actual, expected).unwrap(), Verdict::StructurallyEqual);
        assert_eq!(comparator.backend().loads.get(), 0);
    }

    #[test]
    fn test_falls_back_to_rendering() {
        let comparator = comparator();
        let actual = b"/Author (a)\nBT page\n";
        let expected = b"/Author (b)\nBT page\n";
        assert!(!comparator.are_contents_equal(actual, expected).unwrap());
        assert_eq!(comparator.verdict(actual, expected).unwrap(), Verdict::VisuallyEqual);
        assert!(comparator.are_equal(actual, expected).unwrap());
        assert_eq!(comparator.backend().loads.get(), 4);
    }

    #[test]
    fn test_both_checks_fail() {
        let comparator = comparator();
        assert_eq!(comparator.verdict(b"BT one\n", b"BT two\n").unwrap(), Verdict::Different);
        assert!(!Verdict::Different.is_equal());
    }

    #[test]
    fn test_custom_policy_is_used() {
        let comparator = comparator().with_policy(IgnorePolicy::new(Vec::<String>::new(), vec!["/Author"]));
        assert!(comparator.are_contents_equal(b"/Author (a)\n", b"/Author (b)\n").unwrap());
        assert!(!comparator.are_contents_equal(b"/Producer (a)\n", b"/Producer (b)\n").unwrap());
    }

    #[test]
    fn test_missing_streams_are_not_equal() {
        let comparator = comparator();
        let doc: &[u8] = b"BT page\n";
        assert!(!comparator.are_equal_from_readers(Some(doc), None::<&[u8]>).unwrap());
        assert!(!comparator.are_equal_from_readers(None::<&[u8]>, None::<&[u8]>).unwrap());
        assert!(comparator.are_equal_from_readers(Some(doc), Some(doc)).unwrap());
    }

    #[test]
    fn test_unreadable_document_propagates_error() {
        let comparator = comparator();
        let err = comparator.are_equal(&[b'x', 0xFF], b"y").unwrap_err();
        assert!(matches!(err, CompareError::InvalidDocument(_)));
    }
}
