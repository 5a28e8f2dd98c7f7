//! Rendered page comparison
//!
//! Each page of both documents is rasterized, encoded as PNG and the encoded
//! bytes are compared page by page. Loading and rasterization are delegated to a
//! [`DocumentBackend`]; the pdfium implementation lives behind the `rendering` feature.

use std::io::{Cursor, Read};
use std::ops::Deref;

use image::{ImageFormat, RgbaImage};
use tracing::{debug, warn};

use super::error::{CompareError, Result};

/// Encoded page images of one document, in page order
pub type PageImageSet = Vec<Vec<u8>>;

/// What to do when a rendered page cannot be encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodeFailure {
    /// Leave the page out of the image set and carry on.
    ///
    /// Later pages shift position, so an asymmetric failure usually turns into
    /// a mismatch on a different page.
    #[default]
    SkipPage,
    /// Abort the comparison with [`CompareError::Encode`].
    Fail,
}

/// A parsed document whose pages can be rasterized
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Rasterize the page at zero-based `index`
    fn render_page(&self, index: usize) -> Result<RgbaImage>;

    /// Release parser resources held by the document
    ///
    /// Called once by [`DocumentGuard`] when the document goes out of scope.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Loads documents and encodes their rendered pages
pub trait DocumentBackend {
    type Document<'a>: PageSource
    where
        Self: 'a;

    /// Parse `bytes` into a document
    ///
    /// # Errors
    /// Returns [`CompareError::InvalidDocument`] when the bytes are not a readable document.
    fn load<'a>(&'a self, bytes: &'a [u8]) -> Result<Self::Document<'a>>;

    /// Encode a rendered page in a lossless format
    fn encode_page(&self, page: &RgbaImage) -> Result<Vec<u8>> {
        encode_png(page).map_err(|e| CompareError::Encode(e.to_string()))
    }
}

/// Encode an RGBA raster as PNG
pub fn encode_png(page: &RgbaImage) -> image::ImageResult<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    page.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

/// Owns a loaded document and closes it when dropped
///
/// Close failures are logged at debug level and never reach the caller.
pub struct DocumentGuard<D: PageSource> {
    document: D,
}

impl<D: PageSource> DocumentGuard<D> {
    pub fn new(document: D) -> Self {
        Self { document }
    }
}

impl<D: PageSource> Deref for DocumentGuard<D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.document
    }
}

impl<D: PageSource> Drop for DocumentGuard<D> {
    fn drop(&mut self) {
        if let Err(e) = self.document.close() {
            debug!(
                error = %e,
                "An error occurred whilst closing a document. It does not affect the comparison, but should be investigated"
            );
        }
    }
}

/// Render and encode every page of `document`
///
/// # Errors
/// Rendering failures are always returned. Encoding failures are returned only
/// under [`EncodeFailure::Fail`].
pub fn page_images<B, D>(backend: &B, document: &D, on_encode_failure: EncodeFailure) -> Result<PageImageSet>
where
    B: DocumentBackend,
    D: PageSource,
{
    let page_count = document.page_count();
    let mut images = Vec::with_capacity(page_count);

    for index in 0..page_count {
        let raster = document.render_page(index)?;
        match backend.encode_page(&raster) {
            Ok(bytes) => images.push(bytes),
            Err(e) if on_encode_failure == EncodeFailure::Fail => return Err(e),
            Err(e) => warn!(page = index + 1, error = %e, "Page image could not be encoded and was skipped"),
        }
    }

    Ok(images)
}

/// Compare two page image sets
///
/// Two missing sets are equal; a missing set never equals a present one.
/// Present sets are equal when they hold the same number of images and every
/// image is byte-identical to the one at the same position.
pub fn page_image_sets_equal(actual: Option<&[Vec<u8>]>, expected: Option<&[Vec<u8>]>) -> bool {
    match (actual, expected) {
        (None, None) => true,
        (Some(actual), Some(expected)) => {
            actual.len() == expected.len() && actual.iter().zip(expected).all(|(a, e)| a == e)
        }
        _ => false,
    }
}

/// Whether both documents render to the same page images
///
/// Both documents are closed on every exit path, including load and render failures.
pub fn are_images_same<B: DocumentBackend>(
    backend: &B,
    actual: &[u8],
    expected: &[u8],
    on_encode_failure: EncodeFailure,
) -> Result<bool> {
    let actual_document = DocumentGuard::new(backend.load(actual)?);
    let expected_document = DocumentGuard::new(backend.load(expected)?);

    let actual_pages = page_images(backend, &*actual_document, on_encode_failure)?;
    let expected_pages = page_images(backend, &*expected_document, on_encode_failure)?;

    debug!(
        actual_pages = actual_pages.len(),
        expected_pages = expected_pages.len(),
        "Rendered documents for comparison"
    );
    Ok(page_image_sets_equal(Some(actual_pages.as_slice()), Some(expected_pages.as_slice())))
}

/// Stream form of [`are_images_same`]; a missing stream is never the same
pub fn are_images_same_from_readers<B, A, E>(
    backend: &B,
    actual: Option<A>,
    expected: Option<E>,
    on_encode_failure: EncodeFailure,
) -> Result<bool>
where
    B: DocumentBackend,
    A: Read,
    E: Read,
{
    let (Some(mut actual), Some(mut expected)) = (actual, expected) else {
        return Ok(false);
    };
    let mut actual_bytes = Vec::new();
    actual.read_to_end(&mut actual_bytes)?;
    let mut expected_bytes = Vec::new();
    expected.read_to_end(&mut expected_bytes)?;

    are_images_same(backend, &actual_bytes, &expected_bytes, on_encode_failure)
}
