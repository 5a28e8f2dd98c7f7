//! Integration tests for the two-tier comparison
//!
//! Uses an in-test backend so rendered page comparison runs without a pdfium
//! shared library.

use pdf_compare_rs::prelude::*;

mod common;
use common::{read_fixture, TextLineBackend};

const ORDERED: &[u8] = b"%PDF-1.4\n\
1 0 obj\n<</Type /Catalog /Pages 2 0 R>>\nendobj\n\
2 0 obj\n<</Author (Build agent 7)>>\nendobj\n\
3 0 obj\n<</Length 20>>\nstream\nBT (Page one) Tj ET\nendstream\nendobj\n\
4 0 obj\n<</Length 20>>\nstream\nBT (Page two) Tj ET\nendstream\nendobj\n\
%%EOF\n";

/// Same pages, but the catalog moved after the info dictionary and the author changed
const REORDERED: &[u8] = b"%PDF-1.4\n\
2 0 obj\n<</Author (Build agent 3)>>\nendobj\n\
1 0 obj\n<</Type /Catalog /Pages 2 0 R>>\nendobj\n\
3 0 obj\n<</Length 20>>\nstream\nBT (Page one) Tj ET\nendstream\nendobj\n\
4 0 obj\n<</Length 20>>\nstream\nBT (Page two) Tj ET\nendstream\nendobj\n\
%%EOF\n";

const CHANGED_PAGE: &[u8] = b"%PDF-1.4\n\
1 0 obj\n<</Type /Catalog /Pages 2 0 R>>\nendobj\n\
2 0 obj\n<</Author (Build agent 7)>>\nendobj\n\
3 0 obj\n<</Length 20>>\nstream\nBT (Page one) Tj ET\nendstream\nendobj\n\
4 0 obj\n<</Length 20>>\nstream\nBT (Page 2!!) Tj ET\nendstream\nendobj\n\
%%EOF\n";

/// Test that identical rendering rescues a structural mismatch
#[test]
fn test_reordered_document_is_equal_by_rendering() {
    let comparator = Comparator::new(TextLineBackend::default());

    assert!(!comparator.are_contents_equal(ORDERED, REORDERED).unwrap());
    assert!(comparator.are_images_same(ORDERED, REORDERED).unwrap());
    assert!(comparator.are_equal(ORDERED, REORDERED).unwrap());
    assert!(comparator.are_equal(REORDERED, ORDERED).unwrap());
    assert_eq!(comparator.verdict(ORDERED, REORDERED).unwrap(), Verdict::VisuallyEqual);
}

/// Test that a changed page fails both checks
#[test]
fn test_changed_page_is_different() {
    let comparator = Comparator::new(TextLineBackend::default());

    assert!(!comparator.are_equal(ORDERED, CHANGED_PAGE).unwrap());
    assert_eq!(comparator.verdict(ORDERED, CHANGED_PAGE).unwrap(), Verdict::Different);
}

/// Test that a structural match never loads the documents
#[test]
fn test_structural_match_short_circuits() {
    let comparator = Comparator::new(TextLineBackend::default());
    let actual = read_fixture("actual/test001.pdf");
    let expected = read_fixture("expected/test001.pdf");

    assert!(comparator.are_equal(&actual, &expected).unwrap());
    assert!(comparator.are_equal(ORDERED, ORDERED).unwrap());
    assert_eq!(comparator.backend().loads.get(), 0);
}

/// Test that every loaded document is closed, including when loading fails
#[test]
fn test_documents_are_always_closed() {
    let comparator = Comparator::new(TextLineBackend::default());

    comparator.are_equal(ORDERED, REORDERED).unwrap();
    comparator.are_equal(ORDERED, CHANGED_PAGE).unwrap();
    assert_eq!(comparator.backend().loads.get(), 4);
    assert_eq!(comparator.backend().closes.get(), 4);

    let err = comparator.are_equal(ORDERED, b"not a pdf\n").unwrap_err();
    assert!(matches!(err, CompareError::InvalidDocument(_)));
    assert_eq!(comparator.backend().loads.get(), 6);
    assert_eq!(comparator.backend().closes.get(), 5);
}

/// Test that a page count difference is a mismatch
#[test]
fn test_missing_page_is_different() {
    let comparator = Comparator::new(TextLineBackend::default());
    let one_page = b"%PDF-1.4\nBT (Page one) Tj ET\n";
    let two_pages = b"%PDF-1.4\nBT (Page one) Tj ET\nBT (Page two) Tj ET\n";

    assert!(!comparator.are_images_same(one_page, two_pages).unwrap());
    // Structurally the shorter actual document still passes.
    assert!(comparator.are_equal(one_page, two_pages).unwrap());
    assert!(!comparator.are_equal(two_pages, one_page).unwrap());
}

/// Test the stream forms and missing streams
#[test]
fn test_reader_forms() {
    let comparator = Comparator::new(TextLineBackend::default());

    assert!(comparator.are_equal_from_readers(Some(ORDERED), Some(REORDERED)).unwrap());
    assert!(!comparator.are_equal_from_readers(Some(ORDERED), None::<&[u8]>).unwrap());
    assert!(!comparator.are_equal_from_readers(None::<&[u8]>, None::<&[u8]>).unwrap());
}

/// Test that a stricter policy does not affect the rendering fallback
#[test]
fn test_empty_policy_still_falls_back() {
    let comparator = Comparator::new(TextLineBackend::default())
        .with_policy(IgnorePolicy::empty())
        .with_encode_failure(EncodeFailure::Fail);
    let actual = read_fixture("actual/test001.pdf");
    let expected = read_fixture("expected/test001.pdf");

    assert!(!comparator.are_contents_equal(&actual, &expected).unwrap());
    assert_eq!(comparator.verdict(&actual, &expected).unwrap(), Verdict::VisuallyEqual);
}
