//! Pairing of actual and expected documents

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::comparator::{Comparator, Verdict};
use crate::core::error::Result;
use crate::core::policy::IgnorePolicy;
use crate::core::size::are_contents_similar_size;
use crate::core::structural::are_contents_equal_with_policy;
use crate::core::visual::DocumentBackend;

/// A generated document and the reference it should match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPair {
    /// Path relative to both roots
    pub relative_path: PathBuf,
    pub actual: PathBuf,
    /// `None` when the expected tree has no document at the same relative path
    pub expected: Option<PathBuf>,
}

/// Outcome of comparing a single pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComparisonOutcome {
    StructurallyEqual,
    VisuallyEqual,
    Different,
    SizeMismatch,
    MissingExpected,
    Failed { error: String },
}

impl ComparisonOutcome {
    pub fn is_equal(&self) -> bool {
        matches!(self, ComparisonOutcome::StructurallyEqual | ComparisonOutcome::VisuallyEqual)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ComparisonOutcome::StructurallyEqual => "EQUAL (structure)",
            ComparisonOutcome::VisuallyEqual => "EQUAL (rendered pages)",
            ComparisonOutcome::Different => "DIFFERENT",
            ComparisonOutcome::SizeMismatch => "SIZE MISMATCH",
            ComparisonOutcome::MissingExpected => "MISSING EXPECTED",
            ComparisonOutcome::Failed { .. } => "FAILED",
        }
    }
}

impl From<Verdict> for ComparisonOutcome {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::StructurallyEqual => ComparisonOutcome::StructurallyEqual,
            Verdict::VisuallyEqual => ComparisonOutcome::VisuallyEqual,
            Verdict::Different => ComparisonOutcome::Different,
        }
    }
}

/// Result of comparing a single pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: ComparisonOutcome,
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase() == "pdf")
        .unwrap_or(false)
}

/// Pair every PDF under `actual_root` with the same relative path under `expected_root`
///
/// # Arguments
/// * `actual_root` - Root of the generated documents
/// * `expected_root` - Root of the reference documents
/// * `recursive` - Whether to scan subdirectories recursively
///
/// # Returns
/// Pairs sorted by relative path
pub fn collect_document_pairs(actual_root: &Path, expected_root: &Path, recursive: bool) -> anyhow::Result<Vec<DocumentPair>> {
    let mut actual_files = Vec::new();

    if recursive {
        for entry in WalkDir::new(actual_root).follow_links(false) {
            let entry = entry?;
            if entry.file_type().is_file() && is_pdf(entry.path()) {
                actual_files.push(entry.path().to_path_buf());
            }
        }
    } else {
        for entry in fs::read_dir(actual_root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() && is_pdf(&entry.path()) {
                actual_files.push(entry.path());
            }
        }
    }

    let mut pairs = Vec::with_capacity(actual_files.len());
    for actual in actual_files {
        let relative_path = actual.strip_prefix(actual_root)?.to_path_buf();
        let expected = expected_root.join(&relative_path);
        pairs.push(DocumentPair {
            expected: expected.is_file().then_some(expected),
            relative_path,
            actual,
        });
    }
    pairs.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    Ok(pairs)
}

fn read_pair(actual: &Path, expected: &Path) -> Result<(Vec<u8>, Vec<u8>)> {
    Ok((fs::read(actual)?, fs::read(expected)?))
}

/// Size and structural checks for one pair
///
/// Never touches a rendering backend, so it is safe to run on many pairs in parallel.
pub fn compare_structurally(pair: &DocumentPair, policy: &IgnorePolicy, size_tolerance: Option<f32>) -> ComparisonOutcome {
    let Some(expected_path) = &pair.expected else {
        return ComparisonOutcome::MissingExpected;
    };

    let outcome = read_pair(&pair.actual, expected_path).and_then(|(actual, expected)| {
        if let Some(tolerance) = size_tolerance {
            if !are_contents_similar_size(&actual, &expected, tolerance)? {
                return Ok(ComparisonOutcome::SizeMismatch);
            }
        }
        Ok(if are_contents_equal_with_policy(&actual, &expected, policy)? {
            ComparisonOutcome::StructurallyEqual
        } else {
            ComparisonOutcome::Different
        })
    });

    outcome.unwrap_or_else(|e| ComparisonOutcome::Failed { error: e.to_string() })
}

/// Rendered page comparison for a pair that failed the structural check
pub fn compare_visually<B: DocumentBackend>(pair: &DocumentPair, comparator: &Comparator<B>) -> ComparisonOutcome {
    let Some(expected_path) = &pair.expected else {
        return ComparisonOutcome::MissingExpected;
    };

    let outcome = read_pair(&pair.actual, expected_path)
        .and_then(|(actual, expected)| comparator.are_images_same(&actual, &expected));

    match outcome {
        Ok(true) => ComparisonOutcome::VisuallyEqual,
        Ok(false) => ComparisonOutcome::Different,
        Err(e) => ComparisonOutcome::Failed { error: e.to_string() },
    }
}
