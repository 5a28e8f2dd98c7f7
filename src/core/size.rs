//! Size similarity check between two documents

use std::io::Read;

use super::error::{CompareError, Result};

/// Reject tolerances outside `[0, 1]`
pub fn check_tolerance(tolerance: f32) -> Result<()> {
    if (0.0..=1.0).contains(&tolerance) {
        Ok(())
    } else {
        Err(CompareError::InvalidTolerance(tolerance))
    }
}

/// Whether `expected` is within `tolerance` of the size of `actual`
///
/// The tolerance lies in `[0, 1]` and is relative to the length of `actual`:
/// `expected` must be strictly within `(1 - tolerance) * len(actual)` and
/// `(1 + tolerance) * len(actual)`. A zero tolerance means "same size", since the
/// strict bounds could never hold there.
///
/// # Errors
/// Returns [`CompareError::InvalidTolerance`] when `tolerance` is outside `[0, 1]`.
pub fn are_contents_similar_size(actual: &[u8], expected: &[u8], tolerance: f32) -> Result<bool> {
    check_tolerance(tolerance)?;

    if tolerance == 0.0 {
        return Ok(actual.len() == expected.len());
    }

    let actual_size = actual.len() as f64;
    let expected_size = expected.len() as f64;
    let tolerance = f64::from(tolerance);

    Ok(expected_size > (1.0 - tolerance) * actual_size && expected_size < (1.0 + tolerance) * actual_size)
}

/// Stream form of [`are_contents_similar_size`]; a missing stream is never similar
///
/// The tolerance is checked before either stream is read.
pub fn are_contents_similar_size_from_readers<A, E>(
    actual: Option<A>,
    expected: Option<E>,
    tolerance: f32,
) -> Result<bool>
where
    A: Read,
    E: Read,
{
    check_tolerance(tolerance)?;

    let (Some(mut actual), Some(mut expected)) = (actual, expected) else {
        return Ok(false);
    };
    let mut actual_bytes = Vec::new();
    actual.read_to_end(&mut actual_bytes)?;
    let mut expected_bytes = Vec::new();
    expected.read_to_end(&mut expected_bytes)?;

    are_contents_similar_size(&actual_bytes, &expected_bytes, tolerance)
}
