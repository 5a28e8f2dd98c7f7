//! Line-oriented structural comparison
//!
//! Both documents are walked line by line in lock-step. Differing lines are
//! excused when an [`IgnorePolicy`] prefix is shared by both lines, and an ignored
//! array excuses every differing line up to and including the one that closes it.

use std::io::{BufReader, Read};

use tracing::{debug, error};

use super::error::Result;
use super::lines::Latin1Lines;
use super::policy::IgnorePolicy;

/// Position of the line walk relative to ignored arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    #[default]
    Normal,
    SkippingArray,
}

/// Outcome of comparing one line pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineVerdict {
    Same,
    Excused,
    Different,
}

impl ScanState {
    /// Feed one line pair and return the next state with the verdict for the pair
    pub fn step(self, actual: &str, expected: &str, policy: &IgnorePolicy) -> (ScanState, LineVerdict) {
        if actual == expected {
            return (self, LineVerdict::Same);
        }

        match self {
            ScanState::SkippingArray => {
                let next = if actual.contains(']') {
                    ScanState::Normal
                } else {
                    ScanState::SkippingArray
                };
                (next, LineVerdict::Excused)
            }
            ScanState::Normal if policy.opens_array(actual, expected) => {
                (ScanState::SkippingArray, LineVerdict::Excused)
            }
            ScanState::Normal if policy.is_ignored_line(actual, expected) => {
                (ScanState::Normal, LineVerdict::Excused)
            }
            ScanState::Normal => (ScanState::Normal, LineVerdict::Different),
        }
    }
}

/// Compare two documents line by line under `policy`
///
/// `None` stands for a missing document; a missing document is never equal to
/// anything, including another missing document.
///
/// The walk is driven by `actual`: once it runs out of lines the documents are
/// considered equal, even if `expected` has lines left. `expected` running out
/// first is a mismatch.
pub fn are_contents_equal_with<A, E>(actual: Option<A>, expected: Option<E>, policy: &IgnorePolicy) -> Result<bool>
where
    A: Read,
    E: Read,
{
    let (Some(actual), Some(expected)) = (actual, expected) else {
        return Ok(false);
    };

    let mut actual_lines = Latin1Lines::new(BufReader::new(actual));
    let mut expected_lines = Latin1Lines::new(BufReader::new(expected));
    let mut state = ScanState::Normal;
    let mut line_number: usize = 1;

    while let Some(line1) = actual_lines.next_line()? {
        let Some(line2) = expected_lines.next_line()? else {
            debug!(line = line_number, "expected document ended before actual document");
            return Ok(false);
        };

        let (next, verdict) = state.step(&line1, &line2, policy);
        if verdict == LineVerdict::Different {
            error!("The following lines [#{}] are different!\n\t1. {}\n\t2. {}", line_number, line1, line2);
            return Ok(false);
        }
        state = next;
        line_number += 1;
    }

    Ok(true)
}

/// Compare two in-memory documents under `policy`
pub fn are_contents_equal_with_policy(actual: &[u8], expected: &[u8], policy: &IgnorePolicy) -> Result<bool> {
    are_contents_equal_with(Some(actual), Some(expected), policy)
}

/// Compare two in-memory documents under the default policy
pub fn are_contents_equal(actual: &[u8], expected: &[u8]) -> Result<bool> {
    are_contents_equal_with_policy(actual, expected, IgnorePolicy::default_policy())
}
