//! Line prefixes exempted from structural comparison

use std::collections::BTreeSet;

/// Prefixes of single lines that carry environment specific values.
///
/// The `<<` forms cover the same keys when they open a dictionary on the line.
/// `%` covers comment lines, but only when the comment starts in the first column.
pub const DEFAULT_SCALAR_PREFIXES: &[&str] = &[
    "/Producer",
    "/Creator",
    "/CreationDate",
    "/DocChecksum",
    "/Root",
    "<</Producer",
    "<</Creator",
    "<</CreationDate",
    "<</DocChecksum",
    "<</Root",
    "%",
];

/// Prefixes opening an array that may span several lines, up to the first line containing `]`.
pub const DEFAULT_ARRAY_PREFIXES: &[&str] = &["/ID", "<</ID"];

lazy_static::lazy_static! {
    static ref DEFAULT_POLICY: IgnorePolicy =
        IgnorePolicy::new(DEFAULT_ARRAY_PREFIXES.iter().copied(), DEFAULT_SCALAR_PREFIXES.iter().copied());
}

/// Immutable set of line prefixes to ignore when two lines differ
///
/// A prefix only excuses a differing line pair when *both* lines start with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnorePolicy {
    array_prefixes: BTreeSet<String>,
    scalar_prefixes: BTreeSet<String>,
}

impl IgnorePolicy {
    /// Build a policy from array and scalar prefixes
    ///
    /// Either set may be empty; an empty policy excuses nothing.
    pub fn new<A, S>(array_prefixes: A, scalar_prefixes: S) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            array_prefixes: array_prefixes.into_iter().map(Into::into).collect(),
            scalar_prefixes: scalar_prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a policy from sets that may contain absent entries; those are dropped
    pub fn from_optional<A, S>(array_prefixes: A, scalar_prefixes: S) -> Self
    where
        A: IntoIterator<Item = Option<String>>,
        S: IntoIterator<Item = Option<String>>,
    {
        Self::new(array_prefixes.into_iter().flatten(), scalar_prefixes.into_iter().flatten())
    }

    /// A policy that excuses nothing
    pub fn empty() -> Self {
        Self {
            array_prefixes: BTreeSet::new(),
            scalar_prefixes: BTreeSet::new(),
        }
    }

    /// The process-wide default policy, built on first use
    pub fn default_policy() -> &'static IgnorePolicy {
        &DEFAULT_POLICY
    }

    pub fn array_prefixes(&self) -> &BTreeSet<String> {
        &self.array_prefixes
    }

    pub fn scalar_prefixes(&self) -> &BTreeSet<String> {
        &self.scalar_prefixes
    }

    /// Whether both lines open an ignored array
    pub fn opens_array(&self, actual: &str, expected: &str) -> bool {
        shared_prefix(&self.array_prefixes, actual, expected)
    }

    /// Whether both lines are ignored scalar lines
    pub fn is_ignored_line(&self, actual: &str, expected: &str) -> bool {
        shared_prefix(&self.scalar_prefixes, actual, expected)
    }
}

impl Default for IgnorePolicy {
    fn default() -> Self {
        Self::default_policy().clone()
    }
}

fn shared_prefix(prefixes: &BTreeSet<String>, actual: &str, expected: &str) -> bool {
    prefixes
        .iter()
        .any(|prefix| actual.starts_with(prefix.as_str()) && expected.starts_with(prefix.as_str()))
}
