//! The error aggregator.

use crate::Diagnostic;

/// One or more diagnostics collected while lowering a compilation unit.
///
/// Non-empty by construction. With a single entry it displays exactly like
/// that diagnostic; with more it displays the first one followed by a count
/// of the rest, and [`ErrorSet::iter`] yields all of them in order.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{first}{}", more_suffix(.rest.len()))]
pub struct ErrorSet {
    first: Diagnostic,
    rest: Vec<Diagnostic>,
}

fn more_suffix(more: usize) -> String {
    match more {
        0 => String::new(),
        1 => "\n(and 1 more error)".to_string(),
        n => format!("\n(and {n} more errors)"),
    }
}

impl ErrorSet {
    /// Build a set from collected diagnostics, `None` if there are none.
    pub fn from_vec(diagnostics: Vec<Diagnostic>) -> Option<Self> {
        let mut iter = diagnostics.into_iter();
        let first = iter.next()?;
        Some(ErrorSet {
            first,
            rest: iter.collect(),
        })
    }

    /// Number of diagnostics (at least 1).
    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }

    /// Always false.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The first diagnostic collected.
    pub fn first(&self) -> &Diagnostic {
        &self.first
    }

    /// The lone diagnostic, if exactly one was collected.
    pub fn as_single(&self) -> Option<&Diagnostic> {
        self.rest.is_empty().then_some(&self.first)
    }

    /// All diagnostics in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        std::iter::once(&self.first).chain(self.rest.iter())
    }

    /// Consume the set, returning all diagnostics in order.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        let mut all = Vec::with_capacity(self.len());
        all.push(self.first);
        all.extend(self.rest);
        all
    }
}

impl IntoIterator for ErrorSet {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}
