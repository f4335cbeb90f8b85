//! Per-item outcomes of batch operations

use crate::PlanningError;
use std::fmt;
use tracing::warn;

/// Why an input item produced no output
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Well-formed, but outside the operation's domain
    Ineligible(String),
    /// Malformed input
    Invalid(PlanningError),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Ineligible(reason) => write!(f, "ineligible: {}", reason),
            SkipReason::Invalid(err) => write!(f, "invalid: {}", err),
        }
    }
}

/// An input item left out of a batch result
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedItem {
    /// Identifier of the skipped item
    pub key: String,
    pub reason: SkipReason,
}

/// Results of a batch operation plus a record of every skipped input
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome<T> {
    pub items: Vec<T>,
    pub skipped: Vec<SkippedItem>,
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<T> BatchOutcome<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Record a skipped input and log it
    pub fn skip(&mut self, key: impl Into<String>, reason: SkipReason) {
        let key = key.into();
        warn!(item = %key, %reason, "batch item skipped");
        self.skipped.push(SkippedItem { key, reason });
    }

    /// Skip an item that failed validation
    pub fn reject(&mut self, key: impl Into<String>, error: PlanningError) {
        self.skip(key, SkipReason::Invalid(error));
    }

    /// Number of inputs seen, produced or skipped
    pub fn processed(&self) -> usize {
        self.items.len() + self.skipped.len()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}
