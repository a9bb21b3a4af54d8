//! Inspector-facing summaries of a variable's active modifiers.

use serde::{Deserialize, Serialize};

/// One row of an inspector summary: active modifiers sharing a description,
/// with their count and combined contribution.
///
/// Descriptions exist only for summarization; they have no effect on
/// computation. Modifiers without a description group under
/// [`ModifierGroup::UNLABELED`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierGroup {
    /// Shared description of the grouped modifiers.
    pub description: String,
    /// Number of active modifiers sharing the description.
    pub count: usize,
    /// Sum of the grouped modifiers' current contributions.
    pub total: f64,
}

impl ModifierGroup {
    /// Group label for modifiers constructed without a description.
    pub const UNLABELED: &'static str = "unlabeled";
}

impl std::fmt::Display for ModifierGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} x{}: {:+.1}", self.description, self.count, self.total)
    }
}
