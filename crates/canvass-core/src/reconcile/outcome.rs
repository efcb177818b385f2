//! Per-item reconciliation outcomes.
//!
//! Soft conditions are data, not errors: a typed [`ItemOutcome`] per result
//! key, rendered to the wire strings clients consume via `Display`.

use std::collections::BTreeMap;
use std::fmt;

/// What happened to one item during a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// A record without an id was persisted as a new item.
    Created { id: i64 },
    /// An existing item was dirty and was persisted.
    Updated,
    /// An existing item matched the record exactly; nothing was persisted.
    Unchanged,
    /// A stored item was absent from the batch and was swept.
    Deleted,
    /// The record referenced an id outside the owning scope.
    NotFound { entity: &'static str },
}

impl fmt::Display for ItemOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created { id } => write!(f, "Created with ID: {id}"),
            Self::Updated => f.write_str("Updated successfully"),
            Self::Unchanged => f.write_str("No changes"),
            Self::Deleted => f.write_str("Deleted"),
            Self::NotFound { entity } => write!(f, "{entity} not found"),
        }
    }
}

/// Result map of one reconciliation call.
///
/// Keys are `<scope>_<id>` for existing items and `<scope>_new_<index>` for
/// created ones, with nested scopes joined by `_`
/// (e.g. `question_7_option_3`).
pub type Outcomes = BTreeMap<String, ItemOutcome>;

/// Render an outcome map to plain status strings for transport layers.
#[must_use]
pub fn rendered(outcomes: &Outcomes) -> BTreeMap<String, String> {
    outcomes
        .iter()
        .map(|(key, outcome)| (key.clone(), outcome.to_string()))
        .collect()
}
