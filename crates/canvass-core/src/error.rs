//! Typed leaf errors.
//!
//! Soft conditions ("not found", "no changes") are deliberately *not* here:
//! they are variants of [`crate::reconcile::outcome::ItemOutcome`] and never
//! abort a batch. Everything in this module does abort, before any
//! persistence in the offending item's subtree.

use thiserror::Error;

/// A submitted field value violating a domain constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{entity} {field} must not be empty")]
    EmptyText {
        entity: &'static str,
        field: &'static str,
    },

    #[error("info card color {0:#08x} out of range (max 0xFFFFFF)")]
    ColorOutOfRange(u32),

    #[error("group probability {0} out of range (max 100)")]
    ProbabilityOutOfRange(u8),

    #[error("slider bounds invalid: min {min} must be below max {max}")]
    SliderBounds { min: i32, max: i32 },
}

#[cfg(test)]
mod tests {
    use super::ValidationError;

    #[test]
    fn messages_name_the_offending_field() {
        let err = ValidationError::EmptyText {
            entity: "Faq",
            field: "question",
        };
        assert_eq!(err.to_string(), "Faq question must not be empty");

        let err = ValidationError::ColorOutOfRange(0x0100_0000);
        assert!(err.to_string().contains("0x1000000"));
    }
}
