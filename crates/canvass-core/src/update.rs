//! Submitted update records.
//!
//! Each record mirrors its entity's fields plus `id: Option<i64>` — present
//! means "this is entity N", absent means "create new". A record's position
//! in the submitted sequence doubles as its target `ord` and, transitively,
//! as one slot of the positional image channel.
//!
//! Question shapes are a closed set of variants with different payloads,
//! modeled as internally-tagged enums and dispatched by exhaustive match.
//! A child list of `None` is the delete-everything sentinel for that child
//! collection, so switching a question's variant sweeps the children the new
//! variant does not carry.

use serde::{Deserialize, Serialize};

use crate::model::form::QuestionKind;
use crate::model::testing::TestQuestionKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqUpdate {
    pub id: Option<i64>,
    pub question: String,
    pub answer: String,
    pub image_alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoCardUpdate {
    pub id: Option<i64>,
    pub title: String,
    pub body: String,
    pub color: u32,
    pub image_alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormQuestionUpdate {
    pub id: Option<i64>,
    pub text: String,
    pub required: bool,
    pub image_alt: Option<String>,
    #[serde(flatten)]
    pub payload: QuestionPayload,
}

/// Variant-specific payload of a form question update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionPayload {
    SelectOne {
        options: Option<Vec<FormOptionUpdate>>,
    },
    SelectMultiple {
        options: Option<Vec<FormOptionUpdate>>,
    },
    Slider {
        min: i32,
        max: i32,
        labels: Option<Vec<SliderLabelUpdate>>,
    },
    TextShort,
    TextLong,
}

impl QuestionPayload {
    /// The stored kind this payload maps to.
    #[must_use]
    pub const fn kind(&self) -> QuestionKind {
        match self {
            Self::SelectOne { .. } => QuestionKind::SelectOne,
            Self::SelectMultiple { .. } => QuestionKind::SelectMultiple,
            Self::Slider { .. } => QuestionKind::Slider,
            Self::TextShort => QuestionKind::TextShort,
            Self::TextLong => QuestionKind::TextLong,
        }
    }

    /// Submitted option children; `None` sweeps the stored options.
    #[must_use]
    pub fn options(&self) -> Option<&[FormOptionUpdate]> {
        match self {
            Self::SelectOne { options } | Self::SelectMultiple { options } => options.as_deref(),
            Self::Slider { .. } | Self::TextShort | Self::TextLong => None,
        }
    }

    /// Submitted slider-label children; `None` sweeps the stored labels.
    #[must_use]
    pub fn labels(&self) -> Option<&[SliderLabelUpdate]> {
        match self {
            Self::Slider { labels, .. } => labels.as_deref(),
            Self::SelectOne { .. }
            | Self::SelectMultiple { .. }
            | Self::TextShort
            | Self::TextLong => None,
        }
    }

    /// Slider bounds, when this payload carries them.
    #[must_use]
    pub const fn slider_bounds(&self) -> Option<(i32, i32)> {
        match self {
            Self::Slider { min, max, .. } => Some((*min, *max)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormOptionUpdate {
    pub id: Option<i64>,
    pub text: String,
    pub image_alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliderLabelUpdate {
    pub id: Option<i64>,
    pub text: String,
    pub image_alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOptionUpdate {
    pub id: Option<i64>,
    pub text: String,
    pub image_alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestGroupUpdate {
    pub id: Option<i64>,
    pub label: String,
    pub probability: u8,
    pub image_alt: Option<String>,
    pub protocols: Option<Vec<ProtocolUpdate>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolUpdate {
    pub id: Option<i64>,
    pub name: String,
    pub summary: String,
    pub image_alt: Option<String>,
    pub phases: Option<Vec<PhaseUpdate>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseUpdate {
    pub id: Option<i64>,
    pub title: String,
    pub duration_days: Option<u32>,
    pub image_alt: Option<String>,
    pub questions: Option<Vec<TestQuestionUpdate>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestQuestionUpdate {
    pub id: Option<i64>,
    pub text: String,
    pub required: bool,
    pub image_alt: Option<String>,
    #[serde(flatten)]
    pub payload: TestQuestionPayload,
}

/// Variant-specific payload of a test question update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TestQuestionPayload {
    SelectOne {
        options: Option<Vec<TestOptionUpdate>>,
    },
    SelectMultiple {
        options: Option<Vec<TestOptionUpdate>>,
    },
    TextShort,
    TextLong,
}

impl TestQuestionPayload {
    #[must_use]
    pub const fn kind(&self) -> TestQuestionKind {
        match self {
            Self::SelectOne { .. } => TestQuestionKind::SelectOne,
            Self::SelectMultiple { .. } => TestQuestionKind::SelectMultiple,
            Self::TextShort => TestQuestionKind::TextShort,
            Self::TextLong => TestQuestionKind::TextLong,
        }
    }

    #[must_use]
    pub fn options(&self) -> Option<&[TestOptionUpdate]> {
        match self {
            Self::SelectOne { options } | Self::SelectMultiple { options } => options.as_deref(),
            Self::TextShort | Self::TextLong => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FormQuestionUpdate, QuestionPayload};
    use crate::model::form::QuestionKind;

    #[test]
    fn question_payload_deserializes_by_kind_tag() {
        let json = r#"{
            "id": 7,
            "text": "How satisfied are you?",
            "required": true,
            "image_alt": null,
            "kind": "slider",
            "min": 1,
            "max": 10,
            "labels": [
                { "id": null, "text": "not at all", "image_alt": null },
                { "id": null, "text": "very", "image_alt": null }
            ]
        }"#;

        let update: FormQuestionUpdate = serde_json::from_str(json).expect("parse");
        assert_eq!(update.payload.kind(), QuestionKind::Slider);
        assert_eq!(update.payload.slider_bounds(), Some((1, 10)));
        assert_eq!(update.payload.labels().map(<[_]>::len), Some(2));
        assert!(update.payload.options().is_none());
    }

    #[test]
    fn test_question_options_deserialize_with_the_payload() {
        use super::TestQuestionUpdate;
        use crate::model::testing::TestQuestionKind;

        let json = r#"{
            "id": null,
            "text": "Mood?",
            "required": false,
            "image_alt": null,
            "kind": "select_one",
            "options": [
                { "id": 3, "text": "good", "image_alt": "smiley" },
                { "id": null, "text": "bad", "image_alt": null }
            ]
        }"#;

        let update: TestQuestionUpdate = serde_json::from_str(json).expect("parse");
        assert_eq!(update.payload.kind(), TestQuestionKind::SelectOne);
        let options = update.payload.options().expect("options");
        assert_eq!(options[0].id, Some(3));
        assert_eq!(options[0].image_alt.as_deref(), Some("smiley"));
        assert_eq!(options[1].text, "bad");
    }

    #[test]
    fn text_variants_carry_no_children() {
        let payload = QuestionPayload::TextShort;
        assert!(payload.options().is_none());
        assert!(payload.labels().is_none());
        assert_eq!(payload.kind(), QuestionKind::TextShort);
    }
}
