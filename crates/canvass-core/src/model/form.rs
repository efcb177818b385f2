//! Entities on the form side of the configuration tree:
//! FAQs and info cards (flat, global collections) and form questions with
//! their options and slider labels.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::image::ImageRef;

/// The five kinds of form question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    SelectOne,
    SelectMultiple,
    Slider,
    TextShort,
    TextLong,
}

impl QuestionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SelectOne => "select_one",
            Self::SelectMultiple => "select_multiple",
            Self::Slider => "slider",
            Self::TextShort => "text_short",
            Self::TextLong => "text_long",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "select_one" => Ok(Self::SelectOne),
            "select_multiple" => Ok(Self::SelectMultiple),
            "slider" => Ok(Self::Slider),
            "text_short" => Ok(Self::TextShort),
            "text_long" => Ok(Self::TextLong),
            other => Err(format!("unknown question kind: {other}")),
        }
    }
}

/// A frequently-asked question shown alongside the survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    pub id: Option<i64>,
    pub ord: u32,
    pub question: String,
    pub answer: String,
    pub image: Option<ImageRef>,
}

/// An informational card with a highlight color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoCard {
    pub id: Option<i64>,
    pub ord: u32,
    pub title: String,
    pub body: String,
    /// 24-bit RGB, `0..=0xFFFFFF`.
    pub color: u32,
    pub image: Option<ImageRef>,
}

/// One question of a form.
///
/// `slider_min`/`slider_max` are populated only when `kind` is
/// [`QuestionKind::Slider`]; option and slider-label children live in their
/// own collections keyed by `question_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormQuestion {
    pub id: Option<i64>,
    pub form_id: i64,
    pub ord: u32,
    pub text: String,
    pub required: bool,
    pub kind: QuestionKind,
    pub slider_min: Option<i32>,
    pub slider_max: Option<i32>,
    pub image: Option<ImageRef>,
}

/// A selectable answer option of a select question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormOption {
    pub id: Option<i64>,
    pub question_id: i64,
    pub ord: u32,
    pub text: String,
    pub image: Option<ImageRef>,
}

/// A tick label of a slider question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliderLabel {
    pub id: Option<i64>,
    pub question_id: i64,
    pub ord: u32,
    pub text: String,
    pub image: Option<ImageRef>,
}

#[cfg(test)]
mod tests {
    use super::QuestionKind;
    use std::str::FromStr;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [
            QuestionKind::SelectOne,
            QuestionKind::SelectMultiple,
            QuestionKind::Slider,
            QuestionKind::TextShort,
            QuestionKind::TextLong,
        ] {
            assert_eq!(QuestionKind::from_str(kind.as_str()), Ok(kind));
        }
        assert!(QuestionKind::from_str("ranking").is_err());
    }
}
