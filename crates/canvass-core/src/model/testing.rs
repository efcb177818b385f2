//! Entities on the test side of the configuration tree:
//! test groups → protocols → phases → questions → options.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::image::ImageRef;

/// The kinds of test question. Tests carry no slider questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestQuestionKind {
    SelectOne,
    SelectMultiple,
    TextShort,
    TextLong,
}

impl TestQuestionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SelectOne => "select_one",
            Self::SelectMultiple => "select_multiple",
            Self::TextShort => "text_short",
            Self::TextLong => "text_long",
        }
    }
}

impl fmt::Display for TestQuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestQuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "select_one" => Ok(Self::SelectOne),
            "select_multiple" => Ok(Self::SelectMultiple),
            "text_short" => Ok(Self::TextShort),
            "text_long" => Ok(Self::TextLong),
            other => Err(format!("unknown test question kind: {other}")),
        }
    }
}

/// A test group participants are sampled into.
///
/// `probability` is an integer percentage (`0..=100`). Group probabilities
/// need not sum to exactly 100; the sampler treats them as a partition of
/// whatever they do sum to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestGroup {
    pub id: Option<i64>,
    pub ord: u32,
    pub label: String,
    pub probability: u8,
    pub image: Option<ImageRef>,
}

/// A protocol within a test group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protocol {
    pub id: Option<i64>,
    pub group_id: i64,
    pub ord: u32,
    pub name: String,
    pub summary: String,
    pub image: Option<ImageRef>,
}

/// A phase within a protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub id: Option<i64>,
    pub protocol_id: i64,
    pub ord: u32,
    pub title: String,
    pub duration_days: Option<u32>,
    pub image: Option<ImageRef>,
}

/// One question of a test phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestQuestion {
    pub id: Option<i64>,
    pub phase_id: i64,
    pub ord: u32,
    pub text: String,
    pub required: bool,
    pub kind: TestQuestionKind,
    pub image: Option<ImageRef>,
}

/// A selectable answer option of a test question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOption {
    pub id: Option<i64>,
    pub question_id: i64,
    pub ord: u32,
    pub text: String,
    pub image: Option<ImageRef>,
}
