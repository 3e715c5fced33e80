//! Question and request types.
//!
//! Questions are only built by the schema validator, so a value of these
//! types always satisfies its invariants. Fields are read through accessors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::QuizError;

/// Placeholder a fill-in-the-blank question must contain.
pub const BLANK_MARKER: &str = "_____";

/// Multiple-choice question with exactly four options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct McqQuestion {
    question: String,
    options: Vec<String>,
    correct_answer: String,
}

impl McqQuestion {
    /// Invariants are checked by the schema validator before this is called.
    pub(crate) fn new_unchecked(
        question: String,
        options: Vec<String>,
        correct_answer: String,
    ) -> Self {
        Self {
            question,
            options,
            correct_answer,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    /// 0-based index of the correct answer in `options`.
    ///
    /// With duplicate options this is the first match.
    pub fn correct_option(&self) -> usize {
        self.options
            .iter()
            .position(|o| *o == self.correct_answer)
            .unwrap_or_default()
    }
}

/// Fill-in-the-blank question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FillBlankQuestion {
    question: String,
    answer: String,
}

impl FillBlankQuestion {
    pub(crate) fn new_unchecked(question: String, answer: String) -> Self {
        Self { question, answer }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }
}

/// A validated question of either shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Question {
    Mcq(McqQuestion),
    FillBlank(FillBlankQuestion),
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        match self {
            Self::Mcq(_) => QuestionType::Mcq,
            Self::FillBlank(_) => QuestionType::FillBlank,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Mcq(q) => q.question(),
            Self::FillBlank(q) => q.question(),
        }
    }

    pub fn correct_answer(&self) -> &str {
        match self {
            Self::Mcq(q) => q.correct_answer(),
            Self::FillBlank(q) => q.answer(),
        }
    }

    /// Options to choose from; empty for fill-in-the-blank.
    pub fn options(&self) -> &[String] {
        match self {
            Self::Mcq(q) => q.options(),
            Self::FillBlank(_) => &[],
        }
    }
}

impl From<McqQuestion> for Question {
    fn from(q: McqQuestion) -> Self {
        Self::Mcq(q)
    }
}

impl From<FillBlankQuestion> for Question {
    fn from(q: FillBlankQuestion) -> Self {
        Self::FillBlank(q)
    }
}

/// Question difficulty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(QuizError::InvalidRequest(format!(
                "unknown difficulty '{other}' (expected easy, medium or hard)"
            ))),
        }
    }
}

/// Kind of question to generate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[default]
    Mcq,
    FillBlank,
}

impl QuestionType {
    /// Human-readable label, as shown in results.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mcq => "Multiple Choice Question",
            Self::FillBlank => "Fill in the Blank",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mcq => f.write_str("mcq"),
            Self::FillBlank => f.write_str("fill_blank"),
        }
    }
}

impl FromStr for QuestionType {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "mcq" | "multiple_choice" | "multiple_choice_question" => Ok(Self::Mcq),
            "fill_blank" | "fill_in_the_blank" | "blank" => Ok(Self::FillBlank),
            _ => Err(QuizError::InvalidRequest(format!(
                "unknown question type '{}' (expected mcq or fill-blank)",
                s.trim()
            ))),
        }
    }
}

/// One question to generate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub question_type: QuestionType,
}

impl GenerationRequest {
    /// Build a request; the topic must be non-empty after trimming.
    pub fn new(
        topic: impl Into<String>,
        difficulty: Difficulty,
        question_type: QuestionType,
    ) -> Result<Self, QuizError> {
        let topic = topic.into().trim().to_string();
        if topic.is_empty() {
            return Err(QuizError::InvalidRequest(
                "topic must not be empty".to_string(),
            ));
        }
        Ok(Self {
            topic,
            difficulty,
            question_type,
        })
    }
}
