//! Schema validation for parsed questions.
//!
//! Text fields are cleaned before checks: trimmed, and if the model nested a
//! field inside an object (`{"description": "..."}`) the `description` is used.

use crate::generator::parser::RawQuestion;
use crate::models::{
    BLANK_MARKER, FillBlankQuestion, McqQuestion, Question, QuestionType, QuizError, Result,
};
use serde_json::Value;

/// Number of options a multiple-choice question must have.
pub const MCQ_OPTION_COUNT: usize = 4;

/// Coerce a JSON value into trimmed text.
pub fn clean_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Object(map) => match map.get("description") {
            Some(description) => clean_text(description),
            None => value.to_string().trim().to_string(),
        },
        Value::Null => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

fn clean_options(value: Option<&Value>) -> Result<Vec<String>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.iter().map(clean_text).collect()),
        Some(_) => Err(invalid("options must be a list of strings")),
    }
}

fn text_field(raw: &RawQuestion, key: &str) -> String {
    raw.get(key).map(clean_text).unwrap_or_default()
}

fn invalid(message: &str) -> QuizError {
    QuizError::Validation(message.to_string())
}

/// Validate a multiple-choice question.
///
/// Duplicate options are allowed; only emptiness and membership are checked.
pub fn validate_mcq(raw: &RawQuestion) -> Result<McqQuestion> {
    let question = text_field(raw, "question");
    let options = clean_options(raw.get("options"))?;
    let correct_answer = text_field(raw, "correct_answer");

    if question.is_empty() {
        return Err(invalid("question cannot be empty"));
    }
    if options.len() != MCQ_OPTION_COUNT {
        return Err(QuizError::Validation(format!(
            "options must contain exactly {MCQ_OPTION_COUNT} items, got {}",
            options.len()
        )));
    }
    if options.iter().any(|o| o.is_empty()) {
        return Err(invalid("options cannot contain empty strings"));
    }
    if correct_answer.is_empty() {
        return Err(invalid("correct_answer cannot be empty"));
    }
    if !options.contains(&correct_answer) {
        return Err(QuizError::Validation(format!(
            "correct_answer '{correct_answer}' must be one of the options"
        )));
    }

    Ok(McqQuestion::new_unchecked(question, options, correct_answer))
}

/// Validate a fill-in-the-blank question.
pub fn validate_fill_blank(raw: &RawQuestion) -> Result<FillBlankQuestion> {
    let question = text_field(raw, "question");
    let answer = text_field(raw, "answer");

    if question.is_empty() {
        return Err(invalid("question cannot be empty"));
    }
    if answer.is_empty() {
        return Err(invalid("answer cannot be empty"));
    }
    if !question.contains(BLANK_MARKER) {
        return Err(QuizError::Validation(format!(
            "question must contain '{BLANK_MARKER}'"
        )));
    }

    Ok(FillBlankQuestion::new_unchecked(question, answer))
}

/// Validate a parsed question of either shape.
pub fn validate(raw: &RawQuestion) -> Result<Question> {
    match raw.question_type {
        QuestionType::Mcq => validate_mcq(raw).map(Question::from),
        QuestionType::FillBlank => validate_fill_blank(raw).map(Question::from),
    }
}
