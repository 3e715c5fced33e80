//! Structured output parser.
//!
//! Turns raw model text into a JSON object for the requested question shape.
//! Models often wrap the object in a code fence or a sentence of prose, so the
//! object is located before it is decoded.

use crate::models::{QuestionType, QuizError, Result};
use regex::Regex;
use serde_json::{Map, Value};

/// A decoded but not yet validated question object.
#[derive(Debug, Clone, PartialEq)]
pub struct RawQuestion {
    pub question_type: QuestionType,
    pub fields: Map<String, Value>,
}

impl RawQuestion {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Keys the model must produce for each shape.
pub fn required_fields(question_type: QuestionType) -> &'static [&'static str] {
    match question_type {
        QuestionType::Mcq => &["question", "options", "correct_answer"],
        QuestionType::FillBlank => &["question", "answer"],
    }
}

/// Locate the JSON object in model output.
fn extract_object(content: &str) -> Option<&str> {
    // Fenced block first
    let re = Regex::new(r"(?s)```[A-Za-z]*\s*(\{.*\})\s*```").ok()?;
    if let Some(captures) = re.captures(content) {
        return captures.get(1).map(|m| m.as_str());
    }

    // Outermost braces as fallback
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (start < end).then(|| &content[start..=end])
}

/// Parse model output into the fields of `question_type`.
pub fn parse(content: &str, question_type: QuestionType) -> Result<RawQuestion> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(QuizError::Parse("model returned no content".to_string()));
    }

    let object = extract_object(trimmed).ok_or_else(|| {
        QuizError::Parse(format!("no JSON object in model output: {}", preview(trimmed)))
    })?;

    let value: Value = serde_json::from_str(object)
        .map_err(|e| QuizError::Parse(format!("invalid JSON in model output: {e}")))?;

    let Value::Object(fields) = value else {
        return Err(QuizError::Parse("model output is not a JSON object".to_string()));
    };

    if let Some(missing) = required_fields(question_type)
        .iter()
        .find(|key| !fields.contains_key(**key))
    {
        return Err(QuizError::Parse(format!(
            "missing field `{missing}` for {question_type} question"
        )));
    }

    Ok(RawQuestion {
        question_type,
        fields,
    })
}

fn preview(content: &str) -> String {
    const MAX: usize = 120;
    if content.chars().count() <= MAX {
        content.to_string()
    } else {
        let head: String = content.chars().take(MAX).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MCQ: &str = r#"{"question": "2 + 2?", "options": ["3", "4", "5", "6"], "correct_answer": "4"}"#;

    #[test]
    fn test_bare_object() {
        let raw = parse(MCQ, QuestionType::Mcq).unwrap();
        assert_eq!(raw.get("correct_answer").unwrap(), "4");
        assert_eq!(raw.question_type, QuestionType::Mcq);
    }

    #[test]
    fn test_fenced_and_prose() {
        let fenced = format!("Here you go:\n```json\n{MCQ}\n```\nGood luck!");
        assert!(parse(&fenced, QuestionType::Mcq).is_ok());

        let plain_fence = format!("```\n{MCQ}\n```");
        assert!(parse(&plain_fence, QuestionType::Mcq).is_ok());

        let prose = format!("Sure! {MCQ} Hope this helps.");
        assert!(parse(&prose, QuestionType::Mcq).is_ok());
    }

    #[test]
    fn test_nested_object_in_fence() {
        let content = r#"```json
{"question": {"description": "Capital of Italy?"}, "options": ["Rome", "Milan", "Turin", "Naples"], "correct_answer": "Rome"}
```"#;
        let raw = parse(content, QuestionType::Mcq).unwrap();
        assert!(raw.get("question").unwrap().is_object());
    }

    #[test]
    fn test_rejects_malformed_output() {
        assert!(matches!(
            parse("   ", QuestionType::Mcq),
            Err(QuizError::Parse(_))
        ));
        assert!(matches!(
            parse("I cannot help with that.", QuestionType::Mcq),
            Err(QuizError::Parse(_))
        ));
        assert!(matches!(
            parse(r#"{"question": "2 + 2?", "options": ["3", "4""#, QuestionType::Mcq),
            Err(QuizError::Parse(_))
        ));
        assert!(matches!(
            parse(r#"["not", "an", "object"]"#, QuestionType::Mcq),
            Err(QuizError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_required_field() {
        let err = parse(r#"{"question": "The sky is _____."}"#, QuestionType::FillBlank)
            .unwrap_err();
        assert!(err.to_string().contains("missing field `answer`"));

        // Fill-blank shape is not enough for an MCQ
        assert!(parse(r#"{"question": "q", "answer": "a"}"#, QuestionType::Mcq).is_err());
    }
}
