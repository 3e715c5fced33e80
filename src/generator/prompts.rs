//! Prompt templates for question generation.

use crate::models::{BLANK_MARKER, Difficulty, GenerationRequest, QuestionType};

const MCQ_TEMPLATE: &str = r#"Generate a {difficulty} multiple-choice question about {topic}.

Return ONLY a JSON object with exactly these fields:
- "question": the question text
- "options": an array of exactly 4 possible answers, as plain strings
- "correct_answer": the correct answer, copied exactly from "options"

Example:
{"question": "What is the capital of France?", "options": ["London", "Berlin", "Paris", "Madrid"], "correct_answer": "Paris"}

Do not add explanations, markdown or any text outside the JSON object."#;

const FILL_BLANK_TEMPLATE: &str = r#"Generate a {difficulty} fill-in-the-blank question about {topic}.

Return ONLY a JSON object with exactly these fields:
- "question": a sentence in which the missing word or phrase is replaced by {blank}
- "answer": the word or phrase that belongs in the blank

Example:
{"question": "The capital of France is {blank}.", "answer": "Paris"}

The question MUST contain {blank}. Do not add explanations, markdown or any text outside the JSON object."#;

/// Prompt for a multiple-choice question.
pub fn mcq_prompt(topic: &str, difficulty: Difficulty) -> String {
    MCQ_TEMPLATE
        .replace("{topic}", topic)
        .replace("{difficulty}", difficulty.as_str())
}

/// Prompt for a fill-in-the-blank question.
pub fn fill_blank_prompt(topic: &str, difficulty: Difficulty) -> String {
    FILL_BLANK_TEMPLATE
        .replace("{blank}", BLANK_MARKER)
        .replace("{topic}", topic)
        .replace("{difficulty}", difficulty.as_str())
}

/// Prompt for the request's question type.
pub fn prompt_for(request: &GenerationRequest) -> String {
    match request.question_type {
        QuestionType::Mcq => mcq_prompt(&request.topic, request.difficulty),
        QuestionType::FillBlank => fill_blank_prompt(&request.topic, request.difficulty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_name_topic_and_difficulty() {
        let prompt = mcq_prompt("photosynthesis", Difficulty::Hard);
        assert!(prompt.starts_with("Generate a hard multiple-choice question about photosynthesis."));
        assert!(!prompt.contains("{topic}"));

        let prompt = fill_blank_prompt("the Roman empire", Difficulty::Easy);
        assert!(prompt.contains("easy fill-in-the-blank question about the Roman empire"));
        assert!(prompt.contains("MUST contain _____"));
        assert!(!prompt.contains("{blank}"));
    }
}
