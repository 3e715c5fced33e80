//! Quiz session: questions, answers, scoring and export.

pub mod export;
mod manager;

pub use export::{read_csv, save_csv, save_csv_to, to_csv_string, write_csv};
pub use manager::*;

use serde::{Deserialize, Serialize};

/// One scored row of a finished quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    /// 1-based position in the quiz
    pub question_number: usize,
    pub question: String,
    /// Display label of the question type
    pub question_type: String,
    pub user_answer: String,
    pub correct_answer: String,
    /// Empty for fill-in-the-blank; stored as a JSON array in CSV
    #[serde(with = "json_list")]
    pub options: Vec<String>,
    pub is_correct: bool,
}

/// Serialize a list of strings as one JSON-array field.
mod json_list {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(items: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = serde_json::to_string(items).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&encoded)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        if encoded.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&encoded).map_err(D::Error::custom)
    }
}
