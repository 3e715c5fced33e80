//! CSV export of quiz results.

use crate::models::{QuizError, Result};
use crate::quiz::QuizResult;
use chrono::Local;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Column order of the results CSV.
pub const CSV_HEADER: [&str; 7] = [
    "question_number",
    "question",
    "question_type",
    "user_answer",
    "correct_answer",
    "options",
    "is_correct",
];

/// Write results as CSV with a header row, even when there are no results.
pub fn write_csv<W: Write>(results: &[QuizResult], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    // serialize() only emits headers alongside the first record
    if results.is_empty() {
        csv_writer.write_record(CSV_HEADER)?;
    }
    for result in results {
        csv_writer.serialize(result)?;
    }
    csv_writer
        .flush()
        .map_err(|e| QuizError::io("flushing CSV output", e))?;
    Ok(())
}

/// Results as a UTF-8 CSV string.
pub fn to_csv_string(results: &[QuizResult]) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(results, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| QuizError::Parse(format!("CSV is not UTF-8: {e}")))
}

/// Read results written by [`write_csv`].
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<QuizResult>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut results = Vec::new();
    for record in csv_reader.deserialize() {
        results.push(record?);
    }
    Ok(results)
}

/// Save results to `<dir>/<prefix>_<YYYYmmdd_HHMMSS>.csv`.
pub fn save_csv(results: &[QuizResult], dir: &Path, prefix: &str) -> Result<PathBuf> {
    if results.is_empty() {
        return Err(QuizError::InvalidRequest("no results to save".to_string()));
    }

    fs::create_dir_all(dir).map_err(|e| QuizError::io("creating results directory", e))?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("{prefix}_{timestamp}.csv"));
    save_csv_to(results, &path)?;
    Ok(path)
}

/// Save results to an explicit path, replacing any existing file.
pub fn save_csv_to(results: &[QuizResult], path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| QuizError::io("creating CSV file", e))?;
    write_csv(results, BufWriter::new(file))?;
    info!(path = %path.display(), rows = results.len(), "Saved quiz results");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn results() -> Vec<QuizResult> {
        vec![
            QuizResult {
                question_number: 1,
                question: "Capital of France?".to_string(),
                question_type: "Multiple Choice Question".to_string(),
                user_answer: "Paris".to_string(),
                correct_answer: "Paris".to_string(),
                options: vec![
                    "Berlin".to_string(),
                    "Paris, France".to_string(),
                    "Paris".to_string(),
                    "\"Madrid\"".to_string(),
                ],
                is_correct: true,
            },
            QuizResult {
                question_number: 2,
                question: "Ein Apfel heißt auf Englisch _____.".to_string(),
                question_type: "Fill in the Blank".to_string(),
                user_answer: " pear\n".to_string(),
                correct_answer: "apple".to_string(),
                options: Vec::new(),
                is_correct: false,
            },
        ]
    }

    #[test]
    fn test_header_row() {
        let csv = to_csv_string(&results()).unwrap();
        let header = csv.lines().next().unwrap();
        assert_eq!(header, CSV_HEADER.join(","));
    }

    #[test]
    fn test_empty_results_still_have_header() {
        let csv = to_csv_string(&[]).unwrap();
        assert_eq!(
            csv,
            "question_number,question,question_type,user_answer,correct_answer,options,is_correct\n"
        );
        assert!(read_csv(csv.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_round_trip() {
        let original = results();
        let csv = to_csv_string(&original).unwrap();
        let parsed = read_csv(csv.as_bytes()).unwrap();

        assert_eq!(parsed.len(), original.len());
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_save_csv_timestamped() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("results");

        let path = save_csv(&results(), &dir, "quiz_results").unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("quiz_results_"));
        assert!(name.ends_with(".csv"));

        let parsed = read_csv(File::open(&path).unwrap()).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_save_nothing_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            save_csv(&[], temp_dir.path(), "quiz_results"),
            Err(QuizError::InvalidRequest(_))
        ));
    }
}
