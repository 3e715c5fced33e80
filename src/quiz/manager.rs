//! Quiz manager: holds a generated quiz, the user's answers and the results.

use crate::generator::QuestionGenerator;
use crate::models::{GenerationRequest, Question, QuestionType, QuizError, Result};
use crate::quiz::QuizResult;
use tracing::info;

/// Score over a set of results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreSummary {
    pub correct: usize,
    pub total: usize,
    pub percentage: f64,
}

/// Compare an answer with the stored correct answer.
///
/// Multiple choice is exact; fill-in-the-blank ignores case and surrounding
/// whitespace.
pub fn is_correct(question: &Question, user_answer: &str) -> bool {
    match question {
        Question::Mcq(q) => user_answer == q.correct_answer(),
        Question::FillBlank(q) => {
            user_answer.trim().to_lowercase() == q.answer().trim().to_lowercase()
        }
    }
}

#[derive(Debug, Default)]
pub struct QuizManager {
    questions: Vec<Question>,
    user_answers: Vec<String>,
    results: Vec<QuizResult>,
}

impl QuizManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a quiz from already generated questions.
    pub fn with_questions(questions: Vec<Question>) -> Self {
        Self {
            questions,
            ..Self::default()
        }
    }

    /// Generate `count` questions one after another.
    ///
    /// Any previous quiz is discarded. If a question cannot be generated the
    /// error is returned and the manager is left empty.
    pub async fn generate_questions(
        &mut self,
        generator: &QuestionGenerator,
        request: &GenerationRequest,
        count: usize,
    ) -> Result<usize> {
        self.reset();

        let mut questions = Vec::with_capacity(count);
        for index in 0..count {
            info!(
                question = index + 1,
                total = count,
                topic = %request.topic,
                "Requesting question"
            );
            questions.push(generator.generate(request).await?);
        }

        self.questions = questions;
        Ok(self.questions.len())
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Record the answer to the question at `index` (0-based).
    pub fn set_answer(&mut self, index: usize, answer: impl Into<String>) -> Result<()> {
        if index >= self.questions.len() {
            return Err(QuizError::InvalidRequest(format!(
                "no question {} (quiz has {})",
                index + 1,
                self.questions.len()
            )));
        }

        if self.user_answers.len() < self.questions.len() {
            self.user_answers.resize(self.questions.len(), String::new());
        }
        self.user_answers[index] = answer.into();
        Ok(())
    }

    /// Record all answers in question order.
    pub fn set_answers<I, S>(&mut self, answers: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for (index, answer) in answers.into_iter().enumerate() {
            self.set_answer(index, answer)?;
        }
        Ok(())
    }

    pub fn user_answers(&self) -> &[String] {
        &self.user_answers
    }

    /// Score every question. Unanswered questions count as empty answers.
    pub fn evaluate(&mut self) -> &[QuizResult] {
        self.results = self
            .questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let user_answer = self
                    .user_answers
                    .get(index)
                    .cloned()
                    .unwrap_or_default();
                QuizResult {
                    question_number: index + 1,
                    question: question.text().to_string(),
                    question_type: question.question_type().label().to_string(),
                    is_correct: is_correct(question, &user_answer),
                    user_answer,
                    correct_answer: question.correct_answer().to_string(),
                    options: question.options().to_vec(),
                }
            })
            .collect();

        let summary = self.score();
        info!(
            correct = summary.correct,
            total = summary.total,
            "Quiz evaluated"
        );
        &self.results
    }

    pub fn results(&self) -> &[QuizResult] {
        &self.results
    }

    pub fn score(&self) -> ScoreSummary {
        let total = self.results.len();
        let correct = self.results.iter().filter(|r| r.is_correct).count();
        let percentage = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64 * 100.0
        };
        ScoreSummary {
            correct,
            total,
            percentage,
        }
    }

    /// Count of questions of the given type.
    pub fn count_of(&self, question_type: QuestionType) -> usize {
        self.questions
            .iter()
            .filter(|q| q.question_type() == question_type)
            .count()
    }

    pub fn reset(&mut self) {
        self.questions.clear();
        self.user_answers.clear();
        self.results.clear();
    }
}
