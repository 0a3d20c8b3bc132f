use serde::Serialize;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question must have exactly {expected} options, got {actual}")]
    OptionCount { expected: usize, actual: usize },

    #[error("option {index} cannot be empty")]
    EmptyOption { index: usize },

    #[error("correct answer index {index} does not address one of {option_count} options")]
    CorrectIndexOutOfRange { index: usize, option_count: usize },
}

//
// ─── QUESTION ITEM ─────────────────────────────────────────────────────────────
//

/// A single multiple-choice quiz question.
///
/// Immutable once built. The constructor guarantees that `correct_index`
/// addresses one of the options, so the engine never has to re-check it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionItem {
    id: QuestionId,
    prompt: String,
    options: Vec<String>,
    correct_index: usize,
    rationale: String,
}

impl QuestionItem {
    /// Number of options every question carries.
    pub const OPTION_COUNT: usize = 4;

    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt or an option is blank, the option
    /// count is not `OPTION_COUNT`, or `correct_index` is out of range.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_index: usize,
        rationale: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into().trim().to_string();
        if prompt.is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if options.len() != Self::OPTION_COUNT {
            return Err(QuestionError::OptionCount {
                expected: Self::OPTION_COUNT,
                actual: options.len(),
            });
        }
        if let Some(index) = options.iter().position(|opt| opt.trim().is_empty()) {
            return Err(QuestionError::EmptyOption { index });
        }
        if correct_index >= options.len() {
            return Err(QuestionError::CorrectIndexOutOfRange {
                index: correct_index,
                option_count: options.len(),
            });
        }

        Ok(Self {
            id,
            prompt,
            options,
            correct_index,
            rationale: rationale.into().trim().to_string(),
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    #[must_use]
    pub fn rationale(&self) -> &str {
        &self.rationale
    }

    #[must_use]
    pub fn is_correct(&self, index: usize) -> bool {
        index == self.correct_index
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
