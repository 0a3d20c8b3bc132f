use std::collections::HashSet;

use thiserror::Error;

use crate::engine::EngineError;
use crate::model::{QuestionId, QuestionItem};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BankError {
    #[error("question bank cannot be empty")]
    Empty,

    #[error("duplicate question id {0}")]
    DuplicateId(QuestionId),
}

/// Where the questions of a bank came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankSource {
    BuiltIn,
    Remote,
}

//
// ─── QUESTION BANK ─────────────────────────────────────────────────────────────
//

/// Immutable, ordered, non-empty list of questions with unique ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    items: Vec<QuestionItem>,
}

impl QuestionBank {
    /// Build a bank from validated items.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Empty` for an empty list and `BankError::DuplicateId`
    /// if two items share an id.
    pub fn new(items: Vec<QuestionItem>) -> Result<Self, BankError> {
        if items.is_empty() {
            return Err(BankError::Empty);
        }
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id()) {
                return Err(BankError::DuplicateId(item.id()));
            }
        }
        Ok(Self { items })
    }

    /// The questions shipped with the game.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            items: builtin_questions(),
        }
    }

    /// Use `candidates` if any survive, the built-in list otherwise.
    ///
    /// Later items repeating an earlier id are dropped one by one rather than
    /// rejecting the whole batch.
    #[must_use]
    pub fn with_fallback(candidates: Vec<QuestionItem>) -> (Self, BankSource) {
        let mut seen = HashSet::with_capacity(candidates.len());
        let items: Vec<QuestionItem> = candidates
            .into_iter()
            .filter(|item| seen.insert(item.id()))
            .collect();

        match Self::new(items) {
            Ok(bank) => (bank, BankSource::Remote),
            Err(_) => (Self::builtin(), BankSource::BuiltIn),
        }
    }

    /// Question at `index`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::OutOfRange` if `index` is not in `[0, count)`.
    pub fn get(&self, index: usize) -> Result<&QuestionItem, EngineError> {
        self.items.get(index).ok_or(EngineError::OutOfRange {
            index: i64::try_from(index).unwrap_or(i64::MAX),
            count: self.items.len(),
        })
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn find(&self, id: QuestionId) -> Option<&QuestionItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    #[must_use]
    pub fn position_of(&self, id: QuestionId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: QuestionId) -> bool {
        self.find(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuestionItem> {
        self.items.iter()
    }

    pub fn question_ids(&self) -> impl Iterator<Item = QuestionId> + '_ {
        self.items.iter().map(QuestionItem::id)
    }

    /// Index of the last question.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.items.len().saturating_sub(1)
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_questions() -> Vec<QuestionItem> {
    let specs: [(u64, &str, [&str; 4], usize, &str); 2] = [
        (
            1,
            "What is the MOST likely sign of a phishing email?",
            [
                "Urgent action required message",
                "Professional company logo",
                "Correct spelling and grammar",
                "Legitimate sender email address",
            ],
            0,
            "Phishing emails often create a sense of urgency to pressure victims.",
        ),
        (
            2,
            "Which URL is MOST suspicious?",
            [
                "https://google.com",
                "https://g00gle-security.com",
                "https://accounts.google.com",
                "https://drive.google.com",
            ],
            1,
            "The URL 'g00gle-security.com' uses zeros instead of 'o's - a common trick.",
        ),
    ];

    specs
        .into_iter()
        .filter_map(|(id, prompt, options, correct, rationale)| {
            QuestionItem::new(
                QuestionId::new(id),
                prompt,
                options.iter().map(|opt| (*opt).to_string()).collect(),
                correct,
                rationale,
            )
            .ok()
        })
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: u64, correct: usize) -> QuestionItem {
        QuestionItem::new(
            QuestionId::new(id),
            format!("Q{id}"),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct,
            format!("R{id}"),
        )
        .unwrap()
    }

    #[test]
    fn builtin_bank_has_two_questions() {
        let bank = QuestionBank::builtin();
        assert_eq!(bank.count(), 2);
        assert_eq!(bank.get(0).unwrap().correct_index(), 0);
        assert_eq!(bank.get(1).unwrap().correct_index(), 1);
    }

    #[test]
    fn get_out_of_range_fails() {
        let bank = QuestionBank::builtin();
        let err = bank.get(2).unwrap_err();
        assert_eq!(err, EngineError::OutOfRange { index: 2, count: 2 });
    }

    #[test]
    fn new_rejects_empty_and_duplicates() {
        assert_eq!(QuestionBank::new(Vec::new()).unwrap_err(), BankError::Empty);
        let err = QuestionBank::new(vec![question(1, 0), question(1, 1)]).unwrap_err();
        assert_eq!(err, BankError::DuplicateId(QuestionId::new(1)));
    }

    #[test]
    fn fallback_on_empty_candidates_equals_builtin() {
        let (bank, source) = QuestionBank::with_fallback(Vec::new());
        assert_eq!(source, BankSource::BuiltIn);
        assert_eq!(bank, QuestionBank::builtin());
    }

    #[test]
    fn fallback_drops_later_duplicates_individually() {
        let (bank, source) =
            QuestionBank::with_fallback(vec![question(5, 0), question(5, 3), question(6, 1)]);
        assert_eq!(source, BankSource::Remote);
        assert_eq!(bank.count(), 2);
        assert_eq!(bank.find(QuestionId::new(5)).unwrap().correct_index(), 0);
        assert_eq!(bank.position_of(QuestionId::new(6)), Some(1));
    }
}
