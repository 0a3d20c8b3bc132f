use std::collections::BTreeMap;

use quiz_core::model::{QuestionId, QuestionItem, SessionState};
use quiz_core::{BankSource, QuestionBank};
use serde::Serialize;

use super::progress::QuizProgress;

/// Presentation-agnostic view of one question.
///
/// The correct option and rationale are only revealed once the player has
/// answered the question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub id: QuestionId,
    /// 1-based position, for "Question 1 of N" labels.
    pub number: usize,
    pub total: usize,
    pub prompt: String,
    pub options: Vec<String>,
    pub selected: Option<usize>,
    pub correct_index: Option<usize>,
    pub rationale: Option<String>,
}

impl QuestionView {
    #[must_use]
    pub fn new(question: &QuestionItem, index: usize, total: usize, state: &SessionState) -> Self {
        let selected = state.selected_answer(question.id());
        let revealed = selected.is_some();
        Self {
            id: question.id(),
            number: index + 1,
            total,
            prompt: question.prompt().to_string(),
            options: question.options().to_vec(),
            selected,
            correct_index: revealed.then(|| question.correct_index()),
            rationale: revealed.then(|| question.rationale().to_string()),
        }
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.selected.is_some()
    }
}

/// Read-only copy of the session state for rendering.
///
/// No pre-formatted strings; the presentation layer decides how to show them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub player_name: String,
    pub session_id: String,
    pub score: i64,
    pub level: u32,
    pub xp: u32,
    pub mission_progress: u8,
    pub current_question_index: usize,
    pub current_question: Option<QuestionView>,
    pub selected_answers: BTreeMap<QuestionId, usize>,
    pub quiz_completed: bool,
    pub badges: Vec<String>,
    pub progress: QuizProgress,
    pub from_remote_bank: bool,
}

impl SessionSnapshot {
    #[must_use]
    pub fn capture(state: &SessionState, bank: &QuestionBank, source: BankSource) -> Self {
        let index = state.current_question_index();
        let current_question = bank
            .get(index)
            .ok()
            .map(|question| QuestionView::new(question, index, bank.count(), state));

        Self {
            player_name: state.player_name().to_string(),
            session_id: state.session_id().to_string(),
            score: state.score(),
            level: state.level(),
            xp: state.xp(),
            mission_progress: state.mission_progress(),
            current_question_index: index,
            current_question,
            selected_answers: state
                .selected_answers()
                .iter()
                .map(|(id, choice)| (*id, *choice))
                .collect(),
            quiz_completed: state.quiz_completed(),
            badges: state.badges().iter().cloned().collect(),
            progress: QuizProgress::new(
                bank.count(),
                state.answered_count(),
                state.quiz_completed(),
            ),
            from_remote_bank: source == BankSource::Remote,
        }
    }
}
