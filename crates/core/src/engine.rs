use serde::Serialize;
use thiserror::Error;

use crate::bank::QuestionBank;
use crate::model::{
    ActionDelta, ActionId, ActionTable, MAX_MISSION_PROGRESS, PlayerAction, QuestionId,
    SessionState,
};
use crate::navigation;

/// Points awarded for a correct first answer.
pub const CORRECT_ANSWER_BONUS: i64 = 50;

/// Badge earned the first time every question has an answer.
pub const COMPLETION_BADGE: &str = "Phishing Spotter";

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Rejections raised before any state is touched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineError {
    #[error("index {index} is outside the question bank (0..{count})")]
    OutOfRange { index: i64, count: usize },

    #[error("unknown question id {0}")]
    UnknownQuestion(QuestionId),

    #[error("option {index} is not valid for question {question_id} ({option_count} options)")]
    InvalidOption {
        question_id: QuestionId,
        index: i64,
        option_count: usize,
    },
}

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// What a free action did to the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreeActionOutcome {
    pub action_id: ActionId,
    pub delta: ActionDelta,
    /// `false` when the action is not in the table and nothing changed.
    pub known: bool,
}

/// What an answer submission did to the session.
///
/// Both the chosen and the correct index are reported so the presentation
/// layer can highlight them for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerOutcome {
    pub question_id: QuestionId,
    pub chosen_index: usize,
    pub correct_index: usize,
    pub is_correct: bool,
    pub bonus_awarded: i64,
    pub first_submission: bool,
    pub rationale: String,
    pub quiz_completed: bool,
    pub badge_earned: Option<String>,
}

/// Description of the state change caused by one `PlayerAction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ActionEffect {
    Free(FreeActionOutcome),
    Answer(AnswerOutcome),
    Moved { from: usize, to: usize },
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Scoring and progress rules.
///
/// Holds configuration only. The session state is passed into every call, so
/// one engine can drive any number of sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringEngine {
    actions: ActionTable,
    correct_answer_bonus: i64,
    completion_badge: Option<String>,
}

impl ScoringEngine {
    #[must_use]
    pub fn new(actions: ActionTable) -> Self {
        Self {
            actions,
            correct_answer_bonus: CORRECT_ANSWER_BONUS,
            completion_badge: Some(COMPLETION_BADGE.to_string()),
        }
    }

    #[must_use]
    pub fn with_correct_answer_bonus(mut self, bonus: i64) -> Self {
        self.correct_answer_bonus = bonus;
        self
    }

    #[must_use]
    pub fn with_completion_badge(mut self, badge: Option<String>) -> Self {
        self.completion_badge = badge;
        self
    }

    #[must_use]
    pub fn actions(&self) -> &ActionTable {
        &self.actions
    }

    #[must_use]
    pub fn correct_answer_bonus(&self) -> i64 {
        self.correct_answer_bonus
    }

    /// Apply a free action's score and progress delta.
    ///
    /// Actions outside the table are a deliberate no-op.
    pub fn apply_free_action(
        &self,
        state: &mut SessionState,
        action_id: &ActionId,
    ) -> FreeActionOutcome {
        let Some(delta) = self.actions.get(action_id) else {
            return FreeActionOutcome {
                action_id: action_id.clone(),
                delta: ActionDelta::ZERO,
                known: false,
            };
        };

        state.score = state.score.saturating_add(delta.score);
        state.mission_progress = clamp_progress(state.mission_progress, delta.progress);

        FreeActionOutcome {
            action_id: action_id.clone(),
            delta,
            known: true,
        }
    }

    /// Record an answer and score it if this is the question's first submission.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::UnknownQuestion` if the id is not in the bank and
    /// `EngineError::InvalidOption` if `option_index` is negative or past the
    /// last option. The state is untouched on error.
    pub fn submit_answer(
        &self,
        state: &mut SessionState,
        bank: &QuestionBank,
        question_id: QuestionId,
        option_index: i64,
    ) -> Result<AnswerOutcome, EngineError> {
        let question = bank
            .find(question_id)
            .ok_or(EngineError::UnknownQuestion(question_id))?;
        let chosen_index = usize::try_from(option_index)
            .ok()
            .filter(|index| *index < question.option_count())
            .ok_or(EngineError::InvalidOption {
                question_id,
                index: option_index,
                option_count: question.option_count(),
            })?;

        let is_correct = question.is_correct(chosen_index);
        state.selected_answers.insert(question_id, chosen_index);

        let first_submission = state.scored.insert(question_id);
        let bonus_awarded = if first_submission && is_correct {
            self.correct_answer_bonus
        } else {
            0
        };
        state.score = state.score.saturating_add(bonus_awarded);

        let was_completed = state.quiz_completed;
        state.quiz_completed = bank
            .question_ids()
            .all(|id| state.selected_answers.contains_key(&id));

        let badge_earned = match (&self.completion_badge, was_completed, state.quiz_completed) {
            (Some(badge), false, true) if award_badge(state, badge) => Some(badge.clone()),
            _ => None,
        };

        Ok(AnswerOutcome {
            question_id,
            chosen_index,
            correct_index: question.correct_index(),
            is_correct,
            bonus_awarded,
            first_submission,
            rationale: question.rationale().to_string(),
            quiz_completed: state.quiz_completed,
            badge_earned,
        })
    }

    /// Single entry point for every player action.
    ///
    /// # Errors
    ///
    /// Propagates the `EngineError` of the underlying operation.
    pub fn apply(
        &self,
        state: &mut SessionState,
        bank: &QuestionBank,
        action: &PlayerAction,
    ) -> Result<ActionEffect, EngineError> {
        match action {
            PlayerAction::Free(action_id) => {
                Ok(ActionEffect::Free(self.apply_free_action(state, action_id)))
            }
            PlayerAction::Answer {
                question_id,
                option_index,
            } => self
                .submit_answer(state, bank, *question_id, *option_index)
                .map(ActionEffect::Answer),
            PlayerAction::Navigate(delta) => {
                let from = state.current_question_index();
                let to = navigation::move_by(state, bank, *delta);
                Ok(ActionEffect::Moved { from, to })
            }
            PlayerAction::JumpTo(index) => {
                let from = state.current_question_index();
                let to = navigation::jump_to(state, bank, *index)?;
                Ok(ActionEffect::Moved { from, to })
            }
        }
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(ActionTable::builtin())
    }
}

/// Add a badge to the session. Returns `true` if it was not held yet.
pub fn award_badge(state: &mut SessionState, label: &str) -> bool {
    let label = label.trim();
    if label.is_empty() {
        return false;
    }
    state.badges.insert(label.to_string())
}

fn clamp_progress(current: u8, delta: i32) -> u8 {
    let next = i32::from(current)
        .saturating_add(delta)
        .clamp(0, i32::from(MAX_MISSION_PROGRESS));
    u8::try_from(next).unwrap_or(MAX_MISSION_PROGRESS)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
