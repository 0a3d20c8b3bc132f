use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use quiz_core::engine::award_badge;
use quiz_core::model::{
    ActionId, FeedbackCatalog, FeedbackEntry, PlayerAction, PlayerIdentity, QuestionId,
    QuestionItem, SessionState,
};
use quiz_core::{
    ActionEffect, AnswerOutcome, BankSource, FreeActionOutcome, QuestionBank, ScoringEngine,
    navigation,
};
use tokio::sync::watch;
use tracing::{debug, info};

use super::progress::QuizProgress;
use super::view::SessionSnapshot;
use crate::error::QuizError;

//
// ─── RESULTS ───────────────────────────────────────────────────────────────────
//

/// Outcome of a free action plus the message to show for it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeActionResult {
    pub outcome: FreeActionOutcome,
    pub feedback: Option<FeedbackEntry>,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Controller owning one play session.
///
/// Every action runs to completion under `&mut self`, so no caller ever sees a
/// half-applied transition. Subscribers get a fresh `SessionSnapshot` after
/// each successful change.
pub struct QuizSession {
    state: SessionState,
    bank: QuestionBank,
    bank_source: BankSource,
    bank_read: AtomicBool,
    engine: ScoringEngine,
    feedback: FeedbackCatalog,
    updates: watch::Sender<SessionSnapshot>,
}

impl QuizSession {
    #[must_use]
    pub fn new(
        state: SessionState,
        bank: QuestionBank,
        bank_source: BankSource,
        engine: ScoringEngine,
        feedback: FeedbackCatalog,
    ) -> Self {
        let (updates, _) = watch::channel(SessionSnapshot::capture(&state, &bank, bank_source));
        Self {
            state,
            bank,
            bank_source,
            bank_read: AtomicBool::new(false),
            engine,
            feedback,
            updates,
        }
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn identity(&self) -> PlayerIdentity {
        self.state.identity()
    }

    #[must_use]
    pub fn bank_source(&self) -> BankSource {
        self.bank_source
    }

    /// The active bank. Reading it pins the bank for the rest of the session.
    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        self.mark_bank_read();
        &self.bank
    }

    /// Question under the navigation pointer.
    #[must_use]
    pub fn current_question(&self) -> Option<&QuestionItem> {
        self.mark_bank_read();
        self.bank.get(self.state.current_question_index()).ok()
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress::new(
            self.bank.count(),
            self.state.answered_count(),
            self.state.quiz_completed(),
        )
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state.quiz_completed()
    }

    #[must_use]
    pub fn feedback_for(&self, action_id: &ActionId) -> Option<&FeedbackEntry> {
        self.feedback.lookup(action_id)
    }

    /// Current read-only view. Counts as a read of the bank.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.mark_bank_read();
        SessionSnapshot::capture(&self.state, &self.bank, self.bank_source)
    }

    /// Receive a snapshot after every successful change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.subscribe()
    }

    /// Offer a replacement bank that arrived after the session started.
    ///
    /// Accepted only while the bank has not been read yet; once a player has
    /// seen or answered a question the offer is ignored. Returns whether the
    /// bank was swapped.
    pub fn offer_bank(&mut self, bank: QuestionBank, source: BankSource) -> bool {
        if self.bank_read.load(Ordering::Relaxed) {
            debug!(
                count = bank.count(),
                "ignoring question bank that arrived after play started"
            );
            return false;
        }

        info!(count = bank.count(), ?source, "swapping in question bank");
        self.bank = bank;
        self.bank_source = source;
        navigation::move_by(&mut self.state, &self.bank, 0);
        self.publish();
        true
    }

    pub fn submit_free_action(&mut self, action_id: &str) -> FreeActionResult {
        self.mark_bank_read();
        let action_id = ActionId::new(action_id);
        let outcome = self.engine.apply_free_action(&mut self.state, &action_id);
        if outcome.known {
            self.publish();
        } else {
            debug!(action = %action_id, "free action has no score effect");
        }
        FreeActionResult {
            feedback: self.feedback.lookup(&action_id).cloned(),
            outcome,
        }
    }

    /// Answer `question_id` with the option at `option_index`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Engine` for unknown questions or invalid options; the
    /// session is unchanged in that case.
    pub fn submit_answer(
        &mut self,
        question_id: QuestionId,
        option_index: i64,
    ) -> Result<AnswerOutcome, QuizError> {
        self.mark_bank_read();
        let outcome =
            self.engine
                .submit_answer(&mut self.state, &self.bank, question_id, option_index)?;
        self.publish();
        Ok(outcome)
    }

    /// Answer the question under the navigation pointer.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Engine` if the option is invalid.
    pub fn answer_current(&mut self, option_index: i64) -> Result<AnswerOutcome, QuizError> {
        let question_id = self.bank.get(self.state.current_question_index())?.id();
        self.submit_answer(question_id, option_index)
    }

    /// Move the pointer by `delta`, saturating at both ends.
    pub fn navigate(&mut self, delta: i64) -> usize {
        self.mark_bank_read();
        let before = self.state.current_question_index();
        let after = navigation::move_by(&mut self.state, &self.bank, delta);
        if before != after {
            self.publish();
        }
        after
    }

    /// Jump to the question at `index`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Engine` if `index` is outside the bank.
    pub fn jump_to(&mut self, index: i64) -> Result<usize, QuizError> {
        self.mark_bank_read();
        let target = navigation::jump_to(&mut self.state, &self.bank, index)?;
        self.publish();
        Ok(target)
    }

    /// Apply any `PlayerAction`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Engine` if the engine rejects the action.
    pub fn apply(&mut self, action: &PlayerAction) -> Result<ActionEffect, QuizError> {
        self.mark_bank_read();
        let effect = self.engine.apply(&mut self.state, &self.bank, action)?;
        self.publish();
        Ok(effect)
    }

    /// Grant an achievement label. Returns whether it was new.
    pub fn award_badge(&mut self, label: &str) -> bool {
        let added = award_badge(&mut self.state, label);
        if added {
            self.publish();
        }
        added
    }

    fn mark_bank_read(&self) {
        self.bank_read.store(true, Ordering::Relaxed);
    }

    fn publish(&self) {
        self.updates.send_replace(SessionSnapshot::capture(
            &self.state,
            &self.bank,
            self.bank_source,
        ));
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("session_id", self.state.session_id())
            .field("bank_len", &self.bank.count())
            .field("bank_source", &self.bank_source)
            .field("current", &self.state.current_question_index())
            .field("answered", &self.state.answered_count())
            .field("score", &self.state.score())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{SessionDefaults, SessionId};
    use quiz_core::time::fixed_now;

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

    fn session_with(defaults: &SessionDefaults) -> QuizSession {
        let state = SessionState::new(
            PlayerIdentity::new("Tester", SessionId::from_persisted("s-1").unwrap()),
            defaults,
            fixed_now(),
        );
        QuizSession::new(
            state,
            QuestionBank::builtin(),
            BankSource::BuiltIn,
            ScoringEngine::default(),
            FeedbackCatalog::builtin(),
        )
    }

    fn session() -> QuizSession {
        session_with(&SessionDefaults::fresh())
    }

    #[test]
    fn answering_both_builtin_questions_completes_quiz() {
        let mut session = session();

        let first = session.submit_answer(QuestionId::new(1), 0).unwrap();
        assert!(first.is_correct);
        assert!(!session.is_complete());

        let second = session.submit_answer(QuestionId::new(2), 0).unwrap();
        assert!(!second.is_correct);
        assert!(session.is_complete());
        assert_eq!(session.state().score(), 50);
        assert_eq!(session.progress().remaining, 0);
    }

    #[test]
    fn rejected_answer_is_surfaced_and_changes_nothing() {
        let mut session = session();
        let before = session.snapshot();

        let err = session.submit_answer(QuestionId::new(1), -1).unwrap_err();
        assert!(matches!(err, QuizError::Engine(_)));
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn free_action_returns_feedback() {
        let mut session = session_with(&SessionDefaults::default());

        let click = session.submit_free_action("click");
        assert_eq!(click.feedback.unwrap().title(), "Learning Moment!");
        assert_eq!(session.state().score(), 800);
        assert_eq!(session.state().mission_progress(), 60);

        let menu = session.submit_free_action("toggle-menu");
        assert!(!menu.outcome.known);
        assert!(menu.feedback.is_none());
        assert_eq!(session.state().score(), 800);
    }

    #[test]
    fn answer_current_follows_navigation() {
        let mut session = session();
        session.navigate(1);
        let outcome = session.answer_current(1).unwrap();
        assert_eq!(outcome.question_id, QuestionId::new(2));
        assert!(outcome.is_correct);
    }

    #[test]
    fn subscribers_see_every_change() {
        let mut session = session();
        let mut updates = session.subscribe();

        session.submit_free_action("report");
        assert!(updates.has_changed().unwrap());
        assert_eq!(updates.borrow_and_update().score, 100);

        session.navigate(-1);
        assert!(!updates.has_changed().unwrap());

        session.jump_to(1).unwrap();
        assert_eq!(updates.borrow_and_update().current_question_index, 1);
    }

    #[test]
    fn bank_offer_before_first_read_is_accepted() {
        let mut session = session();
        let remote = QuestionBank::new(vec![question(10, 0), question(11, 1), question(12, 2)])
            .unwrap();

        assert!(session.offer_bank(remote, BankSource::Remote));
        let snapshot = session.snapshot();
        assert!(snapshot.from_remote_bank);
        assert_eq!(snapshot.progress.total, 3);
        assert_eq!(snapshot.current_question.unwrap().id, QuestionId::new(10));
    }

    #[test]
    fn bank_offer_after_play_started_is_ignored() {
        let mut session = session();
        let _ = session.current_question();

        let remote = QuestionBank::new(vec![question(10, 0)]).unwrap();
        assert!(!session.offer_bank(remote, BankSource::Remote));
        assert_eq!(session.bank_source(), BankSource::BuiltIn);
        assert_eq!(session.bank().count(), 2);
    }

    #[test]
    fn snapshot_reveals_answer_only_after_answering() {
        let mut session = session();
        let view = session.snapshot().current_question.unwrap();
        assert!(view.correct_index.is_none());
        assert_eq!(view.number, 1);
        assert_eq!(view.total, 2);

        session.answer_current(2).unwrap();
        let view = session.snapshot().current_question.unwrap();
        assert_eq!(view.selected, Some(2));
        assert_eq!(view.correct_index, Some(0));
        assert!(view.rationale.is_some());
    }

    #[test]
    fn apply_handles_every_action_kind() {
        let mut session = session();
        session
            .apply(&PlayerAction::Free(ActionId::new("inspect")))
            .unwrap();
        session.apply(&PlayerAction::Navigate(1)).unwrap();
        session
            .apply(&PlayerAction::Answer {
                question_id: QuestionId::new(2),
                option_index: 1,
            })
            .unwrap();
        assert!(session.apply(&PlayerAction::JumpTo(7)).is_err());

        assert_eq!(session.state().score(), 70);
        assert_eq!(session.state().current_question_index(), 1);
    }
}
