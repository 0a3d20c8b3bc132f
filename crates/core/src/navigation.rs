//! Bounds-checked movement of the current-question pointer.
//!
//! Navigation only ever touches `current_question_index`.

use crate::bank::QuestionBank;
use crate::engine::EngineError;
use crate::model::SessionState;

/// Move the pointer by `delta`, saturating at the first and last question.
///
/// Returns the new index.
pub fn move_by(state: &mut SessionState, bank: &QuestionBank, delta: i64) -> usize {
    let last = i64::try_from(bank.last_index()).unwrap_or(i64::MAX);
    let current = i64::try_from(state.current_question_index).unwrap_or(i64::MAX);
    let next = current.saturating_add(delta).clamp(0, last);
    state.current_question_index = usize::try_from(next).unwrap_or(0);
    state.current_question_index
}

/// Jump straight to `index`.
///
/// # Errors
///
/// Returns `EngineError::OutOfRange` if `index` is not in `[0, count)`.
pub fn jump_to(
    state: &mut SessionState,
    bank: &QuestionBank,
    index: i64,
) -> Result<usize, EngineError> {
    let target = usize::try_from(index)
        .ok()
        .filter(|target| *target < bank.count())
        .ok_or(EngineError::OutOfRange {
            index,
            count: bank.count(),
        })?;
    state.current_question_index = target;
    Ok(target)
}
