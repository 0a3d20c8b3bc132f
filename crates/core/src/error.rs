use thiserror::Error;

use crate::bank::BankError;
use crate::engine::EngineError;
use crate::model::{ParseIdError, QuestionError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error(transparent)]
    ParseId(#[from] ParseIdError),
}
