#![forbid(unsafe_code)]

pub mod bank;
pub mod engine;
pub mod error;
pub mod model;
pub mod navigation;
pub mod time;

pub use bank::{BankError, BankSource, QuestionBank};
pub use engine::{ActionEffect, AnswerOutcome, EngineError, FreeActionOutcome, ScoringEngine};
pub use error::Error;
pub use time::Clock;
