#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod identity_service;
pub mod question_source;
pub mod sessions;

pub use quiz_core::Clock;

pub use config::RemoteQuestionConfig;
pub use error::{ConfigError, PersistenceError, QuestionSourceError, QuizError};
pub use identity_service::IdentityService;
pub use question_source::{
    LoadedBank, QuestionBankLoader, QuestionSource, RemoteQuestionSource, StaticQuestionSource,
};
pub use sessions::{
    FreeActionResult, QuestionView, QuizLoopService, QuizProgress, QuizSession, SessionSnapshot,
};
