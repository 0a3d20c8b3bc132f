mod progress;
mod service;
mod view;
mod workflow;

// Public API of the quiz session subsystem.
pub use crate::error::QuizError;
pub use progress::QuizProgress;
pub use service::{FreeActionResult, QuizSession};
pub use view::{QuestionView, SessionSnapshot};
pub use workflow::QuizLoopService;
