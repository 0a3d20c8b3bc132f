pub mod action;
pub mod feedback;
mod ids;
mod question;
mod session;

pub use action::{ActionDelta, ActionId, ActionTable, PlayerAction};
pub use feedback::{FeedbackCatalog, FeedbackEntry};
pub use ids::{LevelId, ParseIdError, QuestionId, SessionId};
pub use question::{QuestionError, QuestionItem};
pub use session::{
    DEFAULT_PLAYER_NAME, MAX_MISSION_PROGRESS, PlayerIdentity, SessionDefaults, SessionState,
};
