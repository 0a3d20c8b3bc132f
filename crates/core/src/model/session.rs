use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::model::ids::{QuestionId, SessionId};

/// Upper bound for mission progress, in percent.
pub const MAX_MISSION_PROGRESS: u8 = 100;

/// Name used when nothing was supplied or persisted.
pub const DEFAULT_PLAYER_NAME: &str = "Cyber_Explorer";

//
// ─── IDENTITY ──────────────────────────────────────────────────────────────────
//

/// Who is playing, resolved once at session start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    player_name: String,
    session_id: SessionId,
}

impl PlayerIdentity {
    #[must_use]
    pub fn new(player_name: impl Into<String>, session_id: SessionId) -> Self {
        let name = player_name.into();
        let name = name.trim();
        Self {
            player_name: if name.is_empty() {
                DEFAULT_PLAYER_NAME.to_string()
            } else {
                name.to_string()
            },
            session_id,
        }
    }

    /// Resolve an identity from optional persisted values.
    ///
    /// A blank or missing name becomes `default_name`; a blank or missing
    /// session id is minted fresh.
    #[must_use]
    pub fn resolve(
        player_name: Option<String>,
        session_id: Option<String>,
        default_name: &str,
    ) -> Self {
        let player_name = player_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| default_name.to_string());
        let session_id = session_id
            .and_then(SessionId::from_persisted)
            .unwrap_or_else(SessionId::mint);
        Self::new(player_name, session_id)
    }

    #[must_use]
    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    #[must_use]
    pub fn with_player_name(self, player_name: impl Into<String>) -> Self {
        Self::new(player_name, self.session_id)
    }
}

//
// ─── DEFAULTS ──────────────────────────────────────────────────────────────────
//

/// Starting values for a new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDefaults {
    pub player_name: String,
    pub score: i64,
    pub level: u32,
    pub xp: u32,
    pub mission_progress: u8,
    pub badges: Vec<String>,
}

impl SessionDefaults {
    /// A brand-new profile with nothing earned yet.
    #[must_use]
    pub fn fresh() -> Self {
        Self {
            player_name: DEFAULT_PLAYER_NAME.to_string(),
            score: 0,
            level: 1,
            xp: 0,
            mission_progress: 0,
            badges: Vec::new(),
        }
    }
}

impl Default for SessionDefaults {
    /// The demo profile players land in: level 2 with three badges earned.
    fn default() -> Self {
        Self {
            player_name: DEFAULT_PLAYER_NAME.to_string(),
            score: 850,
            level: 2,
            xp: 45,
            mission_progress: 60,
            badges: vec![
                "Account Defender".to_string(),
                "Password Master".to_string(),
                "Vigilant Observer".to_string(),
            ],
        }
    }
}

//
// ─── SESSION STATE ─────────────────────────────────────────────────────────────
//

/// Mutable record of one play session.
///
/// Only the scoring engine and navigation mutate it; everything else reads
/// through the accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub(crate) player_name: String,
    pub(crate) session_id: SessionId,
    pub(crate) score: i64,
    pub(crate) level: u32,
    pub(crate) xp: u32,
    pub(crate) mission_progress: u8,
    pub(crate) current_question_index: usize,
    pub(crate) selected_answers: HashMap<QuestionId, usize>,
    pub(crate) scored: HashSet<QuestionId>,
    pub(crate) quiz_completed: bool,
    pub(crate) badges: BTreeSet<String>,
    pub(crate) started_at: DateTime<Utc>,
}

impl SessionState {
    #[must_use]
    pub fn new(
        identity: PlayerIdentity,
        defaults: &SessionDefaults,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            player_name: identity.player_name,
            session_id: identity.session_id,
            score: defaults.score,
            level: defaults.level,
            xp: defaults.xp,
            mission_progress: defaults.mission_progress.min(MAX_MISSION_PROGRESS),
            current_question_index: 0,
            selected_answers: HashMap::new(),
            scored: HashSet::new(),
            quiz_completed: false,
            badges: defaults.badges.iter().cloned().collect(),
            started_at,
        }
    }

    #[must_use]
    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    #[must_use]
    pub fn identity(&self) -> PlayerIdentity {
        PlayerIdentity::new(self.player_name.clone(), self.session_id.clone())
    }

    #[must_use]
    pub fn score(&self) -> i64 {
        self.score
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub fn xp(&self) -> u32 {
        self.xp
    }

    #[must_use]
    pub fn mission_progress(&self) -> u8 {
        self.mission_progress
    }

    #[must_use]
    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    #[must_use]
    pub fn selected_answer(&self, question_id: QuestionId) -> Option<usize> {
        self.selected_answers.get(&question_id).copied()
    }

    #[must_use]
    pub fn selected_answers(&self) -> &HashMap<QuestionId, usize> {
        &self.selected_answers
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.selected_answers.len()
    }

    /// Whether the question already had its single scoring event.
    #[must_use]
    pub fn is_scored(&self, question_id: QuestionId) -> bool {
        self.scored.contains(&question_id)
    }

    #[must_use]
    pub fn quiz_completed(&self) -> bool {
        self.quiz_completed
    }

    #[must_use]
    pub fn badges(&self) -> &BTreeSet<String> {
        &self.badges
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn resolve_falls_back_to_defaults() {
        let identity = PlayerIdentity::resolve(Some("  ".into()), None, DEFAULT_PLAYER_NAME);
        assert_eq!(identity.player_name(), DEFAULT_PLAYER_NAME);
        assert!(!identity.session_id().as_str().is_empty());
    }

    #[test]
    fn resolve_keeps_persisted_values() {
        let identity = PlayerIdentity::resolve(
            Some("Ada".into()),
            Some("abc123".into()),
            DEFAULT_PLAYER_NAME,
        );
        assert_eq!(identity.player_name(), "Ada");
        assert_eq!(identity.session_id().as_str(), "abc123");
    }

    #[test]
    fn new_state_uses_defaults() {
        let identity = PlayerIdentity::new("Ada", SessionId::mint());
        let state = SessionState::new(identity, &SessionDefaults::default(), fixed_now());

        assert_eq!(state.score(), 850);
        assert_eq!(state.level(), 2);
        assert_eq!(state.xp(), 45);
        assert_eq!(state.mission_progress(), 60);
        assert_eq!(state.current_question_index(), 0);
        assert_eq!(state.badges().len(), 3);
        assert!(!state.quiz_completed());
    }

    #[test]
    fn new_state_clamps_out_of_range_progress() {
        let defaults = SessionDefaults {
            mission_progress: 250,
            ..SessionDefaults::fresh()
        };
        let state = SessionState::new(
            PlayerIdentity::new("Ada", SessionId::mint()),
            &defaults,
            fixed_now(),
        );
        assert_eq!(state.mission_progress(), MAX_MISSION_PROGRESS);
    }
}
