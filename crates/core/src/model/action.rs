use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::model::ids::QuestionId;

/// Inspecting a suspicious message for red flags.
pub const INSPECT: &str = "inspect";
/// Reporting a message to the security team.
pub const REPORT: &str = "report";
/// Clicking the decoy link inside a phishing message.
pub const CLICK: &str = "click";

//
// ─── ACTION ID ─────────────────────────────────────────────────────────────────
//

/// Identifier of a free action, e.g. `inspect` or `report`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(String);

impl ActionId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self(raw.trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActionId({})", self.0)
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

//
// ─── DELTAS ────────────────────────────────────────────────────────────────────
//

/// Score and mission-progress change applied by a free action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionDelta {
    pub score: i64,
    pub progress: i32,
}

impl ActionDelta {
    pub const ZERO: Self = Self {
        score: 0,
        progress: 0,
    };

    #[must_use]
    pub const fn new(score: i64, progress: i32) -> Self {
        Self { score, progress }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

/// Closed table of free actions and their deltas.
///
/// Anything not listed here is presentation-only (menu toggles and the like)
/// and resolves to `ActionDelta::ZERO`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTable {
    deltas: HashMap<ActionId, ActionDelta>,
}

impl ActionTable {
    /// Canonical deltas: report +100/+10, inspect +20/+10, click -50/+0.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_entries([
            (ActionId::new(REPORT), ActionDelta::new(100, 10)),
            (ActionId::new(INSPECT), ActionDelta::new(20, 10)),
            (ActionId::new(CLICK), ActionDelta::new(-50, 0)),
        ])
    }

    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = (ActionId, ActionDelta)>) -> Self {
        Self {
            deltas: entries.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn get(&self, action_id: &ActionId) -> Option<ActionDelta> {
        self.deltas.get(action_id).copied()
    }

    /// Delta for the action, `ActionDelta::ZERO` when the action is not in the table.
    #[must_use]
    pub fn delta_for(&self, action_id: &ActionId) -> ActionDelta {
        self.get(action_id).unwrap_or(ActionDelta::ZERO)
    }

    #[must_use]
    pub fn contains(&self, action_id: &ActionId) -> bool {
        self.deltas.contains_key(action_id)
    }
}

impl Default for ActionTable {
    fn default() -> Self {
        Self::builtin()
    }
}

//
// ─── PLAYER ACTIONS ────────────────────────────────────────────────────────────
//

/// A discrete input from the presentation layer.
///
/// Indices are signed because they arrive unchecked from the UI; the engine
/// rejects negative values instead of the caller having to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction {
    Free(ActionId),
    Answer {
        question_id: QuestionId,
        option_index: i64,
    },
    Navigate(i64),
    JumpTo(i64),
}
