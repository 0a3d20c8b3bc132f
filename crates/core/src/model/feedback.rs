use serde::Serialize;
use std::collections::HashMap;

use crate::model::action::{ActionId, CLICK, INSPECT, REPORT};

/// Display message shown after a free action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackEntry {
    action_id: ActionId,
    title: String,
    body: String,
}

impl FeedbackEntry {
    #[must_use]
    pub fn new(action_id: ActionId, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            action_id,
            title: title.into(),
            body: body.into(),
        }
    }

    #[must_use]
    pub fn action_id(&self) -> &ActionId {
        &self.action_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Read-only lookup of feedback messages by action id.
#[derive(Debug, Clone, Default)]
pub struct FeedbackCatalog {
    entries: HashMap<ActionId, FeedbackEntry>,
}

impl FeedbackCatalog {
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_entries([
            FeedbackEntry::new(
                ActionId::new(INSPECT),
                "Good Analysis!",
                "You identified red flags: suspicious sender address and urgent language.",
            ),
            FeedbackEntry::new(
                ActionId::new(REPORT),
                "Excellent Decision!",
                "Reporting phishing emails protects the community and alerts security teams.",
            ),
            FeedbackEntry::new(
                ActionId::new(CLICK),
                "Learning Moment!",
                "Clicking links can lead to malware. Always verify links before clicking!",
            ),
        ])
    }

    /// Later entries for the same action id replace earlier ones.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = FeedbackEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|entry| (entry.action_id.clone(), entry))
                .collect(),
        }
    }

    #[must_use]
    pub fn lookup(&self, action_id: &ActionId) -> Option<&FeedbackEntry> {
        self.entries.get(action_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
