use std::sync::Arc;

use quiz_core::model::{DEFAULT_PLAYER_NAME, PlayerIdentity};
use storage::repository::{IdentityRecord, IdentityRepository};
use tracing::{debug, warn};

use crate::error::PersistenceError;

/// Best-effort loading and saving of the player identity.
///
/// A missing or broken store never blocks play: failures are logged and the
/// session continues with defaults or a freshly minted session id.
#[derive(Clone)]
pub struct IdentityService {
    repo: Arc<dyn IdentityRepository>,
    default_name: String,
}

impl IdentityService {
    #[must_use]
    pub fn new(repo: Arc<dyn IdentityRepository>) -> Self {
        Self {
            repo,
            default_name: DEFAULT_PLAYER_NAME.to_string(),
        }
    }

    #[must_use]
    pub fn with_default_name(mut self, name: impl Into<String>) -> Self {
        self.default_name = name.into();
        self
    }

    /// Read the raw persisted record.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::PersistenceUnavailable` if the store cannot be read.
    pub async fn try_load(&self) -> Result<IdentityRecord, PersistenceError> {
        Ok(self.repo.load_identity().await?)
    }

    /// Write the identity snapshot.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::PersistenceUnavailable` if the store cannot be written.
    pub async fn try_save(&self, identity: &PlayerIdentity) -> Result<(), PersistenceError> {
        self.repo
            .save_identity(&IdentityRecord::from_identity(identity))
            .await?;
        Ok(())
    }

    /// Resolve the identity for a new session, never failing.
    pub async fn load(&self) -> PlayerIdentity {
        let record = match self.try_load().await {
            Ok(record) => record,
            Err(err) => {
                warn!(%err, "could not load player identity, using defaults");
                IdentityRecord::default()
            }
        };
        if record.session_id.is_none() {
            debug!("no persisted session id, minting a new one");
        }
        PlayerIdentity::resolve(record.player_name, record.session_id, &self.default_name)
    }

    /// Persist the identity opportunistically. Returns whether it was stored.
    pub async fn save(&self, identity: &PlayerIdentity) -> bool {
        match self.try_save(identity).await {
            Ok(()) => true,
            Err(err) => {
                warn!(%err, "could not save player identity");
                false
            }
        }
    }
}
