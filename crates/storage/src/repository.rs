use async_trait::async_trait;
use quiz_core::model::PlayerIdentity;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted key-value snapshot of who was playing.
///
/// Either key may be absent; callers fill the gaps with defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityRecord {
    pub player_name: Option<String>,
    pub session_id: Option<String>,
}

impl IdentityRecord {
    /// Storage key for the player name.
    pub const PLAYER_NAME_KEY: &'static str = "player_name";
    /// Storage key for the session id.
    pub const SESSION_ID_KEY: &'static str = "session_id";

    #[must_use]
    pub fn from_identity(identity: &PlayerIdentity) -> Self {
        Self {
            player_name: Some(identity.player_name().to_owned()),
            session_id: Some(identity.session_id().as_str().to_owned()),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.player_name.is_none() && self.session_id.is_none()
    }
}

/// Repository contract for the persisted identity snapshot.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Load whatever identity keys are stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read. Missing keys are not
    /// an error and come back as `None`.
    async fn load_identity(&self) -> Result<IdentityRecord, StorageError>;

    /// Persist the identity keys that are present in `record`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    async fn save_identity(&self, record: &IdentityRecord) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    identity: Arc<Mutex<IdentityRecord>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            identity: Arc::new(Mutex::new(IdentityRecord::default())),
        }
    }
}

#[async_trait]
impl IdentityRepository for InMemoryRepository {
    async fn load_identity(&self) -> Result<IdentityRecord, StorageError> {
        let guard = self
            .identity
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_identity(&self, record: &IdentityRecord) -> Result<(), StorageError> {
        let mut guard = self
            .identity
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if let Some(name) = &record.player_name {
            guard.player_name = Some(name.clone());
        }
        if let Some(session_id) = &record.session_id {
            guard.session_id = Some(session_id.clone());
        }
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub identity: Arc<dyn IdentityRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let identity: Arc<dyn IdentityRepository> = Arc::new(InMemoryRepository::new());
        Self { identity }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::SessionId;

    #[tokio::test]
    async fn empty_store_loads_empty_record() {
        let repo = InMemoryRepository::new();
        let record = repo.load_identity().await.unwrap();
        assert!(record.is_empty());
    }

    #[tokio::test]
    async fn round_trips_identity() {
        let repo = InMemoryRepository::new();
        let identity = PlayerIdentity::new("Ada", SessionId::from_persisted("s-1").unwrap());

        repo.save_identity(&IdentityRecord::from_identity(&identity))
            .await
            .unwrap();

        let record = repo.load_identity().await.unwrap();
        assert_eq!(record.player_name.as_deref(), Some("Ada"));
        assert_eq!(record.session_id.as_deref(), Some("s-1"));
    }

    #[tokio::test]
    async fn partial_save_keeps_other_key() {
        let repo = InMemoryRepository::new();
        repo.save_identity(&IdentityRecord {
            player_name: Some("Ada".into()),
            session_id: Some("s-1".into()),
        })
        .await
        .unwrap();
        repo.save_identity(&IdentityRecord {
            player_name: Some("Grace".into()),
            session_id: None,
        })
        .await
        .unwrap();

        let record = repo.load_identity().await.unwrap();
        assert_eq!(record.player_name.as_deref(), Some("Grace"));
        assert_eq!(record.session_id.as_deref(), Some("s-1"));
    }

    #[tokio::test]
    async fn storage_in_memory_is_usable_through_trait_object() {
        let storage = Storage::in_memory();
        storage
            .identity
            .save_identity(&IdentityRecord {
                player_name: None,
                session_id: Some("abc".into()),
            })
            .await
            .unwrap();
        let record = storage.identity.load_identity().await.unwrap();
        assert_eq!(record.session_id.as_deref(), Some("abc"));
        assert!(record.player_name.is_none());
    }
}
