use quiz_core::model::{PlayerIdentity, SessionId};
use storage::repository::{IdentityRecord, IdentityRepository, Storage};
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_roundtrip_persists_identity() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_identity_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let empty = repo.load_identity().await.expect("load empty");
    assert!(empty.is_empty());

    let identity = PlayerIdentity::new("Ada", SessionId::from_persisted("1700000000000").unwrap());
    repo.save_identity(&IdentityRecord::from_identity(&identity))
        .await
        .expect("save");

    let loaded = repo.load_identity().await.expect("load");
    assert_eq!(loaded.player_name.as_deref(), Some("Ada"));
    assert_eq!(loaded.session_id.as_deref(), Some("1700000000000"));
}

#[tokio::test]
async fn sqlite_save_overwrites_and_keeps_missing_keys() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_identity_overwrite?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.save_identity(&IdentityRecord {
        player_name: Some("Ada".into()),
        session_id: Some("first".into()),
    })
    .await
    .expect("save first");
    repo.save_identity(&IdentityRecord {
        player_name: Some("Grace".into()),
        session_id: None,
    })
    .await
    .expect("save second");

    let loaded = repo.load_identity().await.expect("load");
    assert_eq!(loaded.player_name.as_deref(), Some("Grace"));
    assert_eq!(loaded.session_id.as_deref(), Some("first"));
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_identity_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");
}

#[tokio::test]
async fn storage_sqlite_exposes_identity_repository() {
    let storage = Storage::sqlite("sqlite:file:memdb_identity_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    storage
        .identity
        .save_identity(&IdentityRecord {
            player_name: None,
            session_id: Some("only-session".into()),
        })
        .await
        .expect("save");

    let loaded = storage.identity.load_identity().await.expect("load");
    assert!(loaded.player_name.is_none());
    assert_eq!(loaded.session_id.as_deref(), Some("only-session"));
}
