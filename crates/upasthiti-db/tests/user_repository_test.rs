//! Integration tests for the User repository on a temporary data directory.

use upasthiti_core::error::UpasthitiError;
use upasthiti_core::models::user::{CreateUser, Role};
use upasthiti_core::repository::UserRepository;
use upasthiti_db::{DbConfig, DbManager};

/// Helper: open fresh stores in a temp dir. The `TempDir` must outlive the
/// manager.
async fn setup() -> (DbManager, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db = DbManager::open(&DbConfig {
        data_dir: dir.path().join("data"),
    })
    .await
    .unwrap();
    (db, dir)
}

fn alice() -> CreateUser {
    CreateUser {
        name: "Alice".into(),
        email: "Alice@Example.com".into(),
        password_hash: "$argon2id$v=19$placeholder".into(),
        role: Role::Student,
    }
}

#[tokio::test]
async fn create_and_get_user() {
    let (db, _dir) = setup().await;
    let repo = db.users();

    let user = repo.create(alice()).await.unwrap();
    assert_eq!(user.name, "Alice");
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.role, Role::Student);

    let fetched = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(fetched.id, user.id);
    assert_eq!(fetched.email, "alice@example.com");
}

#[tokio::test]
async fn get_by_email_is_case_insensitive() {
    let (db, _dir) = setup().await;
    let repo = db.users();
    let user = repo.create(alice()).await.unwrap();

    let fetched = repo.get_by_email("ALICE@example.COM").await.unwrap();
    assert_eq!(fetched.id, user.id);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let (db, _dir) = setup().await;
    let repo = db.users();
    repo.create(alice()).await.unwrap();

    let err = repo
        .create(CreateUser {
            name: "Other Alice".into(),
            email: "alice@example.com".into(),
            ..alice()
        })
        .await
        .unwrap_err();
    assert!(
        matches!(err, UpasthitiError::AlreadyExists { .. }),
        "expected AlreadyExists, got: {err:?}"
    );
    // The first account is untouched.
    let stored = repo.get_by_email("alice@example.com").await.unwrap();
    assert_eq!(stored.name, "Alice");
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let (db, _dir) = setup().await;
    let repo = db.users();

    let err = repo.get_by_id(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, UpasthitiError::NotFound { .. }));

    let err = repo.get_by_email("nobody@example.com").await.unwrap_err();
    assert!(matches!(err, UpasthitiError::NotFound { .. }));
}

#[tokio::test]
async fn users_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig {
        data_dir: dir.path().to_path_buf(),
    };

    let id = {
        let db = DbManager::open(&config).await.unwrap();
        db.users().create(alice()).await.unwrap().id
    };

    let db = DbManager::open(&config).await.unwrap();
    let fetched = db.users().get_by_id(id).await.unwrap();
    assert_eq!(fetched.email, "alice@example.com");

    let raw = std::fs::read_to_string(dir.path().join("users.json")).unwrap();
    assert!(raw.contains("\"passwordHash\""));
}
