//! Unit tests for the file-backed credential store

use std::os::unix::fs::PermissionsExt;

use shared_db_reconciler::Error;
use shared_db_reconciler::controller::CredentialStore;
use shared_db_reconciler::resources::FileCredentialStore;

fn store_in(dir: &tempfile::TempDir) -> FileCredentialStore {
    FileCredentialStore::new(dir.path().join("mysql"))
}

#[tokio::test]
async fn test_creates_owner_only_secret_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let password = store.load_or_create("nova").await.unwrap();

    let path = dir.path().join("mysql-nova.secret");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), password);
    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[tokio::test]
async fn test_password_generated_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let first = store.load_or_create("nova").await.unwrap();
    let modified = std::fs::metadata(dir.path().join("mysql-nova.secret"))
        .unwrap()
        .modified()
        .unwrap();
    let second = store.load_or_create("nova").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(
        std::fs::metadata(dir.path().join("mysql-nova.secret"))
            .unwrap()
            .modified()
            .unwrap(),
        modified
    );
}

#[tokio::test]
async fn test_existing_secret_is_trimmed() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("mysql-keystone.secret"), "hunter2\n").unwrap();

    let password = store_in(&dir).load_or_create("keystone").await.unwrap();

    assert_eq!(password, "hunter2");
}

#[tokio::test]
async fn test_usernames_get_independent_passwords() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let nova = store.load_or_create("nova").await.unwrap();
    let glance = store.load_or_create("glance").await.unwrap();

    assert_ne!(nova, glance);
}

#[tokio::test]
async fn test_empty_secret_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("mysql-nova.secret"), "  \n").unwrap();

    let err = store_in(&dir).load_or_create("nova").await.unwrap_err();

    assert!(matches!(err, Error::CredentialIoError { username, .. } if username == "nova"));
}

#[tokio::test]
async fn test_missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCredentialStore::new(dir.path().join("absent").join("mysql"));

    let err = store.load_or_create("nova").await.unwrap_err();

    assert!(matches!(err, Error::CredentialIoError { .. }));
}

#[tokio::test]
async fn test_unsafe_username_rejected() {
    let dir = tempfile::tempdir().unwrap();

    let err = store_in(&dir).load_or_create("../nova").await.unwrap_err();

    assert!(matches!(err, Error::InvalidUsernameError(_)));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
