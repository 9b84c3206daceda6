use super::*;
use crate::test_support::user;

#[test]
fn set_user_authenticates_and_clear_user_reverts() {
    let session = SessionStore::in_memory();
    assert!(!session.is_authenticated());

    session.set_user(user(1, "Ann"), "tok".into());
    assert!(session.is_authenticated());
    assert_eq!(session.token().as_deref(), Some("tok"));

    session.clear_user();
    assert!(!session.is_authenticated());
    assert_eq!(session.token(), None);
    assert_eq!(session.user(), None);
}

#[test]
fn clear_user_is_idempotent() {
    let session = SessionStore::in_memory();
    session.clear_user();
    session.clear_user();
    assert!(!session.is_authenticated());
}

#[test]
fn session_survives_reload_from_storage() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    SessionStore::new(storage.clone()).set_user(user(7, "Bea"), "abc".into());

    let reloaded = SessionStore::new(storage.clone());

    assert!(reloaded.is_authenticated());
    assert_eq!(reloaded.user().unwrap().id, 7);
    assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("abc"));
}

#[test]
fn corrupt_stored_user_counts_as_signed_out() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    storage.set(USER_KEY, "{not json");
    storage.set(TOKEN_KEY, "abc");

    let session = SessionStore::new(storage);

    assert_eq!(session.user(), None);
    assert!(!session.is_authenticated());
}

#[test]
fn update_user_keeps_token() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let session = SessionStore::new(storage.clone());
    session.set_user(user(1, "Ann"), "tok".into());

    session.update_user(user(1, "Annie"));

    assert_eq!(session.user().unwrap().name, "Annie");
    assert_eq!(session.token().as_deref(), Some("tok"));
    assert!(storage.get(USER_KEY).unwrap().contains("Annie"));
}

#[test]
fn clones_share_state() {
    let session = SessionStore::in_memory();
    let other = session.clone();
    session.set_user(user(1, "Ann"), "tok".into());
    assert!(other.is_authenticated());
    other.clear_user();
    assert!(!session.is_authenticated());
}

#[test]
fn debug_output_redacts_token() {
    let session = SessionStore::in_memory();
    session.set_user(user(1, "Ann"), "super-secret".into());
    assert!(!format!("{session:?}").contains("super-secret"));
}
