#![forbid(unsafe_code)]

use om_storage::{NewUser, SqliteStore, StoreError};
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let dir = base.join(format!("om_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        password_hash: "salt$digest".to_string(),
        first_name: "Awa".to_string(),
        last_name: "Mbarga".to_string(),
        phone: None,
        role: "CONSULTANT".to_string(),
    }
}

#[test]
fn user_ids_follow_the_counter() {
    let dir = temp_dir("user_ids_follow_the_counter");
    let mut store = SqliteStore::open(&dir).expect("open store");

    let first = store.create_user(user("a@om.cm")).expect("first user");
    let second = store.create_user(user("b@om.cm")).expect("second user");

    assert_eq!(first.id, "USR-001");
    assert_eq!(second.id, "USR-002");
    assert!(first.is_active);
    assert_eq!(first.last_login_ms, None);
}

#[test]
fn duplicate_email_is_rejected() {
    let dir = temp_dir("duplicate_email_is_rejected");
    let mut store = SqliteStore::open(&dir).expect("open store");

    store.create_user(user("awa@om.cm")).expect("first user");
    let err = store
        .create_user(user("awa@om.cm"))
        .expect_err("second insert must fail");
    assert!(matches!(err, StoreError::EmailTaken));

    assert!(store.email_taken("awa@om.cm").expect("lookup"));
    assert!(!store.email_taken("other@om.cm").expect("lookup"));
}

#[test]
fn lookup_by_email_and_id_round_trip() {
    let dir = temp_dir("lookup_by_email_and_id_round_trip");
    let mut store = SqliteStore::open(&dir).expect("open store");

    let created = store.create_user(user("awa@om.cm")).expect("create");
    let by_email = store
        .user_by_email("awa@om.cm")
        .expect("query")
        .expect("present");
    assert_eq!(by_email.id, created.id);

    let by_id = store.user_by_id(&created.id).expect("query").expect("present");
    assert_eq!(by_id.email, "awa@om.cm");

    assert!(store.user_by_id("USR-999").expect("query").is_none());

    let lite = store.user_lite(&created.id).expect("query").expect("present");
    assert_eq!(lite.first_name, "Awa");
    assert_eq!(lite.last_name, "Mbarga");
}

#[test]
fn sessions_resolve_until_expiry() {
    let dir = temp_dir("sessions_resolve_until_expiry");
    let mut store = SqliteStore::open(&dir).expect("open store");

    let owner = store.create_user(user("awa@om.cm")).expect("create");
    store
        .create_session(&owner.id, "tok-live", 60_000)
        .expect("live session");
    store
        .create_session(&owner.id, "tok-dead", -1)
        .expect("expired session");

    let resolved = store
        .session_user("tok-live")
        .expect("query")
        .expect("live token resolves");
    assert_eq!(resolved.id, owner.id);

    assert!(store.session_user("tok-dead").expect("query").is_none());
    assert!(store.session_user("tok-unknown").expect("query").is_none());

    let purged = store.purge_expired_sessions().expect("purge");
    assert_eq!(purged, 1);

    assert!(store.delete_session("tok-live").expect("delete"));
    assert!(!store.delete_session("tok-live").expect("second delete"));
    assert!(store.session_user("tok-live").expect("query").is_none());
}

#[test]
fn touch_last_login_stamps_the_account() {
    let dir = temp_dir("touch_last_login_stamps_the_account");
    let mut store = SqliteStore::open(&dir).expect("open store");

    let owner = store.create_user(user("awa@om.cm")).expect("create");
    store.touch_last_login(&owner.id).expect("touch");

    let reloaded = store.user_by_id(&owner.id).expect("query").expect("present");
    assert!(reloaded.last_login_ms.is_some());
}
