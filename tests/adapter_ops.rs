// Integration tests for the full adapter contract, run against the
// in-memory record store. Each test builds its own adapter and fixtures;
// nothing is shared between tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use pocketbase_adapter::{
    AdapterAccount, AdapterOptions, AdapterSession, AuthAdapter, MemoryStore, NewUser,
    PocketBaseAdapter, RecordStore, SessionPatch, UserPatch, VerificationToken,
};

fn adapter() -> (PocketBaseAdapter, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (PocketBaseAdapter::new(store.clone()), store)
}

fn verified_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap()
}

fn expires_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
}

#[tokio::test]
async fn create_user_round_trips_through_get_user() {
    let (adapter, _) = adapter();

    let created = adapter
        .create_user(
            NewUser::new("test@example.com")
                .with_email_verified(verified_at())
                .with_name("Test User")
                .with_image("https://example.com/image.jpg"),
        )
        .await
        .unwrap();
    assert!(!created.id.is_empty());

    let fetched = adapter.get_user(&created.id).await.unwrap().unwrap();
    assert_eq!(fetched.email, "test@example.com");
    assert_eq!(fetched.email_verified, Some(verified_at()));
    assert_eq!(fetched.name.as_deref(), Some("Test User"));
    assert_eq!(fetched.image.as_deref(), Some("https://example.com/image.jpg"));
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_user_by_email_matches_get_user() {
    let (adapter, _) = adapter();

    let created = adapter
        .create_user(NewUser::new("test@example.com"))
        .await
        .unwrap();

    let by_email = adapter
        .get_user_by_email("test@example.com")
        .await
        .unwrap()
        .unwrap();
    let by_id = adapter.get_user(&created.id).await.unwrap().unwrap();
    assert_eq!(by_email, by_id);

    let miss = adapter.get_user_by_email("nobody@example.com").await.unwrap();
    assert!(miss.is_none());
}

#[tokio::test]
async fn get_user_with_unknown_id_is_none() {
    let (adapter, _) = adapter();
    assert!(adapter.get_user("does-not-exist").await.unwrap().is_none());
}

#[tokio::test]
async fn update_user_patches_image_and_keeps_email() {
    let (adapter, _) = adapter();

    let created = adapter
        .create_user(NewUser::new("test@example.com").with_image("https://example.com/old.png"))
        .await
        .unwrap();

    let updated = adapter
        .update_user(UserPatch::new(&created.id).with_image("https://example.com/new.png"))
        .await
        .unwrap();
    assert_eq!(updated.image.as_deref(), Some("https://example.com/new.png"));
    assert_eq!(updated.email, "test@example.com");

    let fetched = adapter.get_user(&created.id).await.unwrap().unwrap();
    assert_eq!(fetched.image.as_deref(), Some("https://example.com/new.png"));
    assert_eq!(fetched.email, "test@example.com");
}

#[tokio::test]
async fn update_user_with_unknown_id_fails_loudly() {
    let (adapter, _) = adapter();
    let err = adapter
        .update_user(UserPatch::new("does-not-exist").with_name("X"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn link_account_then_get_user_by_account_returns_owner() {
    let (adapter, _) = adapter();

    let user = adapter
        .create_user(NewUser::new("owner@example.com"))
        .await
        .unwrap();

    let linked = adapter
        .link_account(AdapterAccount::new(&user.id, "oauth", "github", "gh-42"))
        .await
        .unwrap();
    assert_eq!(linked.provider_account_id, "gh-42");

    let owner = adapter
        .get_user_by_account("github", "gh-42")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(owner.id, user.id);

    let miss = adapter
        .get_user_by_account("github", "gh-999")
        .await
        .unwrap();
    assert!(miss.is_none());
}

#[tokio::test]
async fn unlink_account_removes_the_link() {
    let (adapter, _) = adapter();

    let user = adapter
        .create_user(NewUser::new("owner@example.com"))
        .await
        .unwrap();
    adapter
        .link_account(AdapterAccount::new(&user.id, "oauth", "github", "gh-42"))
        .await
        .unwrap();

    let removed = adapter
        .unlink_account("github", "gh-42")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(removed.user_id, user.id);
    assert_eq!(removed.provider, "github");

    assert!(adapter
        .get_user_by_account("github", "gh-42")
        .await
        .unwrap()
        .is_none());

    // A second unlink finds nothing.
    assert!(adapter.unlink_account("github", "gh-42").await.unwrap().is_none());
}

#[tokio::test]
async fn session_lifecycle() {
    let (adapter, _) = adapter();

    let user = adapter
        .create_user(NewUser::new("owner@example.com"))
        .await
        .unwrap();

    let session = adapter
        .create_session(AdapterSession {
            session_token: "tok-1".into(),
            user_id: user.id.clone(),
            expires: expires_at(),
        })
        .await
        .unwrap();
    assert_eq!(session.session_token, "tok-1");

    let joined = adapter
        .get_session_and_user("tok-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(joined.session.session_token, "tok-1");
    assert_eq!(joined.session.expires, expires_at());
    assert_eq!(joined.user.id, user.id);

    let later = expires_at() + Duration::hours(24);
    let updated = adapter
        .update_session(SessionPatch::new("tok-1").with_expires(later))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.expires, later);
    assert_eq!(updated.user_id, user.id);

    let deleted = adapter.delete_session("tok-1").await.unwrap().unwrap();
    assert_eq!(deleted.session_token, "tok-1");

    assert!(adapter.get_session_and_user("tok-1").await.unwrap().is_none());
    assert!(adapter.delete_session("tok-1").await.unwrap().is_none());
}

#[tokio::test]
async fn update_session_with_unknown_token_is_none() {
    let (adapter, _) = adapter();
    let result = adapter
        .update_session(SessionPatch::new("missing").with_expires(expires_at()))
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn session_without_owner_yields_no_join() {
    let (adapter, store) = adapter();

    let user = adapter
        .create_user(NewUser::new("owner@example.com"))
        .await
        .unwrap();
    adapter
        .create_session(AdapterSession {
            session_token: "tok-1".into(),
            user_id: user.id.clone(),
            expires: expires_at(),
        })
        .await
        .unwrap();

    // Remove the owner behind the adapter's back; the session record
    // still exists, but the join must return neither.
    store.delete("users", &user.id).await.unwrap();

    assert!(adapter.get_session_and_user("tok-1").await.unwrap().is_none());
    assert_eq!(store.collection_count("sessions").await, 1);
}

#[tokio::test]
async fn verification_token_is_single_use() {
    let (adapter, _) = adapter();

    let created = adapter
        .create_verification_token(VerificationToken {
            identifier: "mock@example.com".into(),
            token: "vt-1".into(),
            expires: expires_at(),
        })
        .await
        .unwrap();
    assert_eq!(created.token, "vt-1");

    let first = adapter
        .use_verification_token("mock@example.com", "vt-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.identifier, "mock@example.com");
    assert_eq!(first.token, "vt-1");
    assert_eq!(first.expires, expires_at());

    let second = adapter
        .use_verification_token("mock@example.com", "vt-1")
        .await
        .unwrap();
    assert!(second.is_none());
}

#[tokio::test]
async fn delete_user_cascades_accounts_and_sessions() {
    let (adapter, store) = adapter();

    let user = adapter
        .create_user(NewUser::new("owner@example.com"))
        .await
        .unwrap();
    let other = adapter
        .create_user(NewUser::new("other@example.com"))
        .await
        .unwrap();

    adapter
        .link_account(AdapterAccount::new(&user.id, "oauth", "github", "gh-42"))
        .await
        .unwrap();
    adapter
        .link_account(AdapterAccount::new(&other.id, "oauth", "github", "gh-77"))
        .await
        .unwrap();
    adapter
        .create_session(AdapterSession {
            session_token: "tok-1".into(),
            user_id: user.id.clone(),
            expires: expires_at(),
        })
        .await
        .unwrap();

    adapter.delete_user(&user.id).await.unwrap();

    assert!(adapter.get_user(&user.id).await.unwrap().is_none());
    assert!(adapter
        .get_user_by_account("github", "gh-42")
        .await
        .unwrap()
        .is_none());
    assert!(adapter.get_session_and_user("tok-1").await.unwrap().is_none());

    // The other user's records survive.
    assert_eq!(store.collection_count("accounts").await, 1);
    assert!(adapter
        .get_user_by_account("github", "gh-77")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn delete_user_without_cascade_leaves_related_records() {
    let store = Arc::new(MemoryStore::new());
    let adapter = PocketBaseAdapter::with_options(
        store.clone(),
        AdapterOptions {
            cascade_delete: false,
            ..Default::default()
        },
    );

    let user = adapter
        .create_user(NewUser::new("owner@example.com"))
        .await
        .unwrap();
    adapter
        .link_account(AdapterAccount::new(&user.id, "oauth", "github", "gh-42"))
        .await
        .unwrap();

    adapter.delete_user(&user.id).await.unwrap();

    assert!(adapter.get_user(&user.id).await.unwrap().is_none());
    assert_eq!(store.collection_count("accounts").await, 1);
}

#[tokio::test]
async fn delete_user_with_unknown_id_is_a_no_op() {
    let (adapter, _) = adapter();
    adapter.delete_user("does-not-exist").await.unwrap();
}

#[tokio::test]
async fn custom_collection_names_are_honored() {
    let store = Arc::new(MemoryStore::new());
    let adapter = PocketBaseAdapter::with_options(
        store.clone(),
        AdapterOptions {
            collections: pocketbase_adapter::CollectionNames {
                users: "authUsers".into(),
                ..Default::default()
            },
            ..Default::default()
        },
    );

    adapter
        .create_user(NewUser::new("test@example.com"))
        .await
        .unwrap();
    assert_eq!(store.collection_count("authUsers").await, 1);
    assert_eq!(store.collection_count("users").await, 0);
}
