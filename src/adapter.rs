// The framework-facing adapter contract and its PocketBase implementation.
//
// `AuthAdapter` mirrors the consuming framework's persistence interface:
// fourteen async operations over users, accounts, sessions and
// verification tokens, each independently optional. `PocketBaseAdapter`
// implements all of them over any `RecordStore`.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{AdapterError, Result};
use crate::filter::Filter;
use crate::store::RecordStore;
use crate::types::{
    AdapterAccount, AdapterSession, AdapterUser, NewUser, SessionAndUser, SessionPatch,
    UserPatch, VerificationToken,
};

/// Names of the four backend collections.
#[derive(Debug, Clone)]
pub struct CollectionNames {
    pub users: String,
    pub accounts: String,
    pub sessions: String,
    pub verification_tokens: String,
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            users: "users".to_string(),
            accounts: "accounts".to_string(),
            sessions: "sessions".to_string(),
            verification_tokens: "verificationTokens".to_string(),
        }
    }
}

/// Configuration for [`PocketBaseAdapter`].
#[derive(Debug, Clone)]
pub struct AdapterOptions {
    /// Backend collection names.
    pub collections: CollectionNames,

    /// Whether `delete_user` also deletes the user's accounts and
    /// sessions. When `false`, related records are left orphaned.
    ///
    /// Default: true
    pub cascade_delete: bool,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            collections: CollectionNames::default(),
            cascade_delete: true,
        }
    }
}

/// The persistence contract expected by the authentication framework.
///
/// Every operation is optional: the default body reports
/// [`AdapterError::Unimplemented`], the Rust rendering of an absent
/// method on the upstream adapter object. Plain lookups signal
/// "not found" as `Ok(None)`, never as an error.
#[async_trait]
pub trait AuthAdapter: Send + Sync + fmt::Debug {
    /// Create a user; the store assigns the id.
    async fn create_user(&self, user: NewUser) -> Result<AdapterUser> {
        let _ = user;
        Err(AdapterError::Unimplemented("create_user"))
    }

    /// Fetch a user by primary key.
    async fn get_user(&self, id: &str) -> Result<Option<AdapterUser>> {
        let _ = id;
        Err(AdapterError::Unimplemented("get_user"))
    }

    /// Fetch a user by unique email.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<AdapterUser>> {
        let _ = email;
        Err(AdapterError::Unimplemented("get_user_by_email"))
    }

    /// Patch a user's fields. Fails with [`AdapterError::NotFound`] if
    /// the id matches no record.
    async fn update_user(&self, patch: UserPatch) -> Result<AdapterUser> {
        let _ = patch;
        Err(AdapterError::Unimplemented("update_user"))
    }

    /// Delete a user (optionally cascading to accounts and sessions).
    /// Deleting a missing user is an idempotent no-op.
    async fn delete_user(&self, id: &str) -> Result<()> {
        let _ = id;
        Err(AdapterError::Unimplemented("delete_user"))
    }

    /// Link a provider account to a user.
    async fn link_account(&self, account: AdapterAccount) -> Result<AdapterAccount> {
        let _ = account;
        Err(AdapterError::Unimplemented("link_account"))
    }

    /// Remove the account matching (provider, providerAccountId) and
    /// return its prior value.
    async fn unlink_account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<AdapterAccount>> {
        let _ = (provider, provider_account_id);
        Err(AdapterError::Unimplemented("unlink_account"))
    }

    /// Resolve (provider, providerAccountId) to the owning user.
    async fn get_user_by_account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<AdapterUser>> {
        let _ = (provider, provider_account_id);
        Err(AdapterError::Unimplemented("get_user_by_account"))
    }

    /// Create a session.
    async fn create_session(&self, session: AdapterSession) -> Result<AdapterSession> {
        let _ = session;
        Err(AdapterError::Unimplemented("create_session"))
    }

    /// Patch the session matching the patch's token.
    async fn update_session(&self, patch: SessionPatch) -> Result<Option<AdapterSession>> {
        let _ = patch;
        Err(AdapterError::Unimplemented("update_session"))
    }

    /// Fetch a session and its owning user; both or neither.
    async fn get_session_and_user(&self, session_token: &str) -> Result<Option<SessionAndUser>> {
        let _ = session_token;
        Err(AdapterError::Unimplemented("get_session_and_user"))
    }

    /// Delete the session with the given token and return its prior value.
    async fn delete_session(&self, session_token: &str) -> Result<Option<AdapterSession>> {
        let _ = session_token;
        Err(AdapterError::Unimplemented("delete_session"))
    }

    /// Create a verification token.
    async fn create_verification_token(
        &self,
        token: VerificationToken,
    ) -> Result<VerificationToken> {
        let _ = token;
        Err(AdapterError::Unimplemented("create_verification_token"))
    }

    /// Consume a verification token: delete it and return its prior
    /// value. A second call with the same pair yields `None`.
    async fn use_verification_token(
        &self,
        identifier: &str,
        token: &str,
    ) -> Result<Option<VerificationToken>> {
        let _ = (identifier, token);
        Err(AdapterError::Unimplemented("use_verification_token"))
    }
}

/// PocketBase-backed implementation of the full [`AuthAdapter`] contract.
///
/// Stateless and reentrant: each call issues one or two sequential store
/// operations and holds nothing between calls. Two-step joins are not
/// transactional; a concurrent deletion between the steps makes the
/// whole lookup return `None`.
#[derive(Debug, Clone)]
pub struct PocketBaseAdapter {
    store: Arc<dyn RecordStore>,
    options: AdapterOptions,
}

impl PocketBaseAdapter {
    /// Create an adapter with default options.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_options(store, AdapterOptions::default())
    }

    /// Create an adapter with explicit collection names and cascade
    /// behavior.
    pub fn with_options(store: Arc<dyn RecordStore>, options: AdapterOptions) -> Self {
        Self { store, options }
    }

    /// The options this adapter was created with.
    pub fn options(&self) -> &AdapterOptions {
        &self.options
    }

    fn users(&self) -> &str {
        &self.options.collections.users
    }

    fn accounts(&self) -> &str {
        &self.options.collections.accounts
    }

    fn sessions(&self) -> &str {
        &self.options.collections.sessions
    }

    fn verification_tokens(&self) -> &str {
        &self.options.collections.verification_tokens
    }
}

/// Deserialize a backend record into a typed model.
fn map_record<T: serde::de::DeserializeOwned>(record: serde_json::Value) -> Result<T> {
    serde_json::from_value(record).map_err(|e| AdapterError::Mapping(e.to_string()))
}

/// The primary key of a backend record.
fn record_id(record: &serde_json::Value) -> Result<String> {
    record
        .get("id")
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| AdapterError::Mapping("record is missing an `id` field".into()))
}

#[async_trait]
impl AuthAdapter for PocketBaseAdapter {
    async fn create_user(&self, user: NewUser) -> Result<AdapterUser> {
        let body = serde_json::to_value(&user)
            .map_err(|e| AdapterError::Mapping(e.to_string()))?;
        let record = self.store.create(self.users(), body).await?;
        map_record(record)
    }

    async fn get_user(&self, id: &str) -> Result<Option<AdapterUser>> {
        let record = self.store.get(self.users(), id).await?;
        record.map(map_record).transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<AdapterUser>> {
        let record = self
            .store
            .first_matching(self.users(), &Filter::eq("email", email))
            .await?;
        record.map(map_record).transpose()
    }

    async fn update_user(&self, patch: UserPatch) -> Result<AdapterUser> {
        let body = serde_json::to_value(&patch)
            .map_err(|e| AdapterError::Mapping(e.to_string()))?;
        let record = self.store.patch(self.users(), &patch.id, body).await?;
        map_record(record)
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        if self.options.cascade_delete {
            let owned = Filter::eq("userId", id);
            for collection in [self.accounts(), self.sessions()] {
                for record in self.store.list(collection, &owned).await? {
                    self.store.delete(collection, &record_id(&record)?).await?;
                }
            }
        }
        self.store.delete(self.users(), id).await
    }

    async fn link_account(&self, account: AdapterAccount) -> Result<AdapterAccount> {
        let body = serde_json::to_value(&account)
            .map_err(|e| AdapterError::Mapping(e.to_string()))?;
        let record = self.store.create(self.accounts(), body).await?;
        map_record(record)
    }

    async fn unlink_account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<AdapterAccount>> {
        let filter =
            Filter::eq("provider", provider).and_eq("providerAccountId", provider_account_id);
        let Some(record) = self.store.first_matching(self.accounts(), &filter).await? else {
            return Ok(None);
        };
        let id = record_id(&record)?;
        let account = map_record(record)?;
        self.store.delete(self.accounts(), &id).await?;
        Ok(Some(account))
    }

    async fn get_user_by_account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<AdapterUser>> {
        let filter =
            Filter::eq("provider", provider).and_eq("providerAccountId", provider_account_id);
        let Some(record) = self.store.first_matching(self.accounts(), &filter).await? else {
            return Ok(None);
        };
        let account: AdapterAccount = map_record(record)?;
        let user = self.store.get(self.users(), &account.user_id).await?;
        user.map(map_record).transpose()
    }

    async fn create_session(&self, session: AdapterSession) -> Result<AdapterSession> {
        let body = serde_json::to_value(&session)
            .map_err(|e| AdapterError::Mapping(e.to_string()))?;
        let record = self.store.create(self.sessions(), body).await?;
        map_record(record)
    }

    async fn update_session(&self, patch: SessionPatch) -> Result<Option<AdapterSession>> {
        let filter = Filter::eq("sessionToken", patch.session_token.as_str());
        let Some(record) = self.store.first_matching(self.sessions(), &filter).await? else {
            return Ok(None);
        };
        let id = record_id(&record)?;
        let body = serde_json::to_value(&patch)
            .map_err(|e| AdapterError::Mapping(e.to_string()))?;
        let updated = self.store.patch(self.sessions(), &id, body).await?;
        map_record(updated).map(Some)
    }

    async fn get_session_and_user(&self, session_token: &str) -> Result<Option<SessionAndUser>> {
        let filter = Filter::eq("sessionToken", session_token);
        let Some(record) = self.store.first_matching(self.sessions(), &filter).await? else {
            return Ok(None);
        };
        let session: AdapterSession = map_record(record)?;
        let Some(user_record) = self.store.get(self.users(), &session.user_id).await? else {
            return Ok(None);
        };
        let user = map_record(user_record)?;
        Ok(Some(SessionAndUser { session, user }))
    }

    async fn delete_session(&self, session_token: &str) -> Result<Option<AdapterSession>> {
        let filter = Filter::eq("sessionToken", session_token);
        let Some(record) = self.store.first_matching(self.sessions(), &filter).await? else {
            return Ok(None);
        };
        let id = record_id(&record)?;
        let session = map_record(record)?;
        self.store.delete(self.sessions(), &id).await?;
        Ok(Some(session))
    }

    async fn create_verification_token(
        &self,
        token: VerificationToken,
    ) -> Result<VerificationToken> {
        let body = serde_json::to_value(&token)
            .map_err(|e| AdapterError::Mapping(e.to_string()))?;
        let record = self.store.create(self.verification_tokens(), body).await?;
        map_record(record)
    }

    async fn use_verification_token(
        &self,
        identifier: &str,
        token: &str,
    ) -> Result<Option<VerificationToken>> {
        let filter = Filter::eq("identifier", identifier).and_eq("token", token);
        let Some(record) = self
            .store
            .first_matching(self.verification_tokens(), &filter)
            .await?
        else {
            return Ok(None);
        };
        let id = record_id(&record)?;
        let value = map_record(record)?;
        self.store.delete(self.verification_tokens(), &id).await?;
        Ok(Some(value))
    }
}
