// Framework-side models and their wire shapes.
//
// Each struct (de)serializes directly to/from a PocketBase record body.
// Unknown record fields (`collectionId`, `collectionName`, `created`,
// `updated`) are ignored on read; optional text fields read PocketBase's
// empty string as absent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::datetime::{pb_date, pb_date_opt};

/// A user as seen by the authentication framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterUser {
    /// Store-assigned primary key.
    pub id: String,
    /// Unique across users.
    pub email: String,
    #[serde(
        default,
        with = "pb_date_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub email_verified: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "empty_str_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_str_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<String>,
}

/// Input for `create_user` — user fields without the store-assigned id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    #[serde(with = "pb_date_opt", skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl NewUser {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            email_verified: None,
            name: None,
            image: None,
        }
    }

    pub fn with_email_verified(mut self, at: DateTime<Utc>) -> Self {
        self.email_verified = Some(at);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// Partial user update. Only fields that are `Some` are sent to the
/// backend; the id addresses the record and is never part of the body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(skip_serializing)]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(with = "pb_date_opt", skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl UserPatch {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            email_verified: None,
            name: None,
            image: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_email_verified(mut self, at: DateTime<Utc>) -> Self {
        self.email_verified = Some(at);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// A provider account linked to a user.
///
/// The field naming is mixed by contract: the identity fields are
/// camelCase while the OAuth token fields stay snake_case, so there is
/// no blanket rename here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterAccount {
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Account category, e.g. "oauth", "email", "credentials".
    #[serde(rename = "type")]
    pub account_type: String,
    pub provider: String,
    #[serde(rename = "providerAccountId")]
    pub provider_account_id: String,
    #[serde(
        default,
        deserialize_with = "empty_str_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub refresh_token: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_str_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub access_token: Option<String>,
    /// Access token expiry as unix seconds, as issued by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(
        default,
        deserialize_with = "empty_str_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub token_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_str_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub scope: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_str_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub id_token: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_str_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub session_state: Option<String>,
}

impl AdapterAccount {
    pub fn new(
        user_id: impl Into<String>,
        account_type: impl Into<String>,
        provider: impl Into<String>,
        provider_account_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            account_type: account_type.into(),
            provider: provider.into(),
            provider_account_id: provider_account_id.into(),
            refresh_token: None,
            access_token: None,
            expires_at: None,
            token_type: None,
            scope: None,
            id_token: None,
            session_state: None,
        }
    }
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterSession {
    /// Opaque token, unique across sessions.
    pub session_token: String,
    pub user_id: String,
    #[serde(with = "pb_date")]
    pub expires: DateTime<Utc>,
}

/// Partial session update, keyed by the session token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPatch {
    #[serde(skip_serializing)]
    pub session_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(with = "pb_date_opt", skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
}

impl SessionPatch {
    pub fn new(session_token: impl Into<String>) -> Self {
        Self {
            session_token: session_token.into(),
            user_id: None,
            expires: None,
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }
}

/// The result of the session+user join lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionAndUser {
    pub session: AdapterSession,
    pub user: AdapterUser,
}

/// A one-time-use verification token, unique per (identifier, token).
///
/// The backend record id is dropped on read — the framework shape has
/// no id for this entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationToken {
    /// Usually the email address being verified.
    pub identifier: String,
    pub token: String,
    #[serde(with = "pb_date")]
    pub expires: DateTime<Utc>,
}

fn empty_str_as_none<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
