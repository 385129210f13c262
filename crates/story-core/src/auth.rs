//! Session persistence and the register/login/logout service.
//!
//! The session is stored as two entries: the bearer token under
//! `accessToken` and the profile JSON under `userData`. Tokens are never
//! logged or displayed in full.

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::{ApiClient, ApiError, ApiResult, RequestOptions};
use crate::storage::{ACCESS_TOKEN_KEY, Storage, USER_DATA_KEY};

/// Identity of the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Bearer token plus the profile it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: Profile,
}

/// Persisted session state. Only the API client and [`AuthService`] write it.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn Storage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// The persisted token, if present and non-empty.
    pub fn token(&self) -> Option<String> {
        self.storage
            .get(ACCESS_TOKEN_KEY)
            .filter(|token| !token.trim().is_empty())
    }

    /// The persisted profile. An unreadable entry counts as absent.
    pub fn profile(&self) -> Option<Profile> {
        let raw = self.storage.get(USER_DATA_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable persisted profile");
                None
            }
        }
    }

    pub fn session(&self) -> Option<Session> {
        Some(Session {
            token: self.token()?,
            user: self.profile()?,
        })
    }

    /// Replaces any prior session.
    ///
    /// Either both entries are written or the session is cleared.
    ///
    /// # Errors
    /// Returns an error if either entry cannot be persisted.
    pub fn save(&self, session: &Session) -> Result<()> {
        let profile =
            serde_json::to_string(&session.user).context("Failed to serialize user profile")?;
        let written = self
            .storage
            .set(ACCESS_TOKEN_KEY, &session.token)
            .and_then(|()| self.storage.set(USER_DATA_KEY, &profile));

        if let Err(err) = written {
            if let Err(clear_err) = self.clear() {
                tracing::warn!(error = %clear_err, "failed to roll back partial session");
            }
            return Err(err);
        }
        Ok(())
    }

    /// Removes both session entries. Clearing an empty store is a no-op.
    ///
    /// # Errors
    /// Returns an error if the removal cannot be persisted.
    pub fn clear(&self) -> Result<()> {
        let token = self.storage.remove(ACCESS_TOKEN_KEY);
        let profile = self.storage.remove(USER_DATA_KEY);
        token.and(profile)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.token().is_some())
            .finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    login_result: LoginResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResult {
    user_id: String,
    name: String,
    token: String,
}

/// Register/login/logout against the Story API.
pub struct AuthService {
    client: Arc<ApiClient>,
}

impl AuthService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Creates an account. Does not log the user in.
    ///
    /// The API only acknowledges the registration, so the returned profile
    /// echoes the submitted name and email and carries no id.
    ///
    /// # Errors
    /// Propagates the [`ApiError`] of the underlying call.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> ApiResult<Profile> {
        let body = json!({ "name": name, "email": email, "password": password });
        self.client
            .request_json::<serde_json::Value>(Method::POST, "/register", RequestOptions::json(body))
            .await?;

        tracing::info!("account registered");
        Ok(Profile {
            id: None,
            name: name.to_string(),
            email: Some(email.to_string()),
        })
    }

    /// Logs in and persists the returned session, replacing any prior one.
    ///
    /// # Errors
    /// Propagates the [`ApiError`] of the underlying call; a session that
    /// cannot be persisted is reported as `UNKNOWN_ERROR`.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<Session> {
        let body = json!({ "email": email, "password": password });
        let response: LoginResponse = self
            .client
            .request_json(Method::POST, "/login", RequestOptions::json(body))
            .await?;

        let result = response.login_result;
        let session = Session {
            token: result.token,
            user: Profile {
                id: Some(result.user_id),
                name: result.name,
                email: Some(email.to_string()),
            },
        };

        self.client
            .session()
            .save(&session)
            .map_err(|err| ApiError::unknown(format!("Failed to persist session: {err:#}")))?;

        tracing::info!(user = %session.user.name, "logged in");
        Ok(session)
    }

    /// Clears the session. Idempotent; no network call.
    ///
    /// # Errors
    /// Returns an error if the cleared state cannot be persisted.
    pub fn logout(&self) -> Result<()> {
        self.client.session().clear()?;
        tracing::info!("logged out");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.session().token().is_some()
    }

    pub fn current_user(&self) -> Option<Profile> {
        self.client.session().profile()
    }

    /// The complete persisted session, if both entries are present.
    pub fn current_session(&self) -> Option<Session> {
        self.client.session().session()
    }
}

/// Masks a token for display, keeping only its edges.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
