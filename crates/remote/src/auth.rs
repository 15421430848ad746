//! Authentication surface and the explicit session context.
//!
//! [`SessionContext`] is the single owner of the current [`Session`]. It is
//! created once at start-up and passed to whatever needs the signed-in user
//! (the HTTP backend for bearer tokens, controllers for ownership). Session
//! transitions are published as [`AuthEvent`]s to every live
//! [`AuthSubscription`].
//!
//! [`AuthClient`] talks to the `/auth/v1/*` endpoints and keeps the context
//! current; [`refresh_loop`] renews the access token before it expires.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use taskdeck_core::error::CoreError;
use taskdeck_core::types::{Id, Timestamp};
use tokio::sync::{broadcast, RwLock};
use tokio_util::sync::CancellationToken;

use crate::config::RemoteConfig;

/// Buffer capacity for auth events.
const EVENT_CAPACITY: usize = 64;

/// Renew the access token this long before it expires.
pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Delay before retrying a failed refresh.
const REFRESH_RETRY_DELAY: Duration = Duration::from_secs(15);

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Id,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
}

impl AuthUser {
    /// Display name from sign-up metadata, falling back to the email.
    pub fn display_name(&self) -> Option<String> {
        self.user_metadata
            .get("full_name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| self.email.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: Timestamp,
    pub user: AuthUser,
}

impl Session {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }

    /// Time left before the token should be refreshed, zero if overdue.
    pub fn refresh_due_in(&self, now: Timestamp, margin: Duration) -> Duration {
        let margin = chrono::Duration::from_std(margin).unwrap_or_else(|_| chrono::Duration::zero());
        (self.expires_at - margin - now)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn { user_id: Id },
    SignedOut,
    TokenRefreshed { user_id: Id },
    UserUpdated { user_id: Id },
}

// ---------------------------------------------------------------------------
// SessionContext
// ---------------------------------------------------------------------------

pub struct SessionContext {
    session: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthEvent>,
}

impl SessionContext {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            session: RwLock::new(None),
            events,
        }
    }

    pub async fn current(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    pub async fn user_id(&self) -> Option<Id> {
        self.session.read().await.as_ref().map(|s| s.user.id)
    }

    /// The signed-in user's id, or `Unauthorized`.
    pub async fn require_user(&self) -> Result<Id, CoreError> {
        self.user_id()
            .await
            .ok_or_else(|| CoreError::Unauthorized("Sign in to continue".to_string()))
    }

    /// Install a session and publish the matching event.
    pub async fn set_session(&self, session: Session, event: AuthEvent) {
        *self.session.write().await = Some(session);
        self.publish(event);
    }

    /// Replace the user on the current session.
    pub async fn update_user(&self, user: AuthUser) {
        let user_id = user.id;
        let changed = {
            let mut guard = self.session.write().await;
            match guard.as_mut() {
                Some(session) if session.user != user => {
                    session.user = user;
                    true
                }
                _ => false,
            }
        };
        if changed {
            self.publish(AuthEvent::UserUpdated { user_id });
        }
    }

    /// Drop the session. Publishes `SignedOut` only if one existed.
    pub async fn clear(&self) {
        let had_session = self.session.write().await.take().is_some();
        if had_session {
            self.publish(AuthEvent::SignedOut);
        }
    }

    pub fn subscribe(&self) -> AuthSubscription {
        AuthSubscription {
            receiver: self.events.subscribe(),
        }
    }

    fn publish(&self, event: AuthEvent) {
        tracing::debug!(?event, "Auth state changed");
        // Zero subscribers is fine.
        let _ = self.events.send(event);
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Live subscription to auth events. Dropping it unsubscribes.
pub struct AuthSubscription {
    receiver: broadcast::Receiver<AuthEvent>,
}

impl AuthSubscription {
    /// Next event, or `None` once the context is gone.
    ///
    /// Lagged events are skipped; only the most recent transitions matter.
    pub async fn next(&mut self) -> Option<AuthEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Auth subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {}
}

// ---------------------------------------------------------------------------
// AuthClient
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Not signed in")]
    NotSignedIn,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Auth request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Auth service error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed access token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: Option<i64>,
    expires_at: Option<i64>,
    user: Option<AuthUser>,
}

/// Claims read from the access token when the response omits the user.
#[derive(Debug, Deserialize)]
struct TokenClaims {
    sub: Id,
    exp: Option<i64>,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    context: Arc<SessionContext>,
}

impl AuthClient {
    pub fn new(config: &RemoteConfig, context: Arc<SessionContext>) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            context,
        })
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    pub async fn current_session(&self) -> Option<Session> {
        self.context.current().await
    }

    /// Password sign-in. Publishes `SignedIn`.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let body = json!({ "email": email, "password": password });
        let response = self
            .post("/auth/v1/token?grant_type=password", &body, None)
            .await;
        let tokens: TokenResponse = match response {
            Err(AuthError::Api { status: 400, .. }) => return Err(AuthError::InvalidCredentials),
            other => other?,
        };
        let session = session_from_tokens(tokens)?;
        tracing::info!(user_id = %session.user.id, "Signed in");
        self.context
            .set_session(
                session.clone(),
                AuthEvent::SignedIn {
                    user_id: session.user.id,
                },
            )
            .await;
        Ok(session)
    }

    /// Register a new account.
    ///
    /// Returns `None` when the service requires email confirmation before
    /// issuing a session.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<Option<Session>, AuthError> {
        let body = json!({
            "email": email,
            "password": password,
            "data": { "full_name": full_name },
        });
        let value: Value = self.post("/auth/v1/signup", &body, None).await?;
        if value.get("access_token").is_none() {
            tracing::info!(email, "Sign-up pending email confirmation");
            return Ok(None);
        }

        let tokens: TokenResponse = serde_json::from_value(value).map_err(|e| AuthError::Api {
            status: 200,
            message: format!("unexpected sign-up response: {e}"),
        })?;
        let session = session_from_tokens(tokens)?;
        self.context
            .set_session(
                session.clone(),
                AuthEvent::SignedIn {
                    user_id: session.user.id,
                },
            )
            .await;
        Ok(Some(session))
    }

    /// Revoke the session remotely and always clear it locally.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(token) = self.context.access_token().await else {
            return Ok(());
        };
        let result = self
            .post::<Value>("/auth/v1/logout", &json!({}), Some(&token))
            .await
            .map(|_| ());
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Remote sign-out failed, clearing local session anyway");
        }
        self.context.clear().await;
        result
    }

    /// Exchange the refresh token for a new session. Publishes
    /// `TokenRefreshed`.
    pub async fn refresh(&self) -> Result<Session, AuthError> {
        let current = self.context.current().await.ok_or(AuthError::NotSignedIn)?;
        let body = json!({ "refresh_token": current.refresh_token });
        let tokens: TokenResponse = self
            .post("/auth/v1/token?grant_type=refresh_token", &body, None)
            .await?;
        let session = session_from_tokens(tokens)?;
        self.context
            .set_session(
                session.clone(),
                AuthEvent::TokenRefreshed {
                    user_id: session.user.id,
                },
            )
            .await;
        Ok(session)
    }

    /// Fetch the current user from the service and update the context.
    pub async fn current_user(&self) -> Result<AuthUser, AuthError> {
        let token = self
            .context
            .access_token()
            .await
            .ok_or(AuthError::NotSignedIn)?;
        let response = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await?;
        let user: AuthUser = Self::parse(response).await?;
        self.context.update_user(user.clone()).await;
        Ok(user)
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
        bearer: Option<&str>,
    ) -> Result<T, AuthError> {
        let token = bearer.unwrap_or(&self.api_key);
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AuthError> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AuthErrorBody>(&text)
                .ok()
                .and_then(|b| b.error_description.or(b.msg).or(b.message).or(b.error))
                .unwrap_or(text);
            return Err(AuthError::Api {
                status: status.as_u16(),
                message,
            });
        }
        let text = response.text().await?;
        let text = if text.trim().is_empty() { "null" } else { &text };
        serde_json::from_str(text).map_err(|e| AuthError::Api {
            status: status.as_u16(),
            message: format!("unexpected response body: {e}"),
        })
    }
}

/// Build a session, falling back to token claims for the user and expiry.
fn session_from_tokens(tokens: TokenResponse) -> Result<Session, AuthError> {
    let now = Utc::now();
    let claims = match (&tokens.user, tokens.expires_at.or(tokens.expires_in)) {
        (Some(_), Some(_)) => None,
        _ => Some(read_claims(&tokens.access_token)?),
    };

    let expires_at = tokens
        .expires_at
        .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
        .or_else(|| {
            tokens
                .expires_in
                .map(|secs| now + chrono::Duration::seconds(secs))
        })
        .or_else(|| {
            claims
                .as_ref()
                .and_then(|c| c.exp)
                .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
        })
        .unwrap_or(now);

    let user = match (tokens.user, claims) {
        (Some(user), _) => user,
        (None, Some(claims)) => AuthUser {
            id: claims.sub,
            email: claims.email,
            user_metadata: Value::Null,
        },
        (None, None) => read_claims(&tokens.access_token).map(|c| AuthUser {
            id: c.sub,
            email: c.email,
            user_metadata: Value::Null,
        })?,
    };

    Ok(Session {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_at,
        user,
    })
}

/// Read claims without verifying the signature; the service verifies tokens,
/// the client only needs `sub` and `exp`.
fn read_claims(token: &str) -> Result<TokenClaims, AuthError> {
    let mut validation = jsonwebtoken::Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    let data = jsonwebtoken::decode::<TokenClaims>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(&[]),
        &validation,
    )?;
    Ok(data.claims)
}

// ---------------------------------------------------------------------------
// Refresh loop
// ---------------------------------------------------------------------------

/// Keep the session fresh until `cancel` fires.
///
/// Sleeps until `margin` before expiry, then refreshes. While signed out it
/// waits for the next auth event. A refresh rejected by the service clears
/// the session; transport failures are retried after a short delay.
pub async fn refresh_loop(auth: &AuthClient, margin: Duration, cancel: &CancellationToken) {
    let mut events = auth.context().subscribe();

    loop {
        let Some(session) = auth.current_session().await else {
            tokio::select! {
                _ = cancel.cancelled() => return,
                event = events.next() => {
                    if event.is_none() {
                        return;
                    }
                    continue;
                }
            }
        };

        let wait = session.refresh_due_in(Utc::now(), margin);
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session refresh loop cancelled");
                return;
            }
            // A sign-in or sign-out changes the deadline; re-evaluate.
            _ = events.next() => continue,
            _ = tokio::time::sleep(wait) => {}
        }

        match auth.refresh().await {
            Ok(_) => tracing::debug!("Session refreshed"),
            Err(AuthError::Api { status, message }) if (400..500).contains(&status) => {
                tracing::warn!(status, %message, "Refresh rejected, signing out");
                auth.context().clear().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session refresh failed, retrying");
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(REFRESH_RETRY_DELAY) => {}
                }
            }
        }
    }
}
