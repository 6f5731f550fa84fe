//! The signed-in session.
//!
//! [`AuthSession`] is the only reader and writer of the session keys in its
//! store. It also owns the credential handle the HTTP backend reads its
//! bearer header from.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::token::{BearerToken, Credentials};
use crate::api::Backend;
use crate::error::SessionError;
use crate::forms::LoginForm;
use crate::models::UserAccount;
use crate::query::QueryClient;
use crate::sanitize::{redact_email, redact_token};
use crate::storage::{write_json, KeyValueStore};

pub const SESSION_USER_KEY: &str = "backoffice.session.user";
pub const SESSION_TOKEN_KEY: &str = "backoffice.session.token";

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Not booted yet; route decisions are deferred.
    Loading,
    Anonymous,
    Authenticated(UserAccount),
}

pub struct AuthSession {
    store: Arc<dyn KeyValueStore>,
    backend: Arc<dyn Backend>,
    credentials: Credentials,
    cache: Option<QueryClient>,
    state: SessionState,
}

impl AuthSession {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        backend: Arc<dyn Backend>,
        credentials: Credentials,
    ) -> Self {
        Self {
            store,
            backend,
            credentials,
            cache: None,
            state: SessionState::Loading,
        }
    }

    /// Cache to clear whenever the signed-in identity changes.
    pub fn with_cache(mut self, cache: QueryClient) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn user(&self) -> Option<&UserAccount> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state == SessionState::Loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(|u| u.is_admin())
    }

    pub fn boot(&mut self) -> Result<&SessionState, SessionError> {
        self.boot_at(Utc::now())
    }

    /// Restores the session from the store.
    ///
    /// A missing or blank token, a missing or unparseable user, or a JWT
    /// that expired before `now` clears both keys.
    pub fn boot_at(&mut self, now: DateTime<Utc>) -> Result<&SessionState, SessionError> {
        let token = self
            .store
            .get(SESSION_TOKEN_KEY)?
            .and_then(|raw| BearerToken::parse(&raw));
        let user = self
            .store
            .get(SESSION_USER_KEY)?
            .and_then(|raw| match serde_json::from_str::<UserAccount>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    log::warn!("Discarding unreadable stored session user: {}", e);
                    None
                }
            });

        match (token, user) {
            (Some(token), Some(user)) if !token.is_expired(now) => {
                log::debug!(
                    "Restored session for {} (token {})",
                    redact_email(&user.email),
                    redact_token(token.expose())
                );
                self.credentials.set(token);
                self.state = SessionState::Authenticated(user);
            }
            (token, user) => {
                if token.is_some() || user.is_some() {
                    log::info!("Stored session is incomplete or expired, clearing it");
                }
                self.clear_stored()?;
                self.credentials.clear();
                self.state = SessionState::Anonymous;
            }
        }
        Ok(&self.state)
    }

    /// Signs in with one backend call and persists the user/token pair.
    pub async fn login(&mut self, form: &LoginForm) -> Result<UserAccount, SessionError> {
        let request = form.validate().map_err(SessionError::InvalidForm)?;
        let response = self.backend.login(&request).await?;
        let token = BearerToken::parse(&response.token).ok_or(SessionError::MissingToken)?;

        write_json(self.store.as_ref(), SESSION_USER_KEY, &response.user)?;
        self.store.set(SESSION_TOKEN_KEY, token.expose())?;
        self.credentials.set(token);
        self.clear_cache().await;

        log::info!("Signed in as {}", redact_email(&response.user.email));
        self.state = SessionState::Authenticated(response.user.clone());
        Ok(response.user)
    }

    /// Clears the stored pair, the credential header and cached data.
    pub async fn logout(&mut self) -> Result<(), SessionError> {
        self.credentials.clear();
        self.state = SessionState::Anonymous;
        self.clear_cache().await;
        self.clear_stored()?;
        log::info!("Signed out");
        Ok(())
    }

    /// Re-fetches the current user; a rejected credential signs out.
    pub async fn refresh(&mut self) -> Result<Option<UserAccount>, SessionError> {
        if !self.is_authenticated() {
            return Ok(None);
        }
        match self.backend.me().await {
            Ok(user) => {
                write_json(self.store.as_ref(), SESSION_USER_KEY, &user)?;
                self.state = SessionState::Authenticated(user.clone());
                Ok(Some(user))
            }
            Err(e) if e.is_unauthorized() => {
                log::warn!("Session rejected by server: {}", e);
                self.logout().await?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn clear_stored(&self) -> Result<(), SessionError> {
        self.store.remove(SESSION_TOKEN_KEY)?;
        self.store.remove(SESSION_USER_KEY)?;
        Ok(())
    }

    async fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear().await;
        }
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("backend", &self.backend.kind())
            .field("state", &self.state)
            .finish()
    }
}
