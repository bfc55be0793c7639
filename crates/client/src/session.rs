//! Bearer-token persistence and the login / restore / logout lifecycle.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use ticketdesk_common::error::{TicketdeskError, TicketdeskResult};
use ticketdesk_common::models::{Profile, User};

use crate::client::TicketingClient;
use crate::forms::Registration;

/// Key the token is stored under.
pub const TOKEN_KEY: &str = "authToken";

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> TicketdeskResult<Option<String>>;
    async fn save(&self, token: &str) -> TicketdeskResult<()>;
    async fn clear(&self) -> TicketdeskResult<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSession {
    #[serde(rename = "authToken", default)]
    auth_token: Option<String>,
}

/// JSON file holding `{"authToken": "..."}`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> TicketdeskResult<Option<String>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(TicketdeskError::Storage(format!(
                    "failed to read '{}': {e}",
                    self.path.display()
                )))
            }
        };

        match serde_json::from_str::<StoredSession>(&raw) {
            Ok(stored) => Ok(stored.auth_token),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    async fn save(&self, token: &str) -> TicketdeskResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    TicketdeskError::Storage(format!("failed to create '{}': {e}", parent.display()))
                })?;
            }
        }

        let body = serde_json::to_string(&StoredSession {
            auth_token: Some(token.to_owned()),
        })
        .map_err(|e| TicketdeskError::Internal(e.to_string()))?;

        let tmp_path = self.path.with_extension("tmp");
        if let Err(e) = tokio::fs::write(&tmp_path, body).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(TicketdeskError::Storage(format!("failed to write session: {e}")));
        }
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| TicketdeskError::Storage(format!("failed to persist session: {e}")))
    }

    async fn clear(&self) -> TicketdeskResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TicketdeskError::Storage(format!(
                "failed to remove '{}': {e}",
                self.path.display()
            ))),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    fn slot(&self) -> TicketdeskResult<std::sync::MutexGuard<'_, Option<String>>> {
        self.token
            .lock()
            .map_err(|_| TicketdeskError::Internal("session store lock poisoned".into()))
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> TicketdeskResult<Option<String>> {
        Ok(self.slot()?.clone())
    }

    async fn save(&self, token: &str) -> TicketdeskResult<()> {
        *self.slot()? = Some(token.to_owned());
        Ok(())
    }

    async fn clear(&self) -> TicketdeskResult<()> {
        *self.slot()? = None;
        Ok(())
    }
}

/// An authenticated session: the validated profile plus a client carrying its token.
#[derive(Clone)]
pub struct Session {
    client: TicketingClient,
    profile: Profile,
}

impl Session {
    pub fn client(&self) -> &TicketingClient {
        &self.client
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn user_id(&self) -> &str {
        &self.profile.id
    }

    pub fn is_admin(&self) -> bool {
        self.profile.admin
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("profile", &self.profile)
            .field("token", &"<redacted>")
            .finish()
    }
}

fn usable_token(raw: Option<String>) -> Option<String> {
    raw.map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty() && t != "null")
}

pub struct SessionManager<S> {
    client: TicketingClient,
    store: S,
}

impl<S: SessionStore> SessionManager<S> {
    /// `client` is used unauthenticated; sessions get their own tokened copy.
    pub fn new(client: TicketingClient, store: S) -> Self {
        Self { client, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resume the stored session, if its token still validates.
    pub async fn restore(&self) -> TicketdeskResult<Option<Session>> {
        let Some(token) = usable_token(self.store.load().await?) else {
            return Ok(None);
        };

        match self.validate(&token).await {
            Ok(session) => {
                tracing::info!(user_id = %session.user_id(), "session restored");
                Ok(Some(session))
            }
            Err(e) => {
                tracing::warn!(error = %e, "stored session rejected, clearing");
                self.store.clear().await?;
                if e.is_auth() {
                    Ok(None)
                } else {
                    Err(e)
                }
            }
        }
    }

    pub async fn login(&self, identity: &str, password: &str) -> TicketdeskResult<Session> {
        let token = self.client.login(identity.trim(), password).await;
        self.establish(token.map_err(TicketdeskError::from)).await
    }

    pub async fn login_with_google(&self, access_token: &str) -> TicketdeskResult<Session> {
        let token = self.client.login_with_google(access_token).await;
        self.establish(token.map_err(TicketdeskError::from)).await
    }

    async fn establish(&self, token: TicketdeskResult<Option<String>>) -> TicketdeskResult<Session> {
        let outcome = match token {
            Ok(Some(token)) => self.validate(&token).await.map(|session| (token, session)),
            Ok(None) => Err(TicketdeskError::Auth("invalid credentials".into())),
            Err(e) => Err(e),
        };

        match outcome {
            Ok((token, session)) => {
                self.store.save(&token).await?;
                tracing::info!(user_id = %session.user_id(), admin = session.is_admin(), "logged in");
                Ok(session)
            }
            Err(e) => {
                self.store.clear().await?;
                Err(e)
            }
        }
    }

    async fn validate(&self, token: &str) -> TicketdeskResult<Session> {
        let client = self.client.with_token(token);
        let profile = client.fetch_profile().await?;
        if profile.id.trim().is_empty() {
            return Err(TicketdeskError::Auth("profile has no id".into()));
        }
        Ok(Session { client, profile })
    }

    /// Best-effort server logout; the local token is always dropped.
    pub async fn logout(&self) -> TicketdeskResult<()> {
        if let Some(token) = usable_token(self.store.load().await?) {
            if let Err(e) = self.client.with_token(token).logout().await {
                tracing::warn!(error = %e, "server logout failed, clearing local session anyway");
            }
        }
        self.store.clear().await?;
        tracing::info!("logged out");
        Ok(())
    }

    /// Drop the stored token after the gateway rejected it mid-session.
    pub async fn invalidate(&self) -> TicketdeskResult<()> {
        tracing::warn!("session invalidated");
        self.store.clear().await
    }

    pub async fn register(&self, registration: Registration) -> TicketdeskResult<Option<User>> {
        let request = registration.validate()?;
        let user = self.client.register(&request).await?;
        tracing::info!(username = %request.username, "account registered");
        Ok(user)
    }
}
