use crate::relay::{Outbox, SelectionRelay};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

pub const SESSION_COOKIE: &str = "certdesk_session_id";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid session")]
    Invalid,
    #[error("session expired")]
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub user_id: Option<String>,
    pub issued_at: DateTime<Utc>,
}

impl SessionInfo {
    /// Identifier the backend sees as the conversation's sender.
    pub fn sender_id(&self) -> &str {
        &self.session_id
    }
}

/// A live session: its metadata plus the relay it owns.
#[derive(Clone)]
pub struct SessionHandle {
    pub info: SessionInfo,
    pub relay: Arc<Mutex<SelectionRelay<Outbox>>>,
}

#[async_trait]
pub trait SessionManager: Send + Sync {
    async fn issue(&self, user_id: Option<String>) -> Result<SessionHandle, SessionError>;
    async fn validate(&self, token: Option<String>) -> Result<Option<SessionHandle>, SessionError>;
    async fn end(&self, token: &str) -> bool;
}

/// Process-local session store. Sessions vanish on restart.
pub struct InMemorySessionManager {
    ttl: Duration,
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl InMemorySessionManager {
    /// `ttl` of zero keeps sessions until they are ended explicitly.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    fn is_expired(&self, info: &SessionInfo, now: DateTime<Utc>) -> bool {
        if self.ttl.is_zero() {
            return false;
        }
        let age = now.signed_duration_since(info.issued_at);
        age.to_std().map(|age| age >= self.ttl).unwrap_or(false)
    }

    #[cfg(test)]
    async fn backdate(&self, token: &str, by: chrono::Duration) {
        if let Some(handle) = self.sessions.write().await.get_mut(token) {
            handle.info.issued_at -= by;
        }
    }
}

#[async_trait]
impl SessionManager for InMemorySessionManager {
    async fn issue(&self, user_id: Option<String>) -> Result<SessionHandle, SessionError> {
        let info = SessionInfo {
            session_id: uuid::Uuid::new_v4().to_string(),
            user_id,
            issued_at: Utc::now(),
        };
        let handle = SessionHandle {
            info: info.clone(),
            relay: Arc::new(Mutex::new(SelectionRelay::new(Outbox::default()))),
        };
        let mut sessions = self.sessions.write().await;
        let now = Utc::now();
        let before = sessions.len();
        sessions.retain(|_, existing| !self.is_expired(&existing.info, now));
        if sessions.len() < before {
            debug!(dropped = before - sessions.len(), "swept expired sessions");
        }
        sessions.insert(info.session_id.clone(), handle.clone());
        drop(sessions);
        info!(session_id = %info.session_id, user = ?info.user_id, "issued session");
        Ok(handle)
    }

    async fn validate(&self, token: Option<String>) -> Result<Option<SessionHandle>, SessionError> {
        let Some(token) = token else {
            return Ok(None);
        };
        let handle = self.sessions.read().await.get(&token).cloned();
        let Some(handle) = handle else {
            return Err(SessionError::Invalid);
        };
        if self.is_expired(&handle.info, Utc::now()) {
            self.sessions.write().await.remove(&token);
            debug!(session_id = %token, "session expired");
            return Err(SessionError::Expired);
        }
        Ok(Some(handle))
    }

    async fn end(&self, token: &str) -> bool {
        let removed = self.sessions.write().await.remove(token).is_some();
        if removed {
            info!(session_id = %token, "ended session");
        }
        removed
    }
}

/// Cookie value that stores the session id in the browser.
pub fn session_cookie(session_id: &str, ttl: Duration) -> String {
    let mut cookie = format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax");
    if !ttl.is_zero() {
        cookie.push_str(&format!("; Max-Age={}", ttl.as_secs()));
    }
    cookie
}

pub fn expired_session_cookie() -> String {
    format!(
        "{SESSION_COOKIE}=; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Lax"
    )
}

/// Extract the session id from a `Cookie` header value.
pub fn session_from_cookie_header(cookies: &str) -> Option<String> {
    cookies
        .split(';')
        .map(|c| c.trim())
        .find_map(|c| c.strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
