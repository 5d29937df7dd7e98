//! In-memory session table.
//!
//! Sessions are keyed by an opaque token. A secondary index keeps at most one
//! live token per `(role, user_id)`, so logging in again evicts the previous
//! token. Nothing is persisted; a restart drops every session.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::auth::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("No session cookie")]
    MissingToken,

    #[error("Unknown or revoked session")]
    UnknownSession,

    #[error("Session belongs to a {0}")]
    WrongRole(Role),
}

#[derive(Debug, Default)]
struct SessionTable {
    by_token: HashMap<String, Session>,
    by_principal: HashMap<(Role, i64), String>,
}

impl SessionTable {
    fn remove_token(&mut self, token: &str) -> Option<Session> {
        let session = self.by_token.remove(token)?;
        let key = (session.role, session.user_id);
        if self.by_principal.get(&key).map(String::as_str) == Some(token) {
            self.by_principal.remove(&key);
        }
        Some(session)
    }
}

/// Shared handle to the session table; clones point at the same sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<SessionTable>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh token for the principal, replacing any token it held.
    pub async fn create_session(&self, user_id: i64, role: Role) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let mut table = self.inner.write().await;

        if let Some(previous) = table.by_principal.insert((role, user_id), token.clone()) {
            table.by_token.remove(&previous);
            debug!("Replaced existing {} session for user {}", role, user_id);
        }
        table.by_token.insert(token.clone(), Session { user_id, role });

        token
    }

    /// The user id behind `token`, only if it was issued for `expected_role`.
    pub async fn resolve(&self, token: &str, expected_role: Role) -> Option<i64> {
        let table = self.inner.read().await;
        table
            .by_token
            .get(token)
            .filter(|session| session.role == expected_role)
            .map(|session| session.user_id)
    }

    /// Like `resolve`, but says why a request carries no usable session.
    pub async fn authenticate(
        &self,
        token: Option<&str>,
        expected_role: Role,
    ) -> Result<i64, SessionError> {
        let token = token.filter(|t| !t.is_empty()).ok_or(SessionError::MissingToken)?;
        let session = self.get(token).await.ok_or(SessionError::UnknownSession)?;
        if session.role != expected_role {
            return Err(SessionError::WrongRole(session.role));
        }
        Ok(session.user_id)
    }

    pub async fn get(&self, token: &str) -> Option<Session> {
        self.inner.read().await.by_token.get(token).copied()
    }

    pub async fn revoke(&self, token: &str) -> Option<Session> {
        self.inner.write().await.remove_token(token)
    }

    pub async fn revoke_user(&self, role: Role, user_id: i64) -> bool {
        let mut table = self.inner.write().await;
        match table.by_principal.remove(&(role, user_id)) {
            Some(token) => {
                table.by_token.remove(&token);
                true
            }
            None => false,
        }
    }

    pub async fn clear_all(&self) {
        let mut table = self.inner.write().await;
        table.by_token.clear();
        table.by_principal.clear();
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.by_token.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
