//! Maps signed-in users to their live socket connection.

use crate::error::{OrmError, OrmResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Identifier of a live socket connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ConnectionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Email → connection map shared by the socket handlers.
///
/// One connection per email: a later login replaces the earlier mapping.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    entries: RwLock<HashMap<String, ConnectionId>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, ConnectionId>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, ConnectionId>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record that `email` is reachable on `conn_id`.
    ///
    /// Returns the connection previously mapped to `email`, if any.
    pub fn login(
        &self,
        email: &str,
        conn_id: impl Into<ConnectionId>,
    ) -> OrmResult<Option<ConnectionId>> {
        let email = email.trim();
        if email.is_empty() {
            return Err(OrmError::validation("login requires an email"));
        }
        let conn_id = conn_id.into();
        tracing::debug!(target: "boardsql.registry", email, conn_id = %conn_id, "login");
        let previous = self.write().insert(email.to_string(), conn_id);
        if let Some(previous) = &previous {
            tracing::debug!(target: "boardsql.registry", email, replaced = %previous, "replaced connection");
        }
        Ok(previous)
    }

    /// Forget `email` if it is still mapped to `conn_id`.
    pub fn logout(&self, email: &str, conn_id: &ConnectionId) -> bool {
        let mut entries = self.write();
        match entries.get(email.trim()) {
            Some(current) if current == conn_id => {
                entries.remove(email.trim());
                tracing::debug!(target: "boardsql.registry", email, conn_id = %conn_id, "logout");
                true
            }
            _ => false,
        }
    }

    /// Drop every email mapped to `conn_id` and return them, sorted.
    pub fn disconnect(&self, conn_id: &ConnectionId) -> Vec<String> {
        let mut entries = self.write();
        let mut removed: Vec<String> = entries
            .iter()
            .filter(|(_, id)| *id == conn_id)
            .map(|(email, _)| email.clone())
            .collect();
        for email in &removed {
            entries.remove(email);
        }
        removed.sort();
        if !removed.is_empty() {
            tracing::debug!(target: "boardsql.registry", conn_id = %conn_id, count = removed.len(), "disconnect");
        }
        removed
    }

    pub fn lookup(&self, email: &str) -> Option<ConnectionId> {
        self.read().get(email.trim()).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
