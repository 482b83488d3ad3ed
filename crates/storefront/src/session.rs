//! Login session context and persistence.
//!
//! The session is three opaque strings handed out by the backend at login:
//! the bearer token, the username and the wallet balance. Views receive a
//! [`Session`] explicitly; [`SessionStore`] keeps it on disk between runs.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reading or writing the session file.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Filesystem error.
    #[error("session file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File contents were not a valid session.
    #[error("session file is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

/// The current user's session.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone, Default)]
pub struct Session {
    token: Option<SecretString>,
    username: Option<String>,
    balance: Option<String>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("username", &self.username)
            .field("balance", &self.balance)
            .finish()
    }
}

impl Session {
    /// A session with no logged-in user.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A logged-in session.
    #[must_use]
    pub fn authenticated(
        token: impl Into<String>,
        username: impl Into<String>,
        balance: impl Into<String>,
    ) -> Self {
        Self {
            token: Some(SecretString::from(token.into())),
            username: Some(username.into()),
            balance: Some(balance.into()),
        }
    }

    /// Bearer token, if logged in.
    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// Username, if logged in.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Wallet balance as reported at login.
    #[must_use]
    pub fn balance(&self) -> Option<&str> {
        self.balance.as_deref()
    }

    /// Whether a token is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// On-disk representation.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    balance: Option<String>,
}

impl From<StoredSession> for Session {
    fn from(stored: StoredSession) -> Self {
        Self {
            token: stored.token.map(SecretString::from),
            username: stored.username,
            balance: stored.balance,
        }
    }
}

impl From<&Session> for StoredSession {
    fn from(session: &Session) -> Self {
        Self {
            token: session
                .token
                .as_ref()
                .map(|token| token.expose_secret().to_owned()),
            username: session.username.clone(),
            balance: session.balance.clone(),
        }
    }
}

/// Persists the session as a small JSON file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a store backed by the given file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted session.
    ///
    /// A missing file is an anonymous session, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but can't be read or parsed.
    pub fn load(&self) -> Result<Session, SessionError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Session::anonymous()),
            Err(e) => return Err(e.into()),
        };
        let stored: StoredSession = serde_json::from_str(&contents)?;
        Ok(stored.into())
    }

    /// Persist a session, replacing whatever was stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be written.
    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        let contents = serde_json::to_string_pretty(&StoredSession::from(session))?;
        std::fs::write(&self.path, contents)?;
        tracing::debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    /// Remove every persisted value.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but can't be removed.
    pub fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_store() -> SessionStore {
        let path = std::env::temp_dir().join(format!("qkart-session-{}.json", uuid::Uuid::new_v4()));
        SessionStore::new(path)
    }

    #[test]
    fn test_missing_file_is_anonymous() {
        let store = temp_store();
        let session = store.load().unwrap();
        assert!(!session.is_authenticated());
        assert!(session.username().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let store = temp_store();
        let session = Session::authenticated("testtoken", "criodo", "5000");
        store.save(&session).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(
            loaded.token().map(|t| t.expose_secret().to_owned()),
            Some("testtoken".to_string())
        );
        assert_eq!(loaded.username(), Some("criodo"));
        assert_eq!(loaded.balance(), Some("5000"));

        store.clear().unwrap();
    }

    #[test]
    fn test_clear_removes_everything() {
        let store = temp_store();
        store
            .save(&Session::authenticated("testtoken", "criodo", "5000"))
            .unwrap();
        store.clear().unwrap();

        assert!(!store.path().exists());
        assert!(!store.load().unwrap().is_authenticated());
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let store = temp_store();
        std::fs::write(store.path(), "not json").unwrap();
        assert!(matches!(store.load(), Err(SessionError::Json(_))));
        store.clear().unwrap();
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::authenticated("super_secret_token", "criodo", "5000");
        let debug = format!("{session:?}");
        assert!(debug.contains("criodo"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super_secret_token"));
    }
}
