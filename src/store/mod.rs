// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential storage.
//!
//! The store is the single source of truth for the current session. It is
//! handed to the API client at construction so tests can inject their own.

pub mod file;
pub mod memory;

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;

use crate::models::{Session, User};

/// Holds the current session. Reads are synchronous and never fail.
pub trait CredentialStore: Send + Sync {
    /// Snapshot of the whole session, if logged in.
    fn session(&self) -> Option<Session>;

    /// Replace the session (login, signup).
    fn set_session(&self, session: Session) -> Result<(), StoreError>;

    /// Overwrite only the access token after a refresh.
    ///
    /// No-op when there is no session to update.
    fn set_access_token(&self, token: &str) -> Result<(), StoreError>;

    /// Forget everything (logout, unrecoverable auth failure).
    fn clear_session(&self) -> Result<(), StoreError>;

    fn access_token(&self) -> Option<String> {
        self.session().map(|s| s.access_token)
    }

    fn refresh_token(&self) -> Option<String> {
        self.session()
            .map(|s| s.refresh_token)
            .filter(|t| !t.is_empty())
    }

    fn user(&self) -> Option<User> {
        self.session().map(|s| s.user)
    }
}

/// Credential store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
