//! In-process credential store (tests, embedders without persistence).

use crate::models::Session;
use crate::store::{CredentialStore, StoreError};
use std::sync::{PoisonError, RwLock};

/// Session held in memory only; gone when the process exits.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    session: RwLock<Option<Session>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a session.
    pub fn with_session(session: Session) -> Self {
        Self {
            session: RwLock::new(Some(session)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_session(&self, session: Session) -> Result<(), StoreError> {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
        Ok(())
    }

    fn set_access_token(&self, token: &str) -> Result<(), StoreError> {
        let mut guard = self.session.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = guard.as_mut() {
            session.access_token = token.to_string();
        }
        Ok(())
    }

    fn clear_session(&self) -> Result<(), StoreError> {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
