// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON-file credential store so a login survives restarts.
//!
//! The file is rewritten on every mutation. Writes go to a sibling temp
//! file which is then renamed over the old one, so a reader in another
//! process sees either the old session or the new one.

use crate::models::Session;
use crate::store::{CredentialStore, StoreError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// Credential store backed by a JSON file.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    session: RwLock<Option<Session>>,
}

impl FileCredentialStore {
    /// Open the store, loading any session left by a previous run.
    ///
    /// A missing file means "logged out". A file that cannot be parsed is
    /// logged and ignored; the next login overwrites it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let session = load(&path);

        if session.is_some() {
            tracing::debug!(path = %path.display(), "Restored saved session");
        }

        Self {
            path,
            session: RwLock::new(session),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, session: &Session) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(session)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn load(path: &Path) -> Option<Session> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "Failed to read saved session");
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "Ignoring unreadable saved session");
            None
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_session(&self, session: Session) -> Result<(), StoreError> {
        let mut guard = self.session.write().unwrap_or_else(PoisonError::into_inner);
        self.persist(&session)?;
        *guard = Some(session);
        Ok(())
    }

    fn set_access_token(&self, token: &str) -> Result<(), StoreError> {
        let mut guard = self.session.write().unwrap_or_else(PoisonError::into_inner);
        let Some(current) = guard.as_ref() else {
            return Ok(());
        };

        let mut updated = current.clone();
        updated.access_token = token.to_string();
        self.persist(&updated)?;
        *guard = Some(updated);
        Ok(())
    }

    fn clear_session(&self) -> Result<(), StoreError> {
        let mut guard = self.session.write().unwrap_or_else(PoisonError::into_inner);

        // The in-memory session is dropped only once the file is gone
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        *guard = None;
        Ok(())
    }
}
