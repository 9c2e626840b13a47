// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session lifecycle: login, signup, logout.
//!
//! The API client never writes a new session itself; this service owns
//! that policy. Forms are validated locally first so obviously bad input
//! never reaches the backend.

use crate::client::ApiClient;
use crate::error::{ApiError, Result};
use crate::models::{LoginRequest, Session, SignupRequest, User};
use validator::{Validate, ValidationErrors};

/// High-level auth operations backed by the client's credential store.
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Log in and replace any existing session with the new one.
    pub async fn login(&self, credentials: LoginRequest) -> Result<Session> {
        credentials.validate().map_err(invalid_input)?;

        let session = self.client.login(&credentials).await?;
        self.client.store().set_session(session.clone())?;

        tracing::info!(username = %session.user.username, "Logged in");
        Ok(session)
    }

    /// Register, then keep the returned session.
    pub async fn signup(&self, form: SignupRequest) -> Result<Session> {
        form.validate().map_err(invalid_input)?;

        let session = self.client.signup(&form).await?;
        self.client.store().set_session(session.clone())?;

        tracing::info!(username = %session.user.username, "Account created");
        Ok(session)
    }

    /// Notify the backend (best effort) and drop the local session.
    pub async fn logout(&self) -> Result<()> {
        if self.client.store().session().is_some() {
            self.client.notify_logout().await;
        }
        self.client.store().clear_session()?;
        tracing::info!("Logged out");
        Ok(())
    }

    pub fn current_user(&self) -> Option<User> {
        self.client.store().user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.store().access_token().is_some()
    }
}

/// Collapse validator output into one message, first field alphabetically.
fn invalid_input(errors: ValidationErrors) -> ApiError {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    let message = fields
        .into_iter()
        .flat_map(|(field, errs)| errs.iter().map(move |e| (field, e)))
        .map(|(field, e)| match &e.message {
            Some(msg) => msg.to_string(),
            None => format!("{} is invalid", field),
        })
        .next()
        .unwrap_or_else(|| "Invalid input".to_string());

    ApiError::InvalidInput(message)
}
