// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Analytics API client.
//!
//! Handles:
//! - Bearer token attachment from the credential store
//! - One-shot token refresh and retry on 401
//! - Mapping of failure responses to typed errors
//! - Login, signup, upload and history calls

pub mod request;

pub use request::{ApiRequest, FilePart, RequestBody};

use crate::config::{Config, Endpoints};
use crate::error::{ApiError, Result};
use crate::models::{
    AuthResponse, HistoryPage, LoginRequest, Session, SignupRequest, TokenRefreshResponse,
    UploadRecord, User,
};
use crate::store::CredentialStore;
use reqwest::multipart::{Form, Part};
use reqwest::{header, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Authenticated client for the analytics backend.
///
/// Cheap to clone; clones share the HTTP connection pool and the store.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    endpoints: Endpoints,
    store: Arc<dyn CredentialStore>,
}

impl ApiClient {
    /// Create a client that reads and refreshes credentials in `store`.
    pub fn new(config: &Config, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder.build().map_err(ApiError::client_setup)?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            endpoints: config.endpoints.clone(),
            store,
        })
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    // ─── Request Pipeline ────────────────────────────────────────────────────

    /// Send a request, recovering once from an expired access token.
    ///
    /// Returns the response only if its status is a success; every other
    /// outcome is an `ApiError`.
    pub async fn request(&self, request: ApiRequest) -> Result<reqwest::Response> {
        let response = self.send_with_refresh(request).await?;
        check_response(response).await
    }

    /// Send `request`; on 401 refresh the access token and resend once.
    ///
    /// 1. Dispatch with the current bearer token
    /// 2. If 401 and the request may refresh, mark it retried
    /// 3. No refresh token: clear the session, return the original 401
    /// 4. Refresh fails: clear the session, return the original 401
    /// 5. Refresh succeeds: store the new access token, resend with it,
    ///    return that
    async fn send_with_refresh(&self, mut request: ApiRequest) -> Result<reqwest::Response> {
        let response = self.send(&request).await?;

        if response.status() != StatusCode::UNAUTHORIZED || !request.may_refresh() {
            return Ok(response);
        }

        request.mark_retried();

        let Some(refresh_token) = self.store.refresh_token() else {
            tracing::info!(
                path = request.path(),
                "Unauthorized with no refresh token, clearing session"
            );
            self.clear_session_quietly();
            return Ok(response);
        };

        tracing::info!(path = request.path(), "Access token rejected, refreshing");

        let access_token = match self.refresh_access_token(&refresh_token).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed, clearing session");
                self.clear_session_quietly();
                return Ok(response);
            }
        };

        self.store.set_access_token(&access_token)?;
        tracing::debug!(path = request.path(), "Token refreshed, retrying request");

        self.dispatch(&request, Some(&access_token)).await
    }

    /// Drop the stored session after an unrecoverable 401.
    ///
    /// The caller still gets the 401, so a store failure here is only logged.
    fn clear_session_quietly(&self) {
        if let Err(e) = self.store.clear_session() {
            tracing::warn!(error = %e, "Failed to clear session");
        }
    }

    /// Exchange the refresh token for a new access token.
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<String> {
        let request = ApiRequest::token_refresh(&self.endpoints.token_refresh, refresh_token)?;
        let response = check_response(self.send(&request).await?).await?;
        let body: TokenRefreshResponse = parse_json(response).await?;
        Ok(body.access)
    }

    /// Single dispatch with the stored access token.
    async fn send(&self, request: &ApiRequest) -> Result<reqwest::Response> {
        let token = self.store.access_token();
        self.dispatch(request, token.as_deref()).await
    }

    /// Single dispatch. `bearer` is ignored for the refresh call.
    async fn dispatch(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<reqwest::Response> {
        let url = format!(
            "{}/{}",
            self.base_url,
            request.path().trim_start_matches('/')
        );

        let mut builder = self.http.request(request.method().clone(), &url);

        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }

        if !request.is_token_refresh() {
            if let Some(token) = bearer {
                builder = builder.bearer_auth(token);
            }
        }

        builder = match request.body() {
            RequestBody::Empty => builder,
            RequestBody::Json(bytes) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(bytes.clone()),
            RequestBody::File(part) => builder.multipart(build_form(part)?),
        };

        tracing::debug!(
            method = %request.method(),
            path = request.path(),
            retried = request.is_retried(),
            "Sending request"
        );

        builder
            .send()
            .await
            .map_err(|e| {
                ApiError::Network(format!("{} {} failed: {}", request.method(), url, e))
            })
    }

    // ─── API Calls ───────────────────────────────────────────────────────────

    /// Exchange username/password for a session.
    ///
    /// The caller decides whether to store it.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<Session> {
        let request = ApiRequest::post(&self.endpoints.login).json(credentials)?;
        let body: AuthResponse = parse_json(self.request(request).await?).await?;
        Ok(body.into())
    }

    /// Register a new account and receive its session.
    pub async fn signup(&self, details: &SignupRequest) -> Result<Session> {
        let request = ApiRequest::post(&self.endpoints.signup).json(details)?;
        let body: AuthResponse = parse_json(self.request(request).await?).await?;
        Ok(body.into())
    }

    /// Upload a CSV file. No content checks are made here.
    pub async fn upload_file(&self, bytes: Vec<u8>, filename: &str) -> Result<UploadRecord> {
        let request = ApiRequest::post(&self.endpoints.upload).file("file", filename, bytes);
        parse_json(self.request(request).await?).await
    }

    /// Fetch one page of upload history, most recent first.
    pub async fn fetch_history(&self, limit: u32, offset: u32) -> Result<HistoryPage> {
        let request = ApiRequest::get(&self.endpoints.history)
            .query("limit", limit)
            .query("offset", offset);
        parse_json(self.request(request).await?).await
    }

    /// Profile of the logged-in user.
    pub async fn get_profile(&self) -> Result<User> {
        let request = ApiRequest::get(&self.endpoints.profile);
        parse_json(self.request(request).await?).await
    }

    /// Tell the backend we are logging out. Failures are ignored: the local
    /// session is cleared by the caller either way.
    pub async fn notify_logout(&self) {
        let request = ApiRequest::post(&self.endpoints.logout);

        if let Err(e) = self.request(request).await {
            tracing::debug!(error = %e, "Logout notification failed (ignored)");
        }
    }
}

/// Build the multipart form for a file part.
fn build_form(part: &FilePart) -> Result<Form> {
    let mime = mime_guess::from_path(&part.filename).first_or_octet_stream();

    let file = Part::bytes(part.bytes.clone())
        .file_name(part.filename.clone())
        .mime_str(mime.as_ref())
        .map_err(|e| ApiError::InvalidInput(format!("Invalid MIME type: {}", e)))?;

    Ok(Form::new().part(part.field.clone(), file))
}

/// Check response status and return a typed error if not successful.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if status.is_server_error() {
        tracing::warn!(status = %status, "Backend returned server error");
    }

    Err(ApiError::from_status(status.as_u16(), &body))
}

/// Parse a successful response body as JSON.
async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status().as_u16();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::Network(format!("Failed to read response body: {}", e)))?;

    serde_json::from_slice(&bytes).map_err(|e| ApiError::Server {
        status: Some(status),
        message: format!("Unexpected response shape: {}", e),
    })
}
