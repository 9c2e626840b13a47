// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Outbound request descriptions.
//!
//! A description is plain data so the client can dispatch it a second time
//! after a token refresh. Bodies are kept as owned bytes for that reason;
//! the multipart form is rebuilt on each dispatch.

use crate::error::{ApiError, Result};
use reqwest::Method;
use serde::Serialize;

/// Request body.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Pre-serialised JSON
    Json(Vec<u8>),
    /// Single file part of a multipart form
    File(FilePart),
}

/// A file to send as one part of a multipart form.
#[derive(Debug, Clone)]
pub struct FilePart {
    /// Form field name
    pub field: String,
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Description of one backend call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
    retried: bool,
    token_refresh: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            retried: false,
            token_refresh: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// The token refresh call. It carries no bearer header and is never
    /// itself retried through a refresh.
    pub(crate) fn token_refresh(path: impl Into<String>, refresh_token: &str) -> Result<Self> {
        let mut request = Self::post(path).json(&crate::models::TokenRefreshRequest {
            refresh: refresh_token,
        })?;
        request.token_refresh = true;
        Ok(request)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Set a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| ApiError::InvalidInput(format!("Failed to encode request body: {}", e)))?;
        self.body = RequestBody::Json(bytes);
        Ok(self)
    }

    /// Set a multipart body holding a single file.
    pub fn file(mut self, field: &str, filename: &str, bytes: Vec<u8>) -> Self {
        self.body = RequestBody::File(FilePart {
            field: field.to_string(),
            filename: filename.to_string(),
            bytes,
        });
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Whether this request has already been re-sent after a refresh.
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub fn is_token_refresh(&self) -> bool {
        self.token_refresh
    }

    /// A 401 on this request may trigger one refresh-and-retry.
    pub fn may_refresh(&self) -> bool {
        !self.retried && !self.token_refresh
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }
}
