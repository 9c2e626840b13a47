// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request and response bodies for the token endpoints.

use crate::models::{Session, User};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Username/password exchange for a token pair.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Signup form as entered by the user.
///
/// `confirm_password` is checked locally and never sent.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(skip_serializing, default)]
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Email address is not valid"))]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Token pair plus identity, returned by login and signup.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access: String,
    pub refresh: String,
    pub user: User,
}

impl From<AuthResponse> for Session {
    fn from(response: AuthResponse) -> Self {
        Session {
            user: response.user,
            access_token: response.access,
            refresh_token: response.refresh,
        }
    }
}

/// Body of the token refresh call.
#[derive(Debug, Serialize)]
pub struct TokenRefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Token refresh response. Only the access token is rotated.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access: String,
}
