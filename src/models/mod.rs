// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod auth;
pub mod upload;
pub mod user;

pub use auth::{
    AuthResponse, LoginRequest, SignupRequest, TokenRefreshRequest, TokenRefreshResponse,
};
pub use upload::{HistoryPage, UploadRecord};
pub use user::{Session, User};
