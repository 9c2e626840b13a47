// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - session and upload workflows on top of the client.

pub mod auth;
pub mod upload;

pub use auth::AuthService;
pub use upload::{validate_csv, UploadHistory, UploadService, MAX_UPLOAD_BYTES};
