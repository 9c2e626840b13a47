// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! equipdash: client for the equipment-usage analytics service
//!
//! This crate talks to the analytics backend on behalf of a user: it logs
//! in, keeps the session across restarts, uploads CSV files of equipment
//! data and reads back the server-computed summaries and upload history.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use client::ApiClient;
pub use error::{ApiError, Result};
