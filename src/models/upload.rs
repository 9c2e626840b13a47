// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Upload records as computed by the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Server-side summary of one uploaded CSV file.
///
/// Averages and the equipment distribution are computed by the backend;
/// the client only displays them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UploadRecord {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    #[serde(rename = "name")]
    pub filename: String,
    /// Username of the uploader
    pub uploaded_by: String,
    #[serde(rename = "total_rows")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub row_count: u64,
    pub avg_power: f64,
    pub avg_usage_hours: f64,
    /// Equipment type -> number of rows of that type
    #[cfg_attr(feature = "binding-generation", ts(type = "Record<string, number>"))]
    pub equipment_distribution: BTreeMap<String, u64>,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub uploaded_at: DateTime<Utc>,
}

impl UploadRecord {
    /// Equipment types ordered by count, largest first (ties by name).
    pub fn equipment_by_count(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self
            .equipment_distribution
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

/// One page of upload history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HistoryPage {
    /// Total uploads on the server, across all pages
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub count: u64,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
    pub results: Vec<UploadRecord>,
}
