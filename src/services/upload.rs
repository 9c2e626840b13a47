// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CSV upload workflow and the in-memory upload history.

use crate::client::ApiClient;
use crate::error::{ApiError, Result};
use crate::models::{HistoryPage, UploadRecord};
use std::path::Path;

/// Largest file the front end will send (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Uploads seen this session, most recent first.
#[derive(Debug, Clone, Default)]
pub struct UploadHistory {
    records: Vec<UploadRecord>,
    total_count: u64,
}

impl UploadHistory {
    /// Put a fresh upload at the front.
    pub fn record_upload(&mut self, record: UploadRecord) {
        self.records.insert(0, record);
        self.total_count += 1;
    }

    /// Replace the list with a page fetched from the backend.
    pub fn replace_with_page(&mut self, page: HistoryPage) {
        self.total_count = page.count.max(page.results.len() as u64);
        self.records = page.results;
    }

    pub fn records(&self) -> &[UploadRecord] {
        &self.records
    }

    /// The upload whose summary the dashboard shows.
    pub fn latest(&self) -> Option<&UploadRecord> {
        self.records.first()
    }

    /// Total uploads on the server, as last reported.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Check a file is something we are willing to send.
pub fn validate_csv(filename: &str, size: u64) -> Result<()> {
    let is_csv = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if !is_csv {
        return Err(ApiError::InvalidInput("Please select a CSV file".to_string()));
    }

    if size == 0 {
        return Err(ApiError::InvalidInput("File is empty".to_string()));
    }

    if size > MAX_UPLOAD_BYTES {
        return Err(ApiError::InvalidInput(
            "File size must be less than 10MB".to_string(),
        ));
    }

    Ok(())
}

/// Upload workflow: validate, send, remember.
pub struct UploadService {
    client: ApiClient,
    history: UploadHistory,
}

impl UploadService {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            history: UploadHistory::default(),
        }
    }

    pub fn history(&self) -> &UploadHistory {
        &self.history
    }

    /// Validate and upload in-memory file contents.
    pub async fn upload_bytes(&mut self, filename: &str, bytes: Vec<u8>) -> Result<UploadRecord> {
        validate_csv(filename, bytes.len() as u64)?;

        let record = self.client.upload_file(bytes, filename).await?;
        tracing::info!(
            id = record.id,
            filename = %record.filename,
            rows = record.row_count,
            "Upload processed"
        );

        self.history.record_upload(record.clone());
        Ok(record)
    }

    /// Read a file from disk and upload it.
    pub async fn upload_path(&mut self, path: &Path) -> Result<UploadRecord> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ApiError::InvalidInput(format!("Not a file: {}", path.display())))?
            .to_string();

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| ApiError::InvalidInput(format!("{}: {}", path.display(), e)))?;

        // Check before reading so an oversized file is never loaded
        validate_csv(&filename, metadata.len())?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::InvalidInput(format!("{}: {}", path.display(), e)))?;

        self.upload_bytes(&filename, bytes).await
    }

    /// Fetch a page from the backend and make it the current history.
    pub async fn refresh_history(&mut self, limit: u32, offset: u32) -> Result<&UploadHistory> {
        let page = self.client.fetch_history(limit, offset).await?;
        tracing::debug!(count = page.count, returned = page.results.len(), "History fetched");
        self.history.replace_with_page(page);
        Ok(&self.history)
    }
}
