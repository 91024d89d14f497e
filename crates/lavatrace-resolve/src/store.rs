// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Storage traits for uploaded source maps and persisted reports.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use lavatrace_core::{ReportId, StoredReport};

use crate::error::StoreError;

/// An uploaded source map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMapSource {
	pub commit: String,
	pub filename: String,
	pub body: String,
	pub uploaded_at: DateTime<Utc>,
}

/// Persistence for raw source maps.
///
/// The same (commit, filename) may be uploaded several times; every upload is
/// kept as its own record.
#[async_trait]
pub trait MapStore: Send + Sync {
	async fn put(&self, commit: &str, filename: &str, body: &str) -> Result<(), StoreError>;

	/// All records for a key, most recent upload first.
	async fn get_all(&self, commit: &str, filename: &str)
		-> Result<Vec<SourceMapSource>, StoreError>;
}

/// Persistence for resolved reports.
#[async_trait]
pub trait ReportStore: Send + Sync {
	async fn insert(&self, report: &StoredReport) -> Result<ReportId, StoreError>;
}

/// In-memory map store for tests and embedded use.
#[derive(Debug, Default)]
pub struct InMemoryMapStore {
	maps: RwLock<HashMap<(String, String), Vec<SourceMapSource>>>,
}

impl InMemoryMapStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl MapStore for InMemoryMapStore {
	async fn put(&self, commit: &str, filename: &str, body: &str) -> Result<(), StoreError> {
		let record = SourceMapSource {
			commit: commit.to_string(),
			filename: filename.to_string(),
			body: body.to_string(),
			uploaded_at: Utc::now(),
		};
		self.maps
			.write()
			.await
			.entry((commit.to_string(), filename.to_string()))
			.or_default()
			.insert(0, record);
		Ok(())
	}

	async fn get_all(
		&self,
		commit: &str,
		filename: &str,
	) -> Result<Vec<SourceMapSource>, StoreError> {
		Ok(self
			.maps
			.read()
			.await
			.get(&(commit.to_string(), filename.to_string()))
			.cloned()
			.unwrap_or_default())
	}
}

/// In-memory report store for tests and embedded use.
#[derive(Debug, Default)]
pub struct InMemoryReportStore {
	reports: RwLock<Vec<StoredReport>>,
}

impl InMemoryReportStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn reports(&self) -> Vec<StoredReport> {
		self.reports.read().await.clone()
	}
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
	async fn insert(&self, report: &StoredReport) -> Result<ReportId, StoreError> {
		self.reports.write().await.push(report.clone());
		Ok(report.id)
	}
}
