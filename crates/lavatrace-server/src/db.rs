// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite persistence for source maps and resolved reports.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{
	SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqliteRow, SqliteSynchronous,
};
use sqlx::Row;
use tracing::instrument;

use lavatrace_core::{ReportId, StoredEntry, StoredReport};
use lavatrace_resolve::{MapStore, ReportStore, SourceMapSource, StoreError};

/// Create a SqlitePool with WAL mode and common settings.
#[instrument(skip(database_url))]
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
	let options = SqliteConnectOptions::from_str(database_url)?
		.journal_mode(SqliteJournalMode::Wal)
		.synchronous(SqliteSynchronous::Normal)
		.create_if_missing(true);

	let pool = SqlitePool::connect_with(options).await?;

	tracing::debug!("database pool created");
	Ok(pool)
}

/// Create the tables and indexes if they do not exist yet.
#[instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS source_maps (
			id INTEGER PRIMARY KEY AUTOINCREMENT,
			commit_id TEXT NOT NULL,
			filename TEXT NOT NULL,
			body TEXT NOT NULL,
			uploaded_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await?;

	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_source_maps_commit_filename \
		 ON source_maps (commit_id, filename)",
	)
	.execute(pool)
	.await?;

	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS reports (
			id TEXT PRIMARY KEY,
			commit_id TEXT NOT NULL,
			version TEXT NOT NULL,
			assets TEXT NOT NULL,
			entries TEXT NOT NULL,
			received_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await?;

	sqlx::query("CREATE INDEX IF NOT EXISTS idx_reports_version ON reports (version)")
		.execute(pool)
		.await?;

	tracing::debug!("database schema ready");
	Ok(())
}

fn store_error(e: sqlx::Error) -> StoreError {
	match e {
		sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
			StoreError::Unavailable(e.to_string())
		}
		other => StoreError::Query(other.to_string()),
	}
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, StoreError> {
	DateTime::parse_from_rfc3339(value)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| StoreError::Corrupt(format!("invalid timestamp {value:?}: {e}")))
}

/// SQLite implementation of [`MapStore`] and [`ReportStore`].
#[derive(Clone)]
pub struct SqliteStore {
	pool: SqlitePool,
}

impl SqliteStore {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Fetch a stored report by id.
	#[instrument(skip(self), fields(report_id = %id))]
	pub async fn get_report(&self, id: ReportId) -> Result<Option<StoredReport>, StoreError> {
		let row = sqlx::query(
			r#"
			SELECT id, commit_id, version, assets, entries, received_at
			FROM reports
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await
		.map_err(store_error)?;

		row.map(|row| report_from_row(&row)).transpose()
	}
}

fn report_from_row(row: &SqliteRow) -> Result<StoredReport, StoreError> {
	let id: String = row.try_get("id").map_err(store_error)?;
	let assets: String = row.try_get("assets").map_err(store_error)?;
	let entries: String = row.try_get("entries").map_err(store_error)?;
	let received_at: String = row.try_get("received_at").map_err(store_error)?;

	Ok(StoredReport {
		id: id
			.parse()
			.map_err(|e| StoreError::Corrupt(format!("invalid report id {id:?}: {e}")))?,
		commit_id: row.try_get("commit_id").map_err(store_error)?,
		version: row.try_get("version").map_err(store_error)?,
		assets: serde_json::from_str(&assets)
			.map_err(|e| StoreError::Corrupt(format!("invalid assets: {e}")))?,
		entries: serde_json::from_str::<Vec<StoredEntry>>(&entries)
			.map_err(|e| StoreError::Corrupt(format!("invalid entries: {e}")))?,
		received_at: parse_timestamp(&received_at)?,
	})
}

#[async_trait]
impl MapStore for SqliteStore {
	#[instrument(skip(self, body), fields(commit = %commit, filename = %filename, bytes = body.len()))]
	async fn put(&self, commit: &str, filename: &str, body: &str) -> Result<(), StoreError> {
		sqlx::query(
			r#"
			INSERT INTO source_maps (commit_id, filename, body, uploaded_at)
			VALUES (?, ?, ?, ?)
			"#,
		)
		.bind(commit)
		.bind(filename)
		.bind(body)
		.bind(Utc::now().to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(store_error)?;

		Ok(())
	}

	#[instrument(skip(self), fields(commit = %commit, filename = %filename))]
	async fn get_all(
		&self,
		commit: &str,
		filename: &str,
	) -> Result<Vec<SourceMapSource>, StoreError> {
		let rows = sqlx::query(
			r#"
			SELECT commit_id, filename, body, uploaded_at
			FROM source_maps
			WHERE commit_id = ? AND filename = ?
			ORDER BY id DESC
			"#,
		)
		.bind(commit)
		.bind(filename)
		.fetch_all(&self.pool)
		.await
		.map_err(store_error)?;

		rows.iter()
			.map(|row| -> Result<SourceMapSource, StoreError> {
				let uploaded_at: String = row.try_get("uploaded_at").map_err(store_error)?;
				Ok(SourceMapSource {
					commit: row.try_get("commit_id").map_err(store_error)?,
					filename: row.try_get("filename").map_err(store_error)?,
					body: row.try_get("body").map_err(store_error)?,
					uploaded_at: parse_timestamp(&uploaded_at)?,
				})
			})
			.collect()
	}
}

#[async_trait]
impl ReportStore for SqliteStore {
	#[instrument(skip(self, report), fields(report_id = %report.id, commit = %report.commit_id))]
	async fn insert(&self, report: &StoredReport) -> Result<ReportId, StoreError> {
		let assets = serde_json::to_string(&report.assets)
			.map_err(|e| StoreError::Query(e.to_string()))?;
		let entries = serde_json::to_string(&report.entries)
			.map_err(|e| StoreError::Query(e.to_string()))?;

		sqlx::query(
			r#"
			INSERT INTO reports (id, commit_id, version, assets, entries, received_at)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(report.id.to_string())
		.bind(&report.commit_id)
		.bind(&report.version)
		.bind(assets)
		.bind(entries)
		.bind(report.received_at.to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(store_error)?;

		Ok(report.id)
	}
}
