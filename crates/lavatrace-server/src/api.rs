// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router construction.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use sqlx::SqlitePool;
use tracing::info;

use lavatrace_resolve::{
	CacheConfig, ForwardEvents, MapStore, OutputStrategy, PersistCompact, ReportProcessor,
	Resolver,
};
use lavatrace_server_config::{OutputMode, SecretString, ServerConfig};

use crate::db::SqliteStore;
use crate::error::ServerError;
use crate::routes;
use crate::sentry::SentryEventSink;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
	pub maps: Arc<dyn MapStore>,
	pub resolver: Arc<Resolver<dyn MapStore>>,
	pub processor: ReportProcessor,
	pub admin_token: Arc<SecretString>,
	pub output_mode: OutputMode,
	/// Largest accepted request body, `None` for no limit.
	pub body_limit: Option<usize>,
}

impl AppState {
	pub fn new(
		maps: Arc<dyn MapStore>,
		output: Arc<dyn OutputStrategy>,
		admin_token: SecretString,
		cache: CacheConfig,
		output_mode: OutputMode,
	) -> Self {
		let resolver = Arc::new(Resolver::new(maps.clone(), cache));
		let processor = ReportProcessor::new(resolver.clone(), output);

		Self {
			maps,
			resolver,
			processor,
			admin_token: Arc::new(admin_token),
			output_mode,
			body_limit: None,
		}
	}

	pub fn with_body_limit(mut self, limit: Option<usize>) -> Self {
		self.body_limit = limit;
		self
	}
}

/// Wire the SQLite store and the configured output strategy into an [`AppState`].
pub fn create_app_state(config: &ServerConfig, pool: SqlitePool) -> Result<AppState, ServerError> {
	let store = Arc::new(SqliteStore::new(pool));

	let output: Arc<dyn OutputStrategy> = match config.output.mode {
		OutputMode::Persist => Arc::new(PersistCompact::new(store.clone())),
		OutputMode::Event => {
			let dsn = config
				.output
				.sentry_dsn
				.as_ref()
				.map(|dsn| dsn.expose().as_str())
				.unwrap_or_default();
			Arc::new(ForwardEvents::new(Arc::new(SentryEventSink::from_dsn(dsn)?)))
		}
	};

	let body_limit = config
		.http
		.max_body_bytes
		.map(|limit| usize::try_from(limit).unwrap_or(usize::MAX));

	info!(output = %config.output.mode, ?body_limit, "application state ready");

	Ok(AppState::new(
		store,
		output,
		config.auth.admin_token.clone(),
		config.cache,
		config.output.mode,
	)
	.with_body_limit(body_limit))
}

pub fn create_router(state: AppState) -> Router {
	let body_limit = match state.body_limit {
		Some(limit) => DefaultBodyLimit::max(limit),
		None => DefaultBodyLimit::disable(),
	};

	Router::new()
		.route("/", get(routes::index::index))
		.route("/maps/{commit}", post(routes::maps::upload_maps))
		.route("/report", post(routes::report::submit_report))
		.route("/health", get(routes::health::health_check))
		.layer(body_limit)
		.with_state(state)
}
