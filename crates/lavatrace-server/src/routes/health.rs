// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Health and cache statistics.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use lavatrace_resolve::ResolutionCacheStats;

use crate::api::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
	pub status: &'static str,
	pub version: &'static str,
	pub output: String,
	pub cache: ResolutionCacheStats,
	pub store_fetches: u64,
	pub index_builds: u64,
	pub placeholders: u64,
}

/// GET /health - Liveness plus resolver counters.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
	let stats = state.resolver.stats();

	Json(HealthResponse {
		status: "ok",
		version: env!("CARGO_PKG_VERSION"),
		output: state.output_mode.to_string(),
		cache: stats.cache,
		store_fetches: stats.store_fetches,
		index_builds: stats.index_builds,
		placeholders: stats.placeholders,
	})
}
