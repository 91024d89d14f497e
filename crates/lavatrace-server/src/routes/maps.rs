// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map upload.

use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use tracing::{info, instrument};

use crate::api::AppState;
use crate::error::ServerError;

/// Check `Authorization: Bearer <token>` against the configured admin token.
pub fn authorize(headers: &HeaderMap, state: &AppState) -> Result<(), ServerError> {
	let presented = headers
		.get(header::AUTHORIZATION)
		.and_then(|v| v.to_str().ok())
		.and_then(|v| v.strip_prefix("Bearer "))
		.ok_or(ServerError::Unauthorized)?;

	if presented != state.admin_token.expose().as_str() {
		return Err(ServerError::Unauthorized);
	}
	Ok(())
}

/// POST /maps/{commit} - Store a batch of `filename -> source map` pairs.
///
/// Pairs are stored one at a time; a failure part way leaves earlier pairs in
/// place.
#[instrument(skip(state, headers, body), fields(commit = %commit, bytes = body.len()))]
pub async fn upload_maps(
	State(state): State<AppState>,
	Path(commit): Path<String>,
	headers: HeaderMap,
	body: Bytes,
) -> Result<&'static str, ServerError> {
	authorize(&headers, &state)?;

	let maps: BTreeMap<String, String> = serde_json::from_slice(&body)
		.map_err(|e| ServerError::BadRequest(format!("invalid source map upload: {e}")))?;

	for (filename, map) in &maps {
		state.maps.put(&commit, filename, map).await?;
	}

	info!(count = maps.len(), "source maps stored");
	Ok("Success")
}
