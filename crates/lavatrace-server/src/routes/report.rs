// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::body::Bytes;
use axum::extract::State;
use tracing::instrument;

use lavatrace_core::Report;

use crate::api::AppState;
use crate::error::ServerError;

/// POST /report - Resolve a client report and deliver it.
///
/// Responds with the receipt: the stored report id or the forwarded event id.
#[instrument(skip(state, body), fields(bytes = body.len()))]
pub async fn submit_report(
	State(state): State<AppState>,
	body: Bytes,
) -> Result<String, ServerError> {
	let report: Report = serde_json::from_slice(&body)
		.map_err(|e| ServerError::BadRequest(format!("invalid report: {e}")))?;

	let receipt = state.processor.process(report).await?;
	Ok(receipt.to_string())
}
