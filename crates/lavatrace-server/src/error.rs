// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{debug, error};

use lavatrace_resolve::{ResolveError, StoreError};

use crate::sentry::DsnError;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error("Invalid authorization token")]
	Unauthorized,

	#[error("{0}")]
	BadRequest(String),

	#[error(transparent)]
	Resolve(#[from] ResolveError),

	#[error(transparent)]
	Store(#[from] StoreError),

	#[error(transparent)]
	Database(#[from] sqlx::Error),

	#[error(transparent)]
	Dsn(#[from] DsnError),
}

impl ServerError {
	pub fn status(&self) -> StatusCode {
		match self {
			ServerError::Unauthorized => StatusCode::FORBIDDEN,
			ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
			ServerError::Resolve(ResolveError::Format(_)) => StatusCode::BAD_REQUEST,
			ServerError::Resolve(_)
			| ServerError::Store(_)
			| ServerError::Database(_)
			| ServerError::Dsn(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let status = self.status();
		if status.is_server_error() {
			error!(error = %self, status = status.as_u16(), "request failed");
		} else {
			debug!(error = %self, status = status.as_u16(), "request rejected");
		}

		(status, self.to_string()).into_response()
	}
}

#[cfg(test)]
mod tests {
	use lavatrace_core::FormatError;
	use lavatrace_resolve::SinkError;

	use super::*;

	#[test]
	fn test_format_errors_are_bad_requests() {
		let err = ServerError::from(ResolveError::Format(FormatError::NoEntries));
		assert_eq!(err.status(), StatusCode::BAD_REQUEST);
	}

	#[test]
	fn test_sink_errors_are_server_errors() {
		let err = ServerError::from(ResolveError::Sink(SinkError::Request("timeout".to_string())));
		assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
	}

	#[test]
	fn test_unauthorized_message() {
		assert_eq!(ServerError::Unauthorized.status(), StatusCode::FORBIDDEN);
		assert_eq!(
			ServerError::Unauthorized.to_string(),
			"Invalid authorization token"
		);
	}
}
