// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for frame resolution and report delivery.

use std::sync::Arc;

use lavatrace_core::FormatError;
use lavatrace_sourcemap::{LookupError, MapFormatError};
use thiserror::Error;

/// Errors raised by the backing stores.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
	#[error("store unavailable: {0}")]
	Unavailable(String),

	#[error("store query failed: {0}")]
	Query(String),

	#[error("stored record is corrupt: {0}")]
	Corrupt(String),
}

/// Errors raised by an event sink.
#[derive(Debug, Clone, Error)]
pub enum SinkError {
	#[error("event sink request failed: {0}")]
	Request(String),

	#[error("event sink rejected event ({status}): {message}")]
	Rejected { status: u16, message: String },

	#[error("event sink returned an invalid response: {0}")]
	InvalidResponse(String),
}

/// Errors that abort the resolution of a frame or report.
///
/// Cloneable so a failure of a shared decode can be handed to every task
/// that was waiting on it.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
	#[error(transparent)]
	Format(#[from] FormatError),

	#[error("source map {filename} for commit {commit} is malformed: {source}")]
	MapFormat {
		commit: String,
		filename: String,
		#[source]
		source: Arc<MapFormatError>,
	},

	#[error("lookup in {filename} failed: {source}")]
	Lookup {
		filename: String,
		#[source]
		source: LookupError,
	},

	#[error(transparent)]
	Store(#[from] StoreError),

	#[error(transparent)]
	Sink(#[from] SinkError),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
