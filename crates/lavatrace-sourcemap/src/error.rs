// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for source map decoding and lookup.

use thiserror::Error;

/// The source map body could not be decoded.
#[derive(Debug, Error)]
pub enum MapFormatError {
	#[error("Invalid source map JSON: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Invalid source map version: expected 3, got {0}")]
	UnsupportedVersion(u32),

	#[error("Invalid VLQ character: {0:?}")]
	InvalidVlqChar(char),

	#[error("VLQ value is truncated in segment {0:?}")]
	TruncatedVlq(String),

	#[error("VLQ value overflows in segment {0:?}")]
	VlqOverflow(String),

	#[error("Segment {segment:?} has {fields} fields, expected 1, 4 or 5")]
	InvalidSegmentLength { segment: String, fields: usize },

	#[error("Invalid source index: {0}")]
	InvalidSourceIndex(i64),

	#[error("Invalid name index: {0}")]
	InvalidNameIndex(i64),

	#[error("Negative position in segment {0:?}")]
	NegativePosition(String),

	#[error("Position out of range in segment {0:?}")]
	PositionOutOfRange(String),
}

/// A position could not be found in a decoded map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LookupError {
	#[error("No such column: {0}")]
	InvalidColumn(i64),

	#[error("No such line: no mapping reachable for line {line}, column {column}")]
	NoSuchLine { line: i64, column: i64 },
}
