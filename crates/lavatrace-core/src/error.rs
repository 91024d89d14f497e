// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the frame codec and report validation.

use thiserror::Error;

/// A frame descriptor or report is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
	#[error("invalid stacktrace: frame {0:?} needs token, line and column")]
	MissingFields(String),

	#[error("invalid stacktrace: {field} {value:?} is not an integer")]
	InvalidNumber { field: &'static str, value: String },

	#[error("invalid asset index {0:?}")]
	InvalidAssetIndex(String),

	#[error("invalid asset ID: index {index} but report has {assets} assets")]
	AssetOutOfRange { index: usize, assets: usize },

	#[error("report has no entries")]
	NoEntries,

	#[error("entry {0} has an empty stacktrace")]
	EmptyStacktrace(usize),
}

pub type Result<T> = std::result::Result<T, FormatError>;
