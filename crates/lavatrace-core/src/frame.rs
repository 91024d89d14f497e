// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Compact stack frame codec.
//!
//! Clients send each stack frame as `token:line:column`, frames joined by `;`.
//! The token is `/` for a frame of unknown origin, `native` for a runtime
//! frame, or an index into the report's asset list.

use std::collections::BTreeMap;

use crate::error::{FormatError, Result};
use crate::event::StructuredFrame;
use crate::position::ResolvedPosition;

const UNKNOWN_TOKEN: &str = "/";
const NATIVE_TOKEN: &str = "native";

/// A parsed frame descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
	Unknown { line: i64, column: i64 },
	Native { line: i64, column: i64 },
	Asset { index: usize, line: i64, column: i64 },
}

impl Frame {
	pub fn line(&self) -> i64 {
		match *self {
			Frame::Unknown { line, .. } | Frame::Native { line, .. } | Frame::Asset { line, .. } => {
				line
			}
		}
	}

	pub fn column(&self) -> i64 {
		match *self {
			Frame::Unknown { column, .. }
			| Frame::Native { column, .. }
			| Frame::Asset { column, .. } => column,
		}
	}
}

/// Parse a single frame descriptor.
///
/// Fields are separated by `:`; `;` is accepted too when a lone descriptor is
/// parsed outside of a stacktrace. Fields past the third are ignored.
pub fn parse_frame(descriptor: &str) -> Result<Frame> {
	let mut fields = descriptor.split([':', ';']);
	let (Some(token), Some(line), Some(column)) = (fields.next(), fields.next(), fields.next())
	else {
		return Err(FormatError::MissingFields(descriptor.to_string()));
	};

	let line = parse_number("line", line)?;
	let column = parse_number("column", column)?;

	match token {
		UNKNOWN_TOKEN => Ok(Frame::Unknown { line, column }),
		NATIVE_TOKEN => Ok(Frame::Native { line, column }),
		_ => {
			let index = token
				.trim()
				.parse::<usize>()
				.map_err(|_| FormatError::InvalidAssetIndex(token.to_string()))?;
			Ok(Frame::Asset {
				index,
				line,
				column,
			})
		}
	}
}

/// Parse a `;`-separated stacktrace into frames, outermost call last.
pub fn parse_stacktrace(stacktrace: &str) -> Result<Vec<Frame>> {
	stacktrace.split(';').map(parse_frame).collect()
}

fn parse_number(field: &'static str, value: &str) -> Result<i64> {
	value
		.trim()
		.parse()
		.map_err(|_| FormatError::InvalidNumber {
			field,
			value: value.to_string(),
		})
}

/// Name of the source map uploaded for an asset: the last path element of the
/// asset plus `.map`.
pub fn map_key_for_asset(asset: &str) -> String {
	format!("{}.map", base_name(asset))
}

fn base_name(path: &str) -> &str {
	if path.is_empty() {
		return ".";
	}
	let trimmed = path.trim_end_matches('/');
	if trimmed.is_empty() {
		return "/";
	}
	trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// A frame together with its resolved original position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFrame {
	pub frame: Frame,
	pub position: ResolvedPosition,
	/// Asset path the frame was reported against, for asset frames.
	pub abs_path: Option<String>,
}

impl ResolvedFrame {
	/// Native and unknown frames are never application code.
	pub fn in_app(&self) -> bool {
		matches!(self.frame, Frame::Asset { .. })
	}

	/// Render as `file:name:line:column`.
	pub fn to_compact(&self) -> String {
		format!(
			"{}:{}:{}:{}",
			self.position.file,
			self.position.display_name(),
			self.position.line,
			self.position.column
		)
	}

	/// Render as a structured event frame.
	pub fn to_structured(&self, vars: BTreeMap<String, serde_json::Value>) -> StructuredFrame {
		let module = self.in_app().then(|| {
			format!(
				"{}.{}",
				self.position.file,
				self.position.display_name()
			)
		});

		StructuredFrame {
			filename: self.position.file.clone(),
			function: self.position.display_name().to_string(),
			module,
			lineno: self.position.line,
			colno: self.position.column,
			in_app: self.in_app(),
			abs_path: self.abs_path.clone(),
			vars,
		}
	}
}
