// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map v3 decoding.
//!
//! Turns the raw JSON body of an uploaded source map into the flat, ordered
//! list of mappings the index is built from. Positions are reported the way
//! browsers print them: generated and original lines are 1-indexed, columns
//! are 0-indexed.

use std::sync::Arc;

use serde::Deserialize;
use tracing::instrument;

use crate::error::MapFormatError;
use crate::vlq::{decode_vlq_segment, split_segments};

/// Raw source map JSON structure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSourceMap {
	version: u32,
	#[serde(default)]
	source_root: Option<String>,
	#[serde(default)]
	sources: Vec<Option<String>>,
	#[serde(default)]
	names: Vec<String>,
	mappings: String,
}

/// One generated position and the original position it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMapping {
	/// Line in the generated file (1-indexed).
	pub generated_line: u32,
	/// Column in the generated file (0-indexed).
	pub generated_column: u32,
	/// Original source path, with `sourceRoot` applied.
	pub original_file: Arc<str>,
	/// Line in the original file (1-indexed).
	pub original_line: u32,
	/// Column in the original file (0-indexed).
	pub original_column: u32,
	/// Original identifier, if the segment carries one.
	pub original_name: Option<Arc<str>>,
}

/// Decode a source map body into its mappings, in `mappings` order.
///
/// Segments that only carry a generated column have no original position and
/// produce no entry.
#[instrument(skip(body), fields(body_len = body.len()))]
pub fn decode_source_map(body: &str) -> Result<Vec<DecodedMapping>, MapFormatError> {
	let raw: RawSourceMap = serde_json::from_str(body)?;

	if raw.version != 3 {
		return Err(MapFormatError::UnsupportedVersion(raw.version));
	}

	let sources: Vec<Arc<str>> = raw
		.sources
		.iter()
		.map(|s| resolve_source_path(raw.source_root.as_deref(), s.as_deref().unwrap_or("")))
		.collect();
	let names: Vec<Arc<str>> = raw.names.iter().map(|n| Arc::from(n.as_str())).collect();

	let mut mappings = Vec::new();
	let mut current_line = None;
	let mut generated_column = 0i64;
	let mut source = 0i64;
	let mut original_line = 0i64;
	let mut original_column = 0i64;
	let mut name = 0i64;

	for (line, segment) in split_segments(&raw.mappings) {
		// Generated columns restart on every line, the other fields carry over.
		if current_line != Some(line) {
			current_line = Some(line);
			generated_column = 0;
		}

		let fields = decode_vlq_segment(segment)?;
		match fields.len() {
			1 => {
				generated_column += fields[0];
				continue;
			}
			4 | 5 => {}
			n => {
				return Err(MapFormatError::InvalidSegmentLength {
					segment: segment.to_string(),
					fields: n,
				})
			}
		}

		generated_column += fields[0];
		source += fields[1];
		original_line += fields[2];
		original_column += fields[3];

		if generated_column < 0 || original_line < 0 || original_column < 0 {
			return Err(MapFormatError::NegativePosition(segment.to_string()));
		}

		let original_file = usize::try_from(source)
			.ok()
			.and_then(|idx| sources.get(idx))
			.ok_or(MapFormatError::InvalidSourceIndex(source))?
			.clone();

		let original_name = if fields.len() == 5 {
			name += fields[4];
			let resolved = usize::try_from(name)
				.ok()
				.and_then(|idx| names.get(idx))
				.ok_or(MapFormatError::InvalidNameIndex(name))?;
			Some(resolved.clone())
		} else {
			None
		};

		let out_of_range = || MapFormatError::PositionOutOfRange(segment.to_string());
		mappings.push(DecodedMapping {
			generated_line: line.checked_add(1).ok_or_else(out_of_range)?,
			generated_column: u32::try_from(generated_column).map_err(|_| out_of_range())?,
			original_file,
			original_line: u32::try_from(original_line)
				.ok()
				.and_then(|l| l.checked_add(1))
				.ok_or_else(out_of_range)?,
			original_column: u32::try_from(original_column).map_err(|_| out_of_range())?,
			original_name,
		});
	}

	Ok(mappings)
}

/// Resolve a source path with the source root if present.
fn resolve_source_path(root: Option<&str>, source: &str) -> Arc<str> {
	match root {
		Some(root) if !root.is_empty() => {
			let root = root.trim_end_matches('/');
			Arc::from(format!("{root}/{source}"))
		}
		_ => Arc::from(source),
	}
}
