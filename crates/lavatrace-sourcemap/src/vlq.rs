// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Base64 VLQ decoding for the `mappings` field of a source map.

use crate::error::MapFormatError;

/// Continuation bit of a base64 VLQ digit.
const VLQ_CONTINUATION: i64 = 0b10_0000;

/// Shift of the last digit a value may use. Seven digits carry up to 35
/// bits; the decoded value is then range-checked against `i32`.
const VLQ_MAX_SHIFT: u32 = 30;

/// Decode a Base64 character to its 6-bit value.
fn decode_char(ch: u8) -> Result<i64, MapFormatError> {
	let value = match ch {
		b'A'..=b'Z' => ch - b'A',
		b'a'..=b'z' => ch - b'a' + 26,
		b'0'..=b'9' => ch - b'0' + 52,
		b'+' => 62,
		b'/' => 63,
		_ => return Err(MapFormatError::InvalidVlqChar(ch as char)),
	};
	Ok(i64::from(value))
}

/// Decode one comma-delimited segment into its signed (relative) fields.
pub fn decode_vlq_segment(segment: &str) -> Result<Vec<i64>, MapFormatError> {
	let mut values = Vec::with_capacity(5);
	let mut value = 0i64;
	let mut shift = 0u32;

	for ch in segment.bytes() {
		if shift > VLQ_MAX_SHIFT {
			return Err(MapFormatError::VlqOverflow(segment.to_string()));
		}

		let digit = decode_char(ch)?;
		value += (digit & !VLQ_CONTINUATION) << shift;

		if digit & VLQ_CONTINUATION != 0 {
			shift += 5;
			continue;
		}

		// Lowest bit carries the sign.
		let magnitude = value >> 1;
		let signed = if value & 1 != 0 { -magnitude } else { magnitude };
		if i32::try_from(signed).is_err() {
			return Err(MapFormatError::VlqOverflow(segment.to_string()));
		}
		values.push(signed);
		value = 0;
		shift = 0;
	}

	if shift != 0 {
		return Err(MapFormatError::TruncatedVlq(segment.to_string()));
	}

	Ok(values)
}

/// Iterate the non-empty segments of a `mappings` string with their
/// 0-indexed generated line.
pub fn split_segments(mappings: &str) -> impl Iterator<Item = (u32, &str)> {
	mappings
		.split(';')
		.enumerate()
		.flat_map(|(line, segments)| {
			segments
				.split(',')
				.filter(|s| !s.is_empty())
				.map(move |s| (line as u32, s))
		})
}
