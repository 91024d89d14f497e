// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resolved original positions.

use serde::{Deserialize, Serialize};

/// Label shown in place of an empty function name, and used for frames whose
/// source map was never uploaded.
pub const NAME_PLACEHOLDER: &str = "unknown";

/// Original location of a generated position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedPosition {
	pub file: String,
	/// Empty when the mapping carries no identifier.
	pub name: String,
	pub line: i64,
	pub column: i64,
}

impl ResolvedPosition {
	pub fn new(file: impl Into<String>, name: impl Into<String>, line: i64, column: i64) -> Self {
		Self {
			file: file.into(),
			name: name.into(),
			line,
			column,
		}
	}

	/// Position for a frame whose source map was never uploaded. The requested
	/// generated position is echoed back.
	pub fn missing_map(line: i64, column: i64) -> Self {
		Self::new(NAME_PLACEHOLDER, NAME_PLACEHOLDER, line, column)
	}

	/// Position for a frame of unknown origin.
	pub fn unknown_origin(line: i64, column: i64) -> Self {
		Self::new("/", "/", line, column)
	}

	/// Position for a runtime-native frame.
	pub fn native(line: i64, column: i64) -> Self {
		Self::new("native", "native", line, column)
	}

	/// Name to display, with the placeholder substituted for an empty name.
	pub fn display_name(&self) -> &str {
		if self.name.is_empty() {
			NAME_PLACEHOLDER
		} else {
			&self.name
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_display_name_substitutes_placeholder() {
		let pos = ResolvedPosition::new("src/app.ts", "", 3, 4);
		assert_eq!(pos.display_name(), "unknown");

		let pos = ResolvedPosition::new("src/app.ts", "render", 3, 4);
		assert_eq!(pos.display_name(), "render");
	}

	#[test]
	fn test_missing_map_echoes_position() {
		let pos = ResolvedPosition::missing_map(10, 5);
		assert_eq!(pos.file, "unknown");
		assert_eq!(pos.name, "unknown");
		assert_eq!((pos.line, pos.column), (10, 5));
	}
}
