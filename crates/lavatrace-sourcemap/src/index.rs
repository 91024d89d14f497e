// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Immutable lookup structure over a decoded source map.

use std::collections::{BTreeMap, HashMap};

use crate::decoder::DecodedMapping;
use crate::error::LookupError;

/// Mappings of one source map, indexed by generated line then column.
///
/// Built once per (commit, filename) and never mutated afterwards, so it can
/// be shared between tasks behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct MapIndex {
	lines: HashMap<u32, BTreeMap<u32, DecodedMapping>>,
	mapping_count: usize,
}

impl MapIndex {
	/// Build an index from decoded mappings.
	///
	/// When several mappings share a generated position, the first one wins.
	pub fn build(mappings: impl IntoIterator<Item = DecodedMapping>) -> Self {
		let mut lines: HashMap<u32, BTreeMap<u32, DecodedMapping>> = HashMap::new();
		let mut mapping_count = 0;

		for mapping in mappings {
			let columns = lines.entry(mapping.generated_line).or_default();
			if let std::collections::btree_map::Entry::Vacant(slot) =
				columns.entry(mapping.generated_column)
			{
				slot.insert(mapping);
				mapping_count += 1;
			}
		}

		Self {
			lines,
			mapping_count,
		}
	}

	/// Find the mapping covering a generated position.
	///
	/// An exact hit is returned as is. Otherwise the position falls inside the
	/// span opened by the nearest mapped column before it on the same line.
	pub fn lookup(&self, line: i64, column: i64) -> Result<&DecodedMapping, LookupError> {
		if column < 0 {
			return Err(LookupError::InvalidColumn(column));
		}

		let no_such_line = LookupError::NoSuchLine { line, column };

		let columns = u32::try_from(line)
			.ok()
			.and_then(|l| self.lines.get(&l))
			.ok_or(no_such_line)?;

		let upper = u32::try_from(column).unwrap_or(u32::MAX);
		columns
			.range(..=upper)
			.next_back()
			.map(|(_, mapping)| mapping)
			.ok_or(no_such_line)
	}

	/// Number of distinct generated positions in the index.
	pub fn len(&self) -> usize {
		self.mapping_count
	}

	pub fn is_empty(&self) -> bool {
		self.mapping_count == 0
	}

	/// Number of generated lines with at least one mapping.
	pub fn line_count(&self) -> usize {
		self.lines.len()
	}
}
