// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resolution cache capacities.

use lavatrace_resolve::{CacheConfig, DEFAULT_EXACT_CAPACITY, DEFAULT_INDEX_CAPACITY};
use serde::Deserialize;

/// Cache configuration layer (partial, for merging). `0` means unbounded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfigLayer {
	#[serde(default)]
	pub exact_capacity: Option<u64>,
	#[serde(default)]
	pub index_capacity: Option<u64>,
}

impl CacheConfigLayer {
	pub fn merge(&mut self, other: CacheConfigLayer) {
		if other.exact_capacity.is_some() {
			self.exact_capacity = other.exact_capacity;
		}
		if other.index_capacity.is_some() {
			self.index_capacity = other.index_capacity;
		}
	}

	pub fn finalize(self) -> CacheConfig {
		CacheConfig {
			exact_capacity: bound(self.exact_capacity.unwrap_or(DEFAULT_EXACT_CAPACITY)),
			index_capacity: bound(self.index_capacity.unwrap_or(DEFAULT_INDEX_CAPACITY)),
		}
	}
}

fn bound(capacity: u64) -> Option<u64> {
	(capacity > 0).then_some(capacity)
}
