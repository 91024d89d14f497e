// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Two-tier resolution cache.
//!
//! The exact tier maps a fully specified generated position to its resolved
//! position. The index tier maps a (commit, filename) to the built index of
//! its source map. Both tiers are concurrent maps with an optional capacity
//! bound; the index tier is filled through `get_or_compute`, which runs at
//! most one computation per key at a time.

use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lavatrace_core::ResolvedPosition;
use lavatrace_sourcemap::MapIndex;
use moka::future::Cache;
use serde::Serialize;
use tracing::debug;

/// Default capacity of the exact tier.
pub const DEFAULT_EXACT_CAPACITY: u64 = 100_000;

/// Default capacity of the index tier.
pub const DEFAULT_INDEX_CAPACITY: u64 = 256;

/// Source map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapKey {
	pub commit: String,
	pub filename: String,
}

impl MapKey {
	pub fn new(commit: impl Into<String>, filename: impl Into<String>) -> Self {
		Self {
			commit: commit.into(),
			filename: filename.into(),
		}
	}
}

/// Generated position key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PositionKey {
	pub map: MapKey,
	pub line: i64,
	pub column: i64,
}

/// Capacity settings, `None` meaning unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
	pub exact_capacity: Option<u64>,
	pub index_capacity: Option<u64>,
}

impl Default for CacheConfig {
	fn default() -> Self {
		Self {
			exact_capacity: Some(DEFAULT_EXACT_CAPACITY),
			index_capacity: Some(DEFAULT_INDEX_CAPACITY),
		}
	}
}

impl CacheConfig {
	pub fn unbounded() -> Self {
		Self {
			exact_capacity: None,
			index_capacity: None,
		}
	}
}

/// Counters of one cache tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
	pub entries: u64,
	pub hits: u64,
	pub misses: u64,
}

/// One cache tier.
pub struct TieredCache<K, V> {
	name: &'static str,
	inner: Cache<K, V>,
	hits: AtomicU64,
	misses: AtomicU64,
}

impl<K, V> TieredCache<K, V>
where
	K: Hash + Eq + Send + Sync + 'static,
	V: Clone + Send + Sync + 'static,
{
	pub fn new(name: &'static str, capacity: Option<u64>) -> Self {
		let mut builder = Cache::builder().name(name);
		if let Some(capacity) = capacity {
			builder = builder.max_capacity(capacity);
		}

		Self {
			name,
			inner: builder.build(),
			hits: AtomicU64::new(0),
			misses: AtomicU64::new(0),
		}
	}

	pub async fn get(&self, key: &K) -> Option<V> {
		let value = self.inner.get(key).await;
		if value.is_some() {
			self.hits.fetch_add(1, Ordering::Relaxed);
		} else {
			self.misses.fetch_add(1, Ordering::Relaxed);
		}
		value
	}

	pub async fn put(&self, key: K, value: V) {
		self.inner.insert(key, value).await;
	}

	/// Return the cached value, or run `compute` and cache its result.
	///
	/// Concurrent callers for the same missing key are coalesced: only one
	/// `compute` runs and every caller receives its outcome. Errors are
	/// shared with the waiting callers but not cached.
	pub async fn get_or_compute<F, E>(&self, key: K, compute: F) -> Result<V, Arc<E>>
	where
		F: Future<Output = Result<V, E>>,
		E: Send + Sync + 'static,
	{
		let tier = self.name;
		self.inner
			.try_get_with(key, async move {
				debug!(tier, "computing cache entry");
				compute.await
			})
			.await
	}

	pub fn stats(&self) -> CacheStats {
		CacheStats {
			entries: self.inner.entry_count(),
			hits: self.hits.load(Ordering::Relaxed),
			misses: self.misses.load(Ordering::Relaxed),
		}
	}
}

/// Snapshot of both tiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionCacheStats {
	pub exact: CacheStats,
	pub index: CacheStats,
}

/// The exact and index tiers used by the resolver.
pub struct ResolutionCache {
	pub exact: TieredCache<PositionKey, ResolvedPosition>,
	pub index: TieredCache<MapKey, Arc<MapIndex>>,
}

impl ResolutionCache {
	pub fn new(config: CacheConfig) -> Self {
		Self {
			exact: TieredCache::new("exact", config.exact_capacity),
			index: TieredCache::new("index", config.index_capacity),
		}
	}

	pub fn stats(&self) -> ResolutionCacheStats {
		ResolutionCacheStats {
			exact: self.exact.stats(),
			index: self.index.stats(),
		}
	}
}

impl Default for ResolutionCache {
	fn default() -> Self {
		Self::new(CacheConfig::default())
	}
}
