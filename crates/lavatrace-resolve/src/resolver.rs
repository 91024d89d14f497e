// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Generated position resolution over the two cache tiers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use lavatrace_core::ResolvedPosition;
use lavatrace_sourcemap::{decode_source_map, DecodedMapping, MapIndex};

use crate::cache::{CacheConfig, MapKey, PositionKey, ResolutionCache, ResolutionCacheStats};
use crate::error::{ResolveError, Result};
use crate::store::MapStore;

/// Resolves a generated position to its original position.
#[async_trait]
pub trait PositionResolver: Send + Sync {
	async fn resolve(
		&self,
		commit: &str,
		filename: &str,
		line: i64,
		column: i64,
	) -> Result<ResolvedPosition>;
}

/// Failure to produce a map index.
#[derive(Debug)]
enum IndexLoadError {
	/// No source map was ever uploaded for the key.
	Missing,
	Failed(ResolveError),
}

/// Counters of the work done on cache misses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolverStats {
	pub store_fetches: u64,
	pub index_builds: u64,
	pub placeholders: u64,
	pub cache: ResolutionCacheStats,
}

/// Resolver backed by a [`MapStore`] and a [`ResolutionCache`].
pub struct Resolver<S: MapStore + ?Sized> {
	store: Arc<S>,
	cache: ResolutionCache,
	store_fetches: AtomicU64,
	index_builds: AtomicU64,
	placeholders: AtomicU64,
}

impl<S: MapStore + ?Sized> Resolver<S> {
	pub fn new(store: Arc<S>, config: CacheConfig) -> Self {
		Self {
			store,
			cache: ResolutionCache::new(config),
			store_fetches: AtomicU64::new(0),
			index_builds: AtomicU64::new(0),
			placeholders: AtomicU64::new(0),
		}
	}

	/// Resolve a generated position.
	///
	/// Looks in the exact tier, then the index tier, and only on a double miss
	/// fetches and decodes the source map. When no source map was ever uploaded
	/// for the file, a placeholder position is returned instead of an error.
	#[instrument(skip(self), fields(commit = %commit, filename = %filename))]
	pub async fn resolve(
		&self,
		commit: &str,
		filename: &str,
		line: i64,
		column: i64,
	) -> Result<ResolvedPosition> {
		let map_key = MapKey::new(commit, filename);
		let position_key = PositionKey {
			map: map_key.clone(),
			line,
			column,
		};

		if let Some(position) = self.cache.exact.get(&position_key).await {
			debug!(line, column, "exact cache hit");
			return Ok(position);
		}

		let index = match self.cache.index.get(&map_key).await {
			Some(index) => index,
			None => match self.load_index(map_key).await {
				Ok(index) => index,
				Err(err) => match err.as_ref() {
					IndexLoadError::Missing => {
						warn!(line, column, "no source map uploaded, using placeholder");
						self.placeholders.fetch_add(1, Ordering::Relaxed);
						let position = ResolvedPosition::missing_map(line, column);
						self.cache.exact.put(position_key, position.clone()).await;
						return Ok(position);
					}
					IndexLoadError::Failed(e) => return Err(e.clone()),
				},
			},
		};

		let mapping = index
			.lookup(line, column)
			.map_err(|source| ResolveError::Lookup {
				filename: filename.to_string(),
				source,
			})?;
		let position = to_resolved(mapping);

		self.cache.exact.put(position_key, position.clone()).await;
		Ok(position)
	}

	/// Load the index of a source map, coalescing concurrent loads of the same
	/// key into a single store fetch and decode.
	async fn load_index(&self, key: MapKey) -> std::result::Result<Arc<MapIndex>, Arc<IndexLoadError>> {
		let store = &self.store;
		let store_fetches = &self.store_fetches;
		let index_builds = &self.index_builds;
		let MapKey { commit, filename } = key.clone();

		self.cache
			.index
			.get_or_compute(key, async move {
				store_fetches.fetch_add(1, Ordering::Relaxed);
				let records = store
					.get_all(&commit, &filename)
					.await
					.map_err(|e| IndexLoadError::Failed(e.into()))?;

				// Most recent upload first.
				let Some(record) = records.into_iter().next() else {
					return Err(IndexLoadError::Missing);
				};

				let mappings = decode_source_map(&record.body).map_err(|e| {
					IndexLoadError::Failed(ResolveError::MapFormat {
						commit: commit.clone(),
						filename: filename.clone(),
						source: Arc::new(e),
					})
				})?;

				let index = MapIndex::build(mappings);
				index_builds.fetch_add(1, Ordering::Relaxed);
				info!(
					commit = %commit,
					filename = %filename,
					mappings = index.len(),
					lines = index.line_count(),
					"Built source map index"
				);
				Ok(Arc::new(index))
			})
			.await
	}

	pub fn stats(&self) -> ResolverStats {
		ResolverStats {
			store_fetches: self.store_fetches.load(Ordering::Relaxed),
			index_builds: self.index_builds.load(Ordering::Relaxed),
			placeholders: self.placeholders.load(Ordering::Relaxed),
			cache: self.cache.stats(),
		}
	}
}

#[async_trait]
impl<S: MapStore + ?Sized> PositionResolver for Resolver<S> {
	async fn resolve(
		&self,
		commit: &str,
		filename: &str,
		line: i64,
		column: i64,
	) -> Result<ResolvedPosition> {
		Resolver::resolve(self, commit, filename, line, column).await
	}
}

fn to_resolved(mapping: &DecodedMapping) -> ResolvedPosition {
	ResolvedPosition {
		file: mapping.original_file.to_string(),
		name: mapping
			.original_name
			.as_deref()
			.unwrap_or_default()
			.to_string(),
		line: i64::from(mapping.original_line),
		column: i64::from(mapping.original_column),
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use lavatrace_sourcemap::LookupError;

	use super::*;
	use crate::error::StoreError;
	use crate::store::{InMemoryMapStore, SourceMapSource};

	/// Line 1: columns 0, 9 ("hello") and 15 ("console"); line 2: column 0.
	const SAMPLE_MAP: &str = r#"{
		"version": 3,
		"sources": ["src/index.ts"],
		"names": ["hello", "console", "log"],
		"mappings": "AAAA,SAASA,MAAMC;AACA"
	}"#;

	/// Line 5 only has a mapping at column 10.
	const SPARSE_MAP: &str = r#"{
		"version": 3,
		"sources": ["src/sparse.ts"],
		"names": ["target"],
		"mappings": ";;;;UAAUA"
	}"#;

	/// Store wrapper that counts fetches and can delay them.
	struct CountingStore {
		inner: InMemoryMapStore,
		fetches: AtomicU64,
		delay: Duration,
	}

	impl CountingStore {
		fn new(delay: Duration) -> Self {
			Self {
				inner: InMemoryMapStore::new(),
				fetches: AtomicU64::new(0),
				delay,
			}
		}

		fn fetches(&self) -> u64 {
			self.fetches.load(Ordering::SeqCst)
		}
	}

	#[async_trait]
	impl MapStore for CountingStore {
		async fn put(&self, commit: &str, filename: &str, body: &str) -> std::result::Result<(), StoreError> {
			self.inner.put(commit, filename, body).await
		}

		async fn get_all(
			&self,
			commit: &str,
			filename: &str,
		) -> std::result::Result<Vec<SourceMapSource>, StoreError> {
			self.fetches.fetch_add(1, Ordering::SeqCst);
			if !self.delay.is_zero() {
				tokio::time::sleep(self.delay).await;
			}
			self.inner.get_all(commit, filename).await
		}
	}

	struct FailingStore;

	#[async_trait]
	impl MapStore for FailingStore {
		async fn put(&self, _: &str, _: &str, _: &str) -> std::result::Result<(), StoreError> {
			Err(StoreError::Unavailable("connection refused".to_string()))
		}

		async fn get_all(&self, _: &str, _: &str) -> std::result::Result<Vec<SourceMapSource>, StoreError> {
			Err(StoreError::Unavailable("connection refused".to_string()))
		}
	}

	async fn resolver_with(
		maps: &[(&str, &str, &str)],
		delay: Duration,
	) -> (Arc<CountingStore>, Resolver<CountingStore>) {
		let store = Arc::new(CountingStore::new(delay));
		for (commit, filename, body) in maps {
			store.put(commit, filename, body).await.unwrap();
		}
		let resolver = Resolver::new(store.clone(), CacheConfig::default());
		(store, resolver)
	}

	#[tokio::test]
	async fn test_resolves_every_decoded_position() {
		let (_store, resolver) =
			resolver_with(&[("abc", "app.js.map", SAMPLE_MAP)], Duration::ZERO).await;

		for mapping in decode_source_map(SAMPLE_MAP).unwrap() {
			let position = resolver
				.resolve(
					"abc",
					"app.js.map",
					i64::from(mapping.generated_line),
					i64::from(mapping.generated_column),
				)
				.await
				.unwrap();
			assert_eq!(position, to_resolved(&mapping));
		}
	}

	#[tokio::test]
	async fn test_second_resolution_skips_store() {
		let (store, resolver) =
			resolver_with(&[("abc", "app.js.map", SAMPLE_MAP)], Duration::ZERO).await;

		let first = resolver.resolve("abc", "app.js.map", 1, 9).await.unwrap();
		assert_eq!(store.fetches(), 1);

		let second = resolver.resolve("abc", "app.js.map", 1, 9).await.unwrap();
		assert_eq!(first, second);
		assert_eq!(second.name, "hello");
		assert_eq!(store.fetches(), 1);
		assert_eq!(resolver.stats().cache.exact.hits, 1);
	}

	#[tokio::test]
	async fn test_other_positions_use_index_tier() {
		let (store, resolver) =
			resolver_with(&[("abc", "app.js.map", SAMPLE_MAP)], Duration::ZERO).await;

		resolver.resolve("abc", "app.js.map", 1, 0).await.unwrap();
		let position = resolver.resolve("abc", "app.js.map", 1, 20).await.unwrap();
		assert_eq!(position.name, "console");
		assert_eq!(store.fetches(), 1);
		assert_eq!(resolver.stats().index_builds, 1);
	}

	#[tokio::test]
	async fn test_column_fallback() {
		let (_store, resolver) =
			resolver_with(&[("abc", "sparse.js.map", SPARSE_MAP)], Duration::ZERO).await;

		let position = resolver.resolve("abc", "sparse.js.map", 5, 12).await.unwrap();
		assert_eq!(position.file, "src/sparse.ts");
		assert_eq!(position.name, "target");
		assert_eq!((position.line, position.column), (1, 10));

		let err = resolver.resolve("abc", "sparse.js.map", 5, 9).await.unwrap_err();
		assert!(matches!(
			err,
			ResolveError::Lookup {
				source: LookupError::NoSuchLine { line: 5, column: 9 },
				..
			}
		));
	}

	#[tokio::test]
	async fn test_negative_column_is_a_lookup_error() {
		let (_store, resolver) =
			resolver_with(&[("abc", "app.js.map", SAMPLE_MAP)], Duration::ZERO).await;

		let err = resolver.resolve("abc", "app.js.map", 1, -1).await.unwrap_err();
		assert!(matches!(
			err,
			ResolveError::Lookup {
				source: LookupError::InvalidColumn(-1),
				..
			}
		));
	}

	#[tokio::test]
	async fn test_missing_map_resolves_to_placeholder() {
		let (store, resolver) = resolver_with(&[], Duration::ZERO).await;

		let position = resolver.resolve("abc", "app.js.map", 10, 5).await.unwrap();
		assert_eq!(position, ResolvedPosition::missing_map(10, 5));
		assert_eq!(resolver.stats().placeholders, 1);

		// The placeholder itself is cached.
		resolver.resolve("abc", "app.js.map", 10, 5).await.unwrap();
		assert_eq!(store.fetches(), 1);
	}

	#[tokio::test]
	async fn test_late_upload_is_picked_up_for_new_positions() {
		let (store, resolver) = resolver_with(&[], Duration::ZERO).await;

		let position = resolver.resolve("abc", "app.js.map", 1, 9).await.unwrap();
		assert_eq!(position.file, "unknown");

		store.put("abc", "app.js.map", SAMPLE_MAP).await.unwrap();

		let position = resolver.resolve("abc", "app.js.map", 1, 15).await.unwrap();
		assert_eq!(position.name, "console");
	}

	#[tokio::test]
	async fn test_most_recent_upload_wins() {
		let (_store, resolver) = resolver_with(
			&[
				("abc", "app.js.map", SPARSE_MAP),
				("abc", "app.js.map", SAMPLE_MAP),
			],
			Duration::ZERO,
		)
		.await;

		let position = resolver.resolve("abc", "app.js.map", 1, 9).await.unwrap();
		assert_eq!(position.file, "src/index.ts");
	}

	#[tokio::test]
	async fn test_malformed_map_is_not_cached() {
		let (store, resolver) =
			resolver_with(&[("abc", "app.js.map", "{not json")], Duration::ZERO).await;

		let err = resolver.resolve("abc", "app.js.map", 1, 0).await.unwrap_err();
		assert!(matches!(err, ResolveError::MapFormat { .. }));

		let err = resolver.resolve("abc", "app.js.map", 1, 0).await.unwrap_err();
		assert!(matches!(err, ResolveError::MapFormat { .. }));
		assert_eq!(store.fetches(), 2);
		assert_eq!(resolver.stats().index_builds, 0);
	}

	#[tokio::test]
	async fn test_store_errors_propagate() {
		let resolver = Resolver::new(Arc::new(FailingStore), CacheConfig::default());
		let err = resolver.resolve("abc", "app.js.map", 1, 0).await.unwrap_err();
		assert!(matches!(err, ResolveError::Store(StoreError::Unavailable(_))));
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn test_concurrent_first_resolutions_decode_once() {
		let (store, resolver) = resolver_with(
			&[("abc", "app.js.map", SAMPLE_MAP)],
			Duration::from_millis(50),
		)
		.await;
		let resolver = Arc::new(resolver);

		let tasks: Vec<_> = (0..32)
			.map(|i| {
				let resolver = resolver.clone();
				tokio::spawn(async move {
					resolver
						.resolve("abc", "app.js.map", 1, i64::from(i % 20))
						.await
				})
			})
			.collect();

		for task in futures::future::join_all(tasks).await {
			task.unwrap().unwrap();
		}

		assert_eq!(store.fetches(), 1);
		assert_eq!(resolver.stats().store_fetches, 1);
		assert_eq!(resolver.stats().index_builds, 1);
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn test_concurrent_missing_map_fetches_once() {
		let (store, resolver) = resolver_with(&[], Duration::from_millis(50)).await;
		let resolver = Arc::new(resolver);

		let tasks: Vec<_> = (0..8)
			.map(|_| {
				let resolver = resolver.clone();
				tokio::spawn(async move { resolver.resolve("abc", "app.js.map", 3, 4).await })
			})
			.collect();

		for task in futures::future::join_all(tasks).await {
			assert_eq!(task.unwrap().unwrap(), ResolvedPosition::missing_map(3, 4));
		}
		assert_eq!(store.fetches(), 1);
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn test_distinct_keys_load_independently() {
		let (store, resolver) = resolver_with(
			&[
				("abc", "app.js.map", SAMPLE_MAP),
				("abc", "vendor.js.map", SAMPLE_MAP),
			],
			Duration::from_millis(20),
		)
		.await;

		let (a, b) = tokio::join!(
			resolver.resolve("abc", "app.js.map", 1, 9),
			resolver.resolve("abc", "vendor.js.map", 1, 9)
		);
		assert_eq!(a.unwrap(), b.unwrap());
		assert_eq!(store.fetches(), 2);
		assert_eq!(resolver.stats().index_builds, 2);
	}
}
