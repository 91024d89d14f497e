// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Cached stack frame resolution.
//!
//! This crate ties the source map decoder to its collaborators:
//! - [`MapStore`] and [`ReportStore`] for persistence
//! - [`ResolutionCache`], the exact and index cache tiers
//! - [`Resolver`], which decodes each source map at most once at a time
//! - [`ReportProcessor`], which resolves whole reports and hands them to an
//!   [`OutputStrategy`]

pub mod cache;
pub mod codec;
pub mod error;
pub mod output;
pub mod processor;
pub mod resolver;
pub mod sink;
pub mod store;

pub use cache::{
	CacheConfig, CacheStats, MapKey, PositionKey, ResolutionCache, ResolutionCacheStats,
	TieredCache, DEFAULT_EXACT_CAPACITY, DEFAULT_INDEX_CAPACITY,
};
pub use codec::{resolve_frame, resolve_stacktrace};
pub use error::{ResolveError, Result, SinkError, StoreError};
pub use output::{
	build_event, build_stored_report, DeliveryReceipt, ForwardEvents, OutputStrategy,
	PersistCompact, ResolvedReport,
};
pub use processor::ReportProcessor;
pub use resolver::{PositionResolver, Resolver, ResolverStats};
pub use sink::{EventSink, RecordingEventSink};
pub use store::{InMemoryMapStore, InMemoryReportStore, MapStore, ReportStore, SourceMapSource};
