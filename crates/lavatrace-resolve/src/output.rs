// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Output strategies for resolved reports.
//!
//! A resolved report leaves the system either as a structured event sent to an
//! error tracker, or as a stored report with compact stacktraces.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, instrument};

use lavatrace_core::{
	EventException, EventExtra, EventId, EventStacktrace, Report, ReportId, ResolvedFrame,
	StoredEntry, StoredReport, StructuredEvent,
};

use crate::error::Result;
use crate::sink::EventSink;
use crate::store::ReportStore;

/// A report together with the resolved frames of each of its entries.
#[derive(Debug, Clone)]
pub struct ResolvedReport {
	pub report: Report,
	/// One list per entry, in entry order.
	pub frames: Vec<Vec<ResolvedFrame>>,
}

/// What a delivery produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryReceipt {
	Event(EventId),
	Stored(ReportId),
}

impl fmt::Display for DeliveryReceipt {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			DeliveryReceipt::Event(id) => write!(f, "{id}"),
			DeliveryReceipt::Stored(id) => write!(f, "{id}"),
		}
	}
}

/// Delivers a resolved report.
#[async_trait]
pub trait OutputStrategy: Send + Sync {
	async fn deliver(&self, resolved: ResolvedReport) -> Result<DeliveryReceipt>;
}

/// Forwards each report as one structured event.
pub struct ForwardEvents<S: EventSink + ?Sized> {
	sink: Arc<S>,
}

impl<S: EventSink + ?Sized> ForwardEvents<S> {
	pub fn new(sink: Arc<S>) -> Self {
		Self { sink }
	}
}

/// Build the structured event for a resolved report.
///
/// Each entry becomes one exception. The entry's logged objects are attached
/// as `vars` to its last frame.
pub fn build_event(resolved: &ResolvedReport) -> StructuredEvent {
	let report = &resolved.report;
	let exceptions = report
		.entries
		.iter()
		.zip(&resolved.frames)
		.map(|(entry, frames)| {
			let last = frames.len().saturating_sub(1);
			let frames: Vec<_> = frames
				.iter()
				.enumerate()
				.map(|(i, frame)| {
					let vars = if i == last {
						entry.vars()
					} else {
						BTreeMap::new()
					};
					frame.to_structured(vars)
				})
				.collect();

			EventException {
				kind: entry.kind.clone(),
				value: entry.message.clone(),
				module: frames.last().map(|f| f.filename.clone()),
				stacktrace: EventStacktrace { frames },
			}
		})
		.collect();

	let extra = EventExtra {
		commit_id: report.commit_id.clone(),
		version: report.version.clone(),
		assets: report.assets.clone(),
	};

	StructuredEvent::new(report.commit_id.clone(), extra, exceptions)
}

#[async_trait]
impl<S: EventSink + ?Sized> OutputStrategy for ForwardEvents<S> {
	#[instrument(skip(self, resolved), fields(commit = %resolved.report.commit_id))]
	async fn deliver(&self, resolved: ResolvedReport) -> Result<DeliveryReceipt> {
		let event = build_event(&resolved);
		let event_id = self.sink.capture(&event).await?;
		info!(event_id = %event_id, exceptions = event.exception.values.len(), "Forwarded report");
		Ok(DeliveryReceipt::Event(event_id))
	}
}

/// Persists each report with compact `file:name:line:column` stacktraces.
pub struct PersistCompact<S: ReportStore + ?Sized> {
	store: Arc<S>,
}

impl<S: ReportStore + ?Sized> PersistCompact<S> {
	pub fn new(store: Arc<S>) -> Self {
		Self { store }
	}
}

/// Build the stored form of a resolved report.
pub fn build_stored_report(resolved: ResolvedReport) -> StoredReport {
	let ResolvedReport { report, frames } = resolved;
	let entries = report
		.entries
		.into_iter()
		.zip(frames)
		.map(|(entry, frames)| StoredEntry {
			date: entry.date,
			kind: entry.kind,
			message: entry.message,
			objects: entry.objects,
			stacktrace: frames.iter().map(ResolvedFrame::to_compact).collect(),
		})
		.collect();

	StoredReport {
		id: ReportId::new(),
		commit_id: report.commit_id,
		version: report.version,
		assets: report.assets,
		entries,
		received_at: Utc::now(),
	}
}

#[async_trait]
impl<S: ReportStore + ?Sized> OutputStrategy for PersistCompact<S> {
	#[instrument(skip(self, resolved), fields(commit = %resolved.report.commit_id))]
	async fn deliver(&self, resolved: ResolvedReport) -> Result<DeliveryReceipt> {
		let stored = build_stored_report(resolved);
		let report_id = self.store.insert(&stored).await?;
		info!(report_id = %report_id, entries = stored.entries.len(), "Stored report");
		Ok(DeliveryReceipt::Stored(report_id))
	}
}
