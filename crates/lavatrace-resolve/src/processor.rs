// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Report processing: resolve every frame, then hand off to an output strategy.

use std::sync::Arc;

use tracing::{debug, instrument};

use lavatrace_core::{FormatError, Report};

use crate::codec::resolve_stacktrace;
use crate::error::Result;
use crate::output::{DeliveryReceipt, OutputStrategy, ResolvedReport};
use crate::resolver::PositionResolver;

/// Resolves reports through one resolver and delivers them through one output.
#[derive(Clone)]
pub struct ReportProcessor {
	resolver: Arc<dyn PositionResolver>,
	output: Arc<dyn OutputStrategy>,
}

impl ReportProcessor {
	pub fn new(resolver: Arc<dyn PositionResolver>, output: Arc<dyn OutputStrategy>) -> Self {
		Self { resolver, output }
	}

	/// Resolve and deliver a report.
	///
	/// The report is rejected before any resolution when it has no entries or
	/// when an entry has an empty stacktrace. Any frame failing to resolve
	/// aborts the whole report.
	#[instrument(
		skip(self, report),
		fields(commit = %report.commit_id, entries = report.entries.len())
	)]
	pub async fn process(&self, report: Report) -> Result<DeliveryReceipt> {
		validate(&report)?;

		let mut frames = Vec::with_capacity(report.entries.len());
		for entry in &report.entries {
			let resolved = resolve_stacktrace(
				self.resolver.as_ref(),
				&report.commit_id,
				&report.assets,
				&entry.stacktrace,
			)
			.await?;
			debug!(frames = resolved.len(), "Resolved entry");
			frames.push(resolved);
		}

		self.output.deliver(ResolvedReport { report, frames }).await
	}
}

fn validate(report: &Report) -> std::result::Result<(), FormatError> {
	if report.entries.is_empty() {
		return Err(FormatError::NoEntries);
	}
	if let Some(i) = report
		.entries
		.iter()
		.position(|e| e.stacktrace.trim().is_empty())
	{
		return Err(FormatError::EmptyStacktrace(i));
	}
	Ok(())
}
