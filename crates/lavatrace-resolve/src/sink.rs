// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Destination for forwarded events.

use async_trait::async_trait;
use tokio::sync::Mutex;

use lavatrace_core::{EventId, StructuredEvent};

use crate::error::SinkError;

/// An external error tracker that accepts structured events.
#[async_trait]
pub trait EventSink: Send + Sync {
	/// Deliver an event and return the id the tracker assigned to it.
	async fn capture(&self, event: &StructuredEvent) -> Result<EventId, SinkError>;
}

/// Sink that keeps every captured event in memory.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
	events: Mutex<Vec<StructuredEvent>>,
}

impl RecordingEventSink {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn events(&self) -> Vec<StructuredEvent> {
		self.events.lock().await.clone()
	}
}

#[async_trait]
impl EventSink for RecordingEventSink {
	async fn capture(&self, event: &StructuredEvent) -> Result<EventId, SinkError> {
		self.events.lock().await.push(event.clone());
		Ok(event.event_id)
	}
}
