// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Structured events forwarded to an external error tracker.
//!
//! Field names follow the event payload accepted by Sentry-compatible store
//! endpoints.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::EventId;

/// One frame of a forwarded stacktrace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredFrame {
	pub filename: String,
	pub function: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub module: Option<String>,
	pub lineno: i64,
	pub colno: i64,
	pub in_app: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub abs_path: Option<String>,
	/// Local variables captured with the frame.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub vars: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventStacktrace {
	pub frames: Vec<StructuredFrame>,
}

/// One exception of an event, built from one report entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventException {
	#[serde(rename = "type")]
	pub kind: String,
	pub value: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub module: Option<String>,
	pub stacktrace: EventStacktrace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventExtra {
	pub commit_id: String,
	pub version: String,
	pub assets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventExceptions {
	pub values: Vec<EventException>,
}

/// An event describing every entry of one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredEvent {
	pub event_id: EventId,
	pub timestamp: DateTime<Utc>,
	pub platform: String,
	pub release: String,
	pub message: String,
	pub culprit: String,
	pub extra: EventExtra,
	pub exception: EventExceptions,
}

impl StructuredEvent {
	/// Build an event from its exceptions.
	///
	/// Message and culprit are taken from the last exception; the culprit is the
	/// module of its innermost frame, or the filename when it has no module.
	pub fn new(release: impl Into<String>, extra: EventExtra, exceptions: Vec<EventException>) -> Self {
		let (message, culprit) = exceptions
			.last()
			.map(|ex| {
				let culprit = ex
					.stacktrace
					.frames
					.last()
					.map(|f| f.module.clone().unwrap_or_else(|| f.filename.clone()))
					.unwrap_or_default();
				(ex.value.clone(), culprit)
			})
			.unwrap_or_default();

		Self {
			event_id: EventId::new(),
			timestamp: Utc::now(),
			platform: "javascript".to_string(),
			release: release.into(),
			message,
			culprit,
			extra,
			exception: EventExceptions { values: exceptions },
		}
	}
}
