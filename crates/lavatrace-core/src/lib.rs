// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the lavatrace stack resolution service.
//!
//! This crate provides the types shared between the resolution core and the
//! server:
//! - The compact stack frame wire format and its codec
//! - Resolved positions and the two output shapes they render to
//! - Inbound reports, persisted reports and forwarded events

pub mod error;
pub mod event;
pub mod frame;
pub mod position;
pub mod report;

pub use error::{FormatError, Result};
pub use event::{
	EventException, EventExceptions, EventExtra, EventStacktrace, StructuredEvent, StructuredFrame,
};
pub use frame::{map_key_for_asset, parse_frame, parse_stacktrace, Frame, ResolvedFrame};
pub use position::{ResolvedPosition, NAME_PLACEHOLDER};
pub use report::{Report, ReportEntry, StoredEntry, StoredReport};

use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a persisted report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ReportId(pub Uuid);

impl ReportId {
	pub fn new() -> Self {
		Self(Uuid::now_v7())
	}
}

impl Default for ReportId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for ReportId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for ReportId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		Ok(Self(Uuid::parse_str(s)?))
	}
}

/// Identifier of a forwarded event.
///
/// Rendered as 32 lowercase hex digits without dashes, the form error
/// trackers expect in `event_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId(pub Uuid);

impl EventId {
	pub fn new() -> Self {
		Self(Uuid::now_v7())
	}
}

impl Default for EventId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for EventId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0.simple())
	}
}

impl FromStr for EventId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		Ok(Self(Uuid::parse_str(s)?))
	}
}

impl serde::Serialize for EventId {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> serde::Deserialize<'de> for EventId {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(serde::de::Error::custom)
	}
}
