// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error reports sent by clients, and their persisted form.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ReportId;

/// A report as sent by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
	#[serde(rename = "commitID")]
	pub commit_id: String,
	#[serde(default)]
	pub version: String,
	/// Deployed files referenced by index from frame descriptors.
	#[serde(default)]
	pub assets: Vec<String>,
	#[serde(default)]
	pub entries: Vec<ReportEntry>,
}

/// One logged error of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
	#[serde(default)]
	pub date: i64,
	#[serde(rename = "type", default)]
	pub kind: String,
	#[serde(default)]
	pub message: String,
	/// Values logged alongside the error.
	#[serde(default)]
	pub objects: Vec<serde_json::Value>,
	/// `;`-separated frame descriptors.
	#[serde(default)]
	pub stacktrace: String,
}

impl ReportEntry {
	/// Logged objects keyed by their position, as attached to the innermost
	/// frame of a forwarded event.
	pub fn vars(&self) -> BTreeMap<String, serde_json::Value> {
		self.objects
			.iter()
			.enumerate()
			.map(|(i, v)| (i.to_string(), v.clone()))
			.collect()
	}
}

/// A report persisted with its stacktraces already resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReport {
	pub id: ReportId,
	pub commit_id: String,
	pub version: String,
	pub assets: Vec<String>,
	pub entries: Vec<StoredEntry>,
	pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEntry {
	pub date: i64,
	#[serde(rename = "type")]
	pub kind: String,
	pub message: String,
	pub objects: Vec<serde_json::Value>,
	/// Compact `file:name:line:column` frames.
	pub stacktrace: Vec<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_deserialize_client_report() {
		let json = r#"{
			"commitID": "abc123",
			"version": "1.2.0",
			"assets": ["https://cdn.example.com/app.js"],
			"entries": [{
				"date": 1700000000000,
				"type": "TypeError",
				"message": "x is undefined",
				"objects": [{"user": 1}, "extra"],
				"stacktrace": "0:1:9;native:0:0"
			}]
		}"#;
		let report: Report = serde_json::from_str(json).unwrap();
		assert_eq!(report.commit_id, "abc123");
		assert_eq!(report.assets.len(), 1);
		assert_eq!(report.entries[0].kind, "TypeError");
		assert_eq!(report.entries[0].stacktrace, "0:1:9;native:0:0");
	}

	#[test]
	fn test_entry_vars_keyed_by_position() {
		let entry = ReportEntry {
			date: 0,
			kind: "Error".to_string(),
			message: "boom".to_string(),
			objects: vec![serde_json::json!({"a": 1}), serde_json::json!("b")],
			stacktrace: String::new(),
		};
		let vars = entry.vars();
		assert_eq!(vars.len(), 2);
		assert_eq!(vars["0"], serde_json::json!({"a": 1}));
		assert_eq!(vars["1"], serde_json::json!("b"));
	}
}
