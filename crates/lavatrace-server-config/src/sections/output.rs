// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Where resolved reports go.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::secret::SecretString;

/// Output strategy for resolved reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
	/// Store reports with compact stacktraces in the database.
	#[default]
	Persist,
	/// Forward reports as events to an external error tracker.
	Event,
}

impl fmt::Display for OutputMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OutputMode::Persist => f.write_str("persist"),
			OutputMode::Event => f.write_str("event"),
		}
	}
}

impl FromStr for OutputMode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"persist" => Ok(OutputMode::Persist),
			"event" => Ok(OutputMode::Event),
			other => Err(format!("unknown output mode '{other}', expected persist or event")),
		}
	}
}

/// Output configuration (runtime, fully resolved).
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
	pub mode: OutputMode,
	pub sentry_dsn: Option<SecretString>,
}

/// Output configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfigLayer {
	#[serde(default)]
	pub mode: Option<OutputMode>,
	#[serde(default)]
	pub sentry_dsn: Option<SecretString>,
}

impl OutputConfigLayer {
	pub fn merge(&mut self, other: OutputConfigLayer) {
		if other.mode.is_some() {
			self.mode = other.mode;
		}
		if other.sentry_dsn.is_some() {
			self.sentry_dsn = other.sentry_dsn;
		}
	}

	pub fn finalize(self) -> OutputConfig {
		OutputConfig {
			mode: self.mode.unwrap_or_default(),
			sentry_dsn: self.sentry_dsn,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults_to_persist() {
		let config = OutputConfigLayer::default().finalize();
		assert_eq!(config.mode, OutputMode::Persist);
		assert!(config.sentry_dsn.is_none());
	}

	#[test]
	fn test_parse_mode() {
		assert_eq!("EVENT".parse::<OutputMode>(), Ok(OutputMode::Event));
		assert_eq!("persist".parse::<OutputMode>(), Ok(OutputMode::Persist));
		assert!("forward".parse::<OutputMode>().is_err());
	}

	#[test]
	fn test_deserialize_from_toml() {
		let layer: OutputConfigLayer = toml::from_str(
			r#"
mode = "event"
sentry_dsn = "https://key@sentry.example.com/42"
"#,
		)
		.unwrap();
		assert_eq!(layer.mode, Some(OutputMode::Event));
		assert_eq!(
			layer.sentry_dsn.unwrap().expose(),
			"https://key@sentry.example.com/42"
		);
	}
}
