// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Redacting wrapper for credentials held in configuration.
//!
//! [`Secret`] prints as `[REDACTED]` through `Debug`, `Display` and serde, and
//! is zeroized on drop. The value is only reachable through [`Secret::expose`].

use std::path::PathBuf;
use std::{env, fmt, fs};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

use crate::error::ConfigError;

/// Placeholder printed instead of a secret value.
pub const REDACTED: &str = "[REDACTED]";

#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Secret<T>
where
	T: Zeroize,
{
	inner: T,
}

pub type SecretString = Secret<String>;

impl<T> Secret<T>
where
	T: Zeroize,
{
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	pub fn expose(&self) -> &T {
		&self.inner
	}
}

impl<T> Clone for Secret<T>
where
	T: Zeroize + Clone,
{
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<T> fmt::Debug for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Secret").field(&REDACTED).finish()
	}
}

impl<T> fmt::Display for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<T> PartialEq for Secret<T>
where
	T: Zeroize + PartialEq,
{
	fn eq(&self, other: &Self) -> bool {
		self.inner == other.inner
	}
}

impl<T> Eq for Secret<T> where T: Zeroize + Eq {}

impl<T> Serialize for Secret<T>
where
	T: Zeroize,
{
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(REDACTED)
	}
}

impl<'de, T> Deserialize<'de> for Secret<T>
where
	T: Deserialize<'de> + Zeroize,
{
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		T::deserialize(deserializer).map(Secret::new)
	}
}

/// Load a secret from `VAR`, or from the file named by `VAR_FILE`.
///
/// `VAR_FILE` wins when both are set. One trailing newline is stripped from
/// file contents.
pub fn load_secret_env(var: &str) -> Result<Option<SecretString>, ConfigError> {
	let file_var = format!("{var}_FILE");

	if let Ok(path) = env::var(&file_var) {
		if path.is_empty() {
			return Err(ConfigError::Secret(format!("{file_var} is set but empty")));
		}

		let path = PathBuf::from(path);
		let content = fs::read_to_string(&path).map_err(|e| ConfigError::FileRead {
			path: path.clone(),
			source: e,
		})?;
		let value = content.strip_suffix('\n').unwrap_or(&content).to_string();
		return Ok(Some(Secret::new(value)));
	}

	Ok(env::var(var)
		.ok()
		.filter(|v| !v.is_empty())
		.map(Secret::new))
}
