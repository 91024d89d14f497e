// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Admin token used to authorize source map uploads.

use serde::Deserialize;
use uuid::Uuid;

use crate::secret::{Secret, SecretString};

/// Auth configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct AuthConfig {
	pub admin_token: SecretString,
	/// The token was generated at startup because none was configured.
	pub generated: bool,
}

impl Default for AuthConfig {
	fn default() -> Self {
		AuthConfigLayer::default().finalize()
	}
}

/// Auth configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub admin_token: Option<SecretString>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.admin_token.is_some() {
			self.admin_token = other.admin_token;
		}
	}

	pub fn finalize(self) -> AuthConfig {
		match self.admin_token {
			Some(admin_token) => AuthConfig {
				admin_token,
				generated: false,
			},
			None => AuthConfig {
				admin_token: Secret::new(Uuid::new_v4().to_string()),
				generated: true,
			},
		}
	}
}
