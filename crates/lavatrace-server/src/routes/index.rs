// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

/// GET / - Identify the service.
pub async fn index() -> String {
	format!("lavatrace {}", env!("CARGO_PKG_VERSION"))
}
