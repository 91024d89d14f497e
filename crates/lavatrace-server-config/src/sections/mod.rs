// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod auth;
mod cache;
mod database;
mod http;
mod logging;
mod output;

pub use auth::{AuthConfig, AuthConfigLayer};
pub use cache::CacheConfigLayer;
pub use lavatrace_resolve::CacheConfig;
pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use output::{OutputConfig, OutputConfigLayer, OutputMode};
