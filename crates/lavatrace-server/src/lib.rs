// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Lavatrace stack resolution server.
//!
//! Accepts source map uploads and error reports over HTTP, resolves every
//! compact frame of a report against the uploaded maps, and either stores the
//! resolved report or forwards it to an error tracker.

pub mod api;
pub mod db;
pub mod error;
pub mod routes;
pub mod sentry;

pub use api::{create_app_state, create_router, AppState};
pub use db::{create_pool, run_migrations, SqliteStore};
pub use error::ServerError;
pub use sentry::{DsnError, SentryDsn, SentryEventSink};
