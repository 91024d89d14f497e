// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for the lavatrace server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`LAVATRACE_*`)
//!
//! # Usage
//!
//! ```ignore
//! use lavatrace_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod secret;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use secret::{load_secret_env, Secret, SecretString, REDACTED};
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub auth: AuthConfig,
	pub cache: CacheConfig,
	pub output: OutputConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`LAVATRACE_*`)
/// 2. Config file (`/etc/lavatrace/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize();
	let auth = layer.auth.unwrap_or_default().finalize();
	let cache = layer.cache.unwrap_or_default().finalize();
	let output = layer.output.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	validate_config(&output)?;

	info!(
		host = %http.host,
		port = http.port,
		max_body_bytes = ?http.max_body_bytes,
		database = %database.url,
		output = %output.mode,
		exact_capacity = ?cache.exact_capacity,
		index_capacity = ?cache.index_capacity,
		admin_token_generated = auth.generated,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		database,
		auth,
		cache,
		output,
		logging,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(output: &OutputConfig) -> Result<(), ConfigError> {
	if output.mode == OutputMode::Event && output.sentry_dsn.is_none() {
		return Err(ConfigError::Validation(
			"LAVATRACE_OUTPUT=event requires LAVATRACE_SENTRY_DSN to be set".to_string(),
		));
	}

	Ok(())
}
