// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lavatrace_server::{create_app_state, create_router};
use tower_http::{
	cors::{Any, CorsLayer},
	trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
	name = "lavatrace-server",
	about = "Source map stack resolution server",
	version
)]
struct Args {
	/// Path to a TOML config file (defaults to /etc/lavatrace/server.toml)
	#[arg(long, env = "LAVATRACE_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("lavatrace-server {}", env!("CARGO_PKG_VERSION"));
		return Ok(());
	}

	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => lavatrace_server_config::load_config_with_file(path)?,
		None => lavatrace_server_config::load_config()?,
	};

	let json = config.logging.json;
	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(json.then(|| tracing_subscriber::fmt::layer().json()))
		.with((!json).then(tracing_subscriber::fmt::layer))
		.init();

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		output = %config.output.mode,
		"starting lavatrace-server"
	);

	if config.auth.generated {
		tracing::warn!(
			admin_token = %config.auth.admin_token.expose(),
			"LAVATRACE_ADMIN_TOKEN not set; generated a token for this run"
		);
	}

	let pool = lavatrace_server::create_pool(&config.database.url).await?;
	lavatrace_server::run_migrations(&pool).await?;

	let state = create_app_state(&config, pool)?;

	let app = create_router(state)
		.layer(TraceLayer::new_for_http())
		.layer(
			CorsLayer::new()
				.allow_origin(Any)
				.allow_methods(Any)
				.allow_headers(Any),
		);

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}
