// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resolution of parsed frames against a report's assets.

use tracing::instrument;

use lavatrace_core::{
	map_key_for_asset, parse_stacktrace, FormatError, Frame, ResolvedFrame, ResolvedPosition,
};

use crate::error::Result;
use crate::resolver::PositionResolver;

/// Resolve one frame.
///
/// Sentinel frames resolve without touching the resolver. Asset frames are
/// looked up in the source map uploaded for the asset's base name.
pub async fn resolve_frame(
	resolver: &dyn PositionResolver,
	commit: &str,
	assets: &[String],
	frame: Frame,
) -> Result<ResolvedFrame> {
	let (index, line, column) = match frame {
		Frame::Asset {
			index,
			line,
			column,
		} => (index, line, column),
		Frame::Unknown { line, column } => {
			return Ok(sentinel(frame, ResolvedPosition::unknown_origin(line, column)));
		}
		Frame::Native { line, column } => {
			return Ok(sentinel(frame, ResolvedPosition::native(line, column)));
		}
	};

	let asset = assets.get(index).ok_or(FormatError::AssetOutOfRange {
		index,
		assets: assets.len(),
	})?;
	let map_key = map_key_for_asset(asset);
	let position = resolver.resolve(commit, &map_key, line, column).await?;

	Ok(ResolvedFrame {
		frame,
		position,
		abs_path: Some(asset.clone()),
	})
}

fn sentinel(frame: Frame, position: ResolvedPosition) -> ResolvedFrame {
	ResolvedFrame {
		frame,
		position,
		abs_path: None,
	}
}

/// Parse and resolve a `;`-separated stacktrace, keeping frame order.
#[instrument(skip(resolver, assets), fields(commit = %commit))]
pub async fn resolve_stacktrace(
	resolver: &dyn PositionResolver,
	commit: &str,
	assets: &[String],
	stacktrace: &str,
) -> Result<Vec<ResolvedFrame>> {
	let frames = parse_stacktrace(stacktrace)?;
	let mut resolved = Vec::with_capacity(frames.len());
	for frame in frames {
		resolved.push(resolve_frame(resolver, commit, assets, frame).await?);
	}
	Ok(resolved)
}
