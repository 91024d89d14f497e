// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map decoding and lookup for lavatrace.
//!
//! This crate provides:
//! - Decoding of JavaScript source maps (v3) into flat mapping entries
//! - An immutable per-map index keyed by generated line and column
//! - Same-line column fallback matching standard source map semantics
//!
//! # Example
//!
//! ```
//! use lavatrace_sourcemap::{decode_source_map, MapIndex};
//!
//! let body = r#"{
//!     "version": 3,
//!     "sources": ["src/app.ts"],
//!     "names": ["main"],
//!     "mappings": "AAAAA"
//! }"#;
//!
//! let mappings = decode_source_map(body).unwrap();
//! let index = MapIndex::build(mappings);
//!
//! let mapping = index.lookup(1, 40).unwrap();
//! assert_eq!(&*mapping.original_file, "src/app.ts");
//! assert_eq!(mapping.original_name.as_deref(), Some("main"));
//! ```

pub mod decoder;
pub mod error;
pub mod index;
pub mod vlq;

pub use decoder::{decode_source_map, DecodedMapping};
pub use error::{LookupError, MapFormatError};
pub use index::MapIndex;
pub use vlq::{decode_vlq_segment, split_segments};
