// Copyright 2025 Benchsink Contributors
// SPDX-License-Identifier: Apache-2.0

//! The benchsink normalization pipeline.
//!
//! Raw benchmark-result documents arrive as JSON whose shape varies by
//! producer: fixed metric blocks interleaved with dynamically-named keys
//! such as per-GPU telemetry channels or per-task accuracy metrics. This
//! crate decodes them into typed shapes, derives the canonical scalar
//! fields, and assembles the producer-independent record the store
//! persists.
//!
//! # Modules
//!
//! - [`decode`] - Structural probing and typed decoding of raw documents
//! - [`normalize`] - Pure derivation of canonical scalar fields
//! - [`assemble`] - Pure construction of the canonical record
//! - [`pipeline`] - Sequential per-document and batch orchestration
//! - [`error`] - Stage-tagged error types

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod assemble;
pub mod decode;
pub mod error;
pub mod normalize;
pub mod pipeline;

pub use decode::{decode_document, DecodedDocument};
pub use error::{DecodeError, IngestError, NormalizeError};
pub use pipeline::{BatchOutcome, Pipeline};
