// Copyright 2025 Benchsink Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core types for the benchsink ingestion system.
//!
//! This crate defines the canonical benchmark record every producer-specific
//! result document is normalized into, the process-wide configuration read
//! once at startup, and the boundary traits the normalization pipeline
//! consumes (record store, document fetcher, node-information provider).
//!
//! # Modules
//!
//! - [`record`] - The canonical `BenchmarkRecord` and its metric payloads
//! - [`gateway`] - Boundary traits and their error types
//! - [`settings`] - Read-once process configuration

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod gateway;
pub mod record;
pub mod settings;

pub use gateway::{DocumentFetcher, NodeInfoProvider, ObjectRef, RecordStore};
pub use record::BenchmarkRecord;
pub use settings::Settings;
