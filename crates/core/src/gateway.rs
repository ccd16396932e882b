// Copyright 2025 Benchsink Contributors
// SPDX-License-Identifier: Apache-2.0

//! Boundary interfaces the normalization pipeline consumes.
//!
//! The pipeline itself performs no I/O: raw bytes come in through a
//! [`DocumentFetcher`], the assembled record leaves through a
//! [`RecordStore`], and hardware identity comes from a
//! [`NodeInfoProvider`]. Concrete implementations live at the edges of the
//! workspace; the error types here keep provider-specific error types out
//! of the core.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::record::{BenchmarkRecord, HardwareDescriptor};

/// Reference to one raw result document in object storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    /// Bucket holding the object.
    pub bucket: String,
    /// Object key within the bucket.
    pub key: String,
}

impl ObjectRef {
    /// Create a reference from bucket and key.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parse an `s3://bucket/key` URI.
    pub fn from_uri(uri: &str) -> Result<Self, FetchError> {
        let invalid = || FetchError::InvalidUri(uri.to_string());
        let rest = uri.strip_prefix("s3://").ok_or_else(invalid)?;
        let (bucket, key) = rest.split_once('/').ok_or_else(invalid)?;
        if bucket.is_empty() || key.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(bucket, key))
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Raw document bytes are unavailable.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A local file could not be read.
    #[error("failed to read `{path}`: {source}")]
    File {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// An object-storage fetch failed.
    #[error("failed to fetch {object}: {message}")]
    Object {
        /// Object that failed to fetch.
        object: ObjectRef,
        /// Provider-reported failure.
        message: String,
    },
    /// An object URI did not parse.
    #[error("invalid object URI `{0}`: expected s3://bucket/key")]
    InvalidUri(String),
}

/// A store write failed.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The record could not be marshaled into store attributes.
    #[error("failed to marshal record for storage: {0}")]
    Marshal(String),
    /// The store rejected the write.
    #[error("store write failed: {0}")]
    Write(String),
}

/// Durable store for canonical benchmark records.
///
/// `(workflow_id, timestamp)` is the natural key and `upsert` is a blind
/// overwrite: no read-modify-write, no optimistic concurrency. Each
/// ingestion assigns a fresh timestamp, which makes key collisions unlikely
/// rather than structurally impossible; two ingestions of the same workflow
/// within one wall-clock second would overwrite each other.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Write one record, overwriting any record under the same key.
    async fn upsert(&self, record: &BenchmarkRecord) -> Result<(), PersistenceError>;
}

/// Supplies the raw bytes of one result document per invocation.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch the raw bytes of `object`.
    async fn fetch(&self, object: &ObjectRef) -> Result<Vec<u8>, FetchError>;
}

/// Supplies the hardware descriptor for the nodes a benchmark ran on.
///
/// A cluster-backed implementation would query node metadata (e.g. the
/// `nvidia.com/gpu.product` label); [`StaticNodeInfo`] is the placeholder
/// used until that lands.
pub trait NodeInfoProvider: Send + Sync {
    /// Describe the hardware of the benchmark environment.
    fn describe(&self) -> HardwareDescriptor;
}

/// [`NodeInfoProvider`] that returns a fixed descriptor.
#[derive(Debug, Clone)]
pub struct StaticNodeInfo {
    hardware: HardwareDescriptor,
}

impl StaticNodeInfo {
    /// Wrap a fixed hardware descriptor.
    pub fn new(hardware: HardwareDescriptor) -> Self {
        Self { hardware }
    }
}

impl NodeInfoProvider for StaticNodeInfo {
    fn describe(&self) -> HardwareDescriptor {
        self.hardware.clone()
    }
}
