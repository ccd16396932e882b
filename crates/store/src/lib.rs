// Copyright 2025 Benchsink Contributors
// SPDX-License-Identifier: Apache-2.0

//! AWS-backed implementations of the benchsink boundary traits.
//!
//! [`DynamoStore`] persists canonical records with a blind `PutItem`
//! overwrite and [`S3Fetcher`] supplies raw document bytes from object
//! storage. Both are thin edges: every normalization decision lives in
//! `benchsink-ingest`, and the rest of the workspace only sees the traits
//! from `benchsink-core`.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod dynamo;
pub mod object;

pub use dynamo::DynamoStore;
pub use object::S3Fetcher;

use benchsink_core::settings::Settings;

/// Load the shared AWS SDK configuration for the configured region.
pub async fn load_aws_config(settings: &Settings) -> aws_config::SdkConfig {
    aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(settings.region.clone()))
        .load()
        .await
}
