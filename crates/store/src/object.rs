// Copyright 2025 Benchsink Contributors
// SPDX-License-Identifier: Apache-2.0

//! S3 document fetcher.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;
use benchsink_core::gateway::{DocumentFetcher, FetchError, ObjectRef};
use benchsink_core::settings::Settings;
use tracing::debug;

/// [`DocumentFetcher`] backed by S3.
#[derive(Debug, Clone)]
pub struct S3Fetcher {
    client: Client,
}

impl S3Fetcher {
    /// Wrap an existing client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a fetcher from the process settings, loading the shared AWS
    /// configuration for the configured region.
    pub async fn connect(settings: &Settings) -> Self {
        let config = crate::load_aws_config(settings).await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl DocumentFetcher for S3Fetcher {
    async fn fetch(&self, object: &ObjectRef) -> Result<Vec<u8>, FetchError> {
        let output = self
            .client
            .get_object()
            .bucket(&object.bucket)
            .key(&object.key)
            .send()
            .await
            .map_err(|err| FetchError::Object {
                object: object.clone(),
                message: DisplayErrorContext(&err).to_string(),
            })?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|err| FetchError::Object {
                object: object.clone(),
                message: err.to_string(),
            })?;

        let bytes = body.into_bytes().to_vec();
        debug!(object = %object, size_bytes = bytes.len(), "document fetched");
        Ok(bytes)
    }
}
