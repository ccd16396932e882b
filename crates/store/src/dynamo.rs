// Copyright 2025 Benchsink Contributors
// SPDX-License-Identifier: Apache-2.0

//! DynamoDB record store.
//!
//! Canonical record fields map onto item attributes exactly as the record
//! serializes: nested structures become nested attributes and dynamic
//! mappings become nested maps. `workflow_id` is the partition key and
//! `timestamp` the sort key; `PutItem` gives the blind-overwrite upsert the
//! pipeline relies on.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use benchsink_core::gateway::{PersistenceError, RecordStore};
use benchsink_core::record::BenchmarkRecord;
use benchsink_core::settings::Settings;
use tracing::debug;

/// [`RecordStore`] backed by a DynamoDB table.
#[derive(Debug, Clone)]
pub struct DynamoStore {
    client: Client,
    table_name: String,
}

impl DynamoStore {
    /// Wrap an existing client and target table.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Build a store from the process settings, loading the shared AWS
    /// configuration for the configured region.
    pub async fn connect(settings: &Settings) -> Self {
        let config = crate::load_aws_config(settings).await;
        Self::new(Client::new(&config), settings.table_name.clone())
    }

    /// Target table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl RecordStore for DynamoStore {
    async fn upsert(&self, record: &BenchmarkRecord) -> Result<(), PersistenceError> {
        let item: HashMap<String, AttributeValue> =
            serde_dynamo::aws_sdk_dynamodb_1::to_item(record)
                .map_err(|err| PersistenceError::Marshal(err.to_string()))?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|err| PersistenceError::Write(DisplayErrorContext(&err).to_string()))?;

        debug!(
            table = %self.table_name,
            workflow_id = %record.workflow_id,
            timestamp = record.timestamp,
            "record upserted"
        );
        Ok(())
    }
}
