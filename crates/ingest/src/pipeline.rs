// Copyright 2025 Benchsink Contributors
// SPDX-License-Identifier: Apache-2.0

//! Sequential per-document ingestion pipeline.
//!
//! One document per invocation: decode, normalize, assemble, upsert, in
//! that order with no internal concurrency. Assembly is all-or-nothing; a
//! record reaches the store only after every stage succeeded. Batch
//! processing runs each document independently and a failure on one never
//! aborts its siblings.

use benchsink_core::gateway::{DocumentFetcher, NodeInfoProvider, ObjectRef, RecordStore};
use benchsink_core::record::BenchmarkRecord;
use benchsink_core::settings::Settings;
use tracing::{info, warn};

use crate::assemble::assemble_record;
use crate::decode::decode_document;
use crate::error::IngestError;
use crate::normalize::normalize;

/// Outcome of one document in a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    /// The object the document came from.
    pub object: ObjectRef,
    /// Per-document result; failures are isolated to their document.
    pub result: Result<BenchmarkRecord, IngestError>,
}

/// The normalization pipeline over the process-wide collaborators.
///
/// Holds only shared read-only state; every invocation is independent of
/// the previous one.
pub struct Pipeline<'a> {
    settings: &'a Settings,
    nodes: &'a dyn NodeInfoProvider,
    store: &'a dyn RecordStore,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline over the given collaborators.
    pub fn new(
        settings: &'a Settings,
        nodes: &'a dyn NodeInfoProvider,
        store: &'a dyn RecordStore,
    ) -> Self {
        Self {
            settings,
            nodes,
            store,
        }
    }

    /// Ingest one raw document.
    ///
    /// `source_key` is the object-storage key the document arrived under,
    /// when there is one; it seeds the workflow identifier.
    pub async fn ingest_bytes(
        &self,
        bytes: &[u8],
        source_key: Option<&str>,
    ) -> Result<BenchmarkRecord, IngestError> {
        let document = decode_document(bytes)?;
        let fields = normalize(&document, source_key, self.settings)?;
        let record = assemble_record(document, fields, self.nodes.describe());
        self.store.upsert(&record).await?;
        info!(
            workflow_id = %record.workflow_id,
            model_name = %record.model_name,
            benchmark_type = %record.benchmark_type,
            "benchmark record persisted"
        );
        Ok(record)
    }

    /// Fetch one object and ingest it.
    pub async fn ingest_object(
        &self,
        fetcher: &dyn DocumentFetcher,
        object: &ObjectRef,
    ) -> Result<BenchmarkRecord, IngestError> {
        let bytes = fetcher.fetch(object).await?;
        self.ingest_bytes(&bytes, Some(&object.key)).await
    }

    /// Ingest a batch of objects, each independently and sequentially.
    ///
    /// Every object gets its own outcome; an error is logged and recorded
    /// but the remaining objects still run.
    pub async fn ingest_batch(
        &self,
        fetcher: &dyn DocumentFetcher,
        objects: &[ObjectRef],
    ) -> Vec<BatchOutcome> {
        let mut outcomes = Vec::with_capacity(objects.len());
        for object in objects {
            let result = self.ingest_object(fetcher, object).await;
            if let Err(err) = &result {
                warn!(
                    object = %object,
                    stage = err.stage(),
                    error = %err,
                    "document ingestion failed"
                );
            }
            outcomes.push(BatchOutcome {
                object: object.clone(),
                result,
            });
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use benchsink_core::gateway::{FetchError, PersistenceError, StaticNodeInfo};
    use benchsink_core::record::BenchmarkType;
    use benchsink_core::settings::{DEFAULT_REGION, DEFAULT_UTC_OFFSET};

    use crate::error::{DecodeError, NormalizeError};

    struct MemoryStore {
        records: Mutex<Vec<BenchmarkRecord>>,
    }

    impl MemoryStore {
        fn new() -> Self {
            Self {
                records: Mutex::new(Vec::new()),
            }
        }

        fn records(&self) -> Vec<BenchmarkRecord> {
            self.records.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RecordStore for MemoryStore {
        async fn upsert(&self, record: &BenchmarkRecord) -> Result<(), PersistenceError> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    struct RejectingStore;

    #[async_trait]
    impl RecordStore for RejectingStore {
        async fn upsert(&self, _record: &BenchmarkRecord) -> Result<(), PersistenceError> {
            Err(PersistenceError::Write("table unavailable".to_string()))
        }
    }

    struct MapFetcher {
        objects: BTreeMap<String, Vec<u8>>,
    }

    #[async_trait]
    impl DocumentFetcher for MapFetcher {
        async fn fetch(&self, object: &ObjectRef) -> Result<Vec<u8>, FetchError> {
            self.objects
                .get(&object.key)
                .cloned()
                .ok_or_else(|| FetchError::Object {
                    object: object.clone(),
                    message: "no such key".to_string(),
                })
        }
    }

    fn settings() -> Settings {
        Settings::new("benchmark-result", DEFAULT_REGION, DEFAULT_UTC_OFFSET).unwrap()
    }

    fn perf_doc(model: &str) -> Vec<u8> {
        format!(
            r#"{{
                "request_throughput": {{"unit": "requests/sec", "avg": 10.5}},
                "input_config": {{"model_names": ["{model}"]}}
            }}"#
        )
        .into_bytes()
    }

    #[tokio::test]
    async fn test_ingest_bytes_persists_assembled_record() {
        let settings = settings();
        let nodes = StaticNodeInfo::new(settings.hardware.clone());
        let store = MemoryStore::new();
        let pipeline = Pipeline::new(&settings, &nodes, &store);

        let record = pipeline
            .ingest_bytes(&perf_doc("meta-llama/Llama-3-8B"), Some("wf-7/profile.json"))
            .await
            .unwrap();

        assert_eq!(record.workflow_id, "wf-7");
        assert_eq!(record.benchmark_type, BenchmarkType::Inference);
        assert_eq!(store.records(), vec![record]);
    }

    #[tokio::test]
    async fn test_failed_stage_persists_nothing() {
        let settings = settings();
        let nodes = StaticNodeInfo::new(settings.hardware.clone());
        let store = MemoryStore::new();
        let pipeline = Pipeline::new(&settings, &nodes, &store);

        let bad_eval_time = br#"{
            "config_general": {
                "model_config": {"model_name": "openai/gpt-x"},
                "total_evaluation_time_secondes": "not-a-number"
            },
            "results": {}
        }"#;
        let err = pipeline.ingest_bytes(bad_eval_time, None).await.unwrap_err();
        assert!(matches!(
            err,
            IngestError::Normalize(NormalizeError::InvalidEvaluationTime { .. })
        ));
        assert!(store.records().is_empty());
    }

    #[tokio::test]
    async fn test_persistence_failure_is_terminal_for_the_document() {
        let settings = settings();
        let nodes = StaticNodeInfo::new(settings.hardware.clone());
        let pipeline = Pipeline::new(&settings, &nodes, &RejectingStore);

        let err = pipeline
            .ingest_bytes(&perf_doc("meta-llama/Llama-3-8B"), None)
            .await
            .unwrap_err();
        assert_eq!(err.stage(), "persist");
    }

    #[tokio::test]
    async fn test_batch_isolates_document_failures() {
        let settings = settings();
        let nodes = StaticNodeInfo::new(settings.hardware.clone());
        let store = MemoryStore::new();
        let pipeline = Pipeline::new(&settings, &nodes, &store);

        let mut objects = BTreeMap::new();
        objects.insert("wf-1/profile.json".to_string(), perf_doc("meta-llama/Llama-3-8B"));
        objects.insert("wf-2/profile.json".to_string(), b"{broken".to_vec());
        objects.insert("wf-3/profile.json".to_string(), perf_doc("mistralai/Mistral-7B"));
        let fetcher = MapFetcher { objects };

        let refs = vec![
            ObjectRef::new("results", "wf-1/profile.json"),
            ObjectRef::new("results", "wf-2/profile.json"),
            ObjectRef::new("results", "wf-3/profile.json"),
        ];
        let outcomes = pipeline.ingest_batch(&fetcher, &refs).await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].result.is_ok());
        assert!(matches!(
            outcomes[1].result,
            Err(IngestError::Decode(DecodeError::Json(_)))
        ));
        assert!(outcomes[2].result.is_ok());

        let persisted = store.records();
        assert_eq!(persisted.len(), 2);
        assert_eq!(persisted[0].workflow_id, "wf-1");
        assert_eq!(persisted[1].workflow_id, "wf-3");
    }

    #[tokio::test]
    async fn test_batch_reports_fetch_failures_per_object() {
        let settings = settings();
        let nodes = StaticNodeInfo::new(settings.hardware.clone());
        let store = MemoryStore::new();
        let pipeline = Pipeline::new(&settings, &nodes, &store);

        let fetcher = MapFetcher {
            objects: BTreeMap::new(),
        };
        let refs = vec![ObjectRef::new("results", "wf-1/profile.json")];
        let outcomes = pipeline.ingest_batch(&fetcher, &refs).await;

        assert!(matches!(
            outcomes[0].result,
            Err(IngestError::Fetch(FetchError::Object { .. }))
        ));
        assert!(store.records().is_empty());
    }
}
