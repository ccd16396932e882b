// Copyright 2025 Benchsink Contributors
// SPDX-License-Identifier: Apache-2.0

//! Field normalizer: canonical scalar fields from a decoded document.
//!
//! Producers disagree on naming and formatting conventions, so everything
//! identity-like is derived here: model-name canonicalization, dataset
//! discovery, workflow-identifier derivation and timestamp assignment.
//! Every function is pure apart from [`IngestStamp::capture`] (one wall
//! clock read per document) and [`derive_workflow_id`] (which synthesizes a
//! fresh identifier when no source key is available).

use std::collections::BTreeMap;

use benchsink_core::record::BenchmarkType;
use benchsink_core::settings::Settings;
use chrono::{DateTime, FixedOffset, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::decode::DecodedDocument;
use crate::error::NormalizeError;

/// Task-configuration key naming the dataset backing a task.
const DATASET_KEY: &str = "hf_repo";

/// Canonical scalar fields derived from one decoded document.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFields {
    /// Partition key for the benchmark run.
    pub workflow_id: String,
    /// Ingestion time in seconds since epoch.
    pub timestamp: i64,
    /// Fixed-offset rendering of the ingestion time.
    pub datetime: String,
    /// Canonicalized model name; empty for telemetry-only documents.
    pub model_name: String,
    /// Discovered dataset name; empty when no task supplies one.
    pub dataset_name: String,
    /// Benchmark kind implied by the document family.
    pub benchmark_type: BenchmarkType,
    /// Producer tag; empty when not applicable.
    pub framework: String,
    /// Parsed total evaluation time; zero outside the accuracy family.
    pub total_evaluation_time: f64,
}

/// Ingestion-time timestamp pair: epoch seconds for the sort key and a
/// fixed-offset RFC 3339 rendering for display.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestStamp {
    /// Seconds since epoch.
    pub timestamp: i64,
    /// RFC 3339 rendering in the configured offset.
    pub datetime: String,
}

impl IngestStamp {
    /// Capture the wall clock now.
    pub fn capture(offset: &FixedOffset) -> Self {
        Self::at(Utc::now(), offset)
    }

    /// Stamp a known instant. Timestamps are always assigned at ingestion,
    /// never trusted from the source document.
    pub fn at(instant: DateTime<Utc>, offset: &FixedOffset) -> Self {
        Self {
            timestamp: instant.timestamp(),
            datetime: instant.with_timezone(offset).to_rfc3339(),
        }
    }
}

/// Collapse one accidental doubled path prefix in a model name.
///
/// `openai/openai/gpt-x` becomes `openai/gpt-x`; exactly one duplicate
/// occurrence is removed and every other name is left untouched.
pub fn canonical_model_name(name: &str) -> String {
    if let Some((prefix, rest)) = name.split_once('/') {
        if let Some(tail) = rest.strip_prefix(prefix).and_then(|r| r.strip_prefix('/')) {
            return format!("{prefix}/{tail}");
        }
    }
    name.to_string()
}

/// Discover the dataset name from the per-task configuration mapping.
///
/// Tasks are scanned in iteration order and the first string `hf_repo`
/// found wins; callers must not depend on which task supplies the name
/// when several list different identifiers. Empty when no task does.
pub fn discover_dataset(config_tasks: &BTreeMap<String, Value>) -> String {
    config_tasks
        .values()
        .find_map(|task| task.get(DATASET_KEY).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}

/// Derive the workflow identifier from the source object key.
///
/// The segment before the first `/` names the workflow. Without a source
/// key, or without a separator in it, a fresh UUID is synthesized; the
/// result is never empty.
pub fn derive_workflow_id(source_key: Option<&str>) -> String {
    if let Some(key) = source_key {
        if let Some((workflow, _)) = key.split_once('/') {
            if !workflow.is_empty() {
                return workflow.to_string();
            }
        }
    }
    Uuid::new_v4().to_string()
}

/// Parse the producer's numeric-as-string evaluation time.
///
/// The field is optional, so an absent value is 0.0; a present but
/// unparseable value is fatal for the document, never a silent zero.
pub fn parse_total_evaluation_time(raw: Option<&str>) -> Result<f64, NormalizeError> {
    match raw {
        None => Ok(0.0),
        Some(value) => value.trim().parse::<f64>().map_err(|source| {
            NormalizeError::InvalidEvaluationTime {
                value: value.to_string(),
                source,
            }
        }),
    }
}

/// Producer tag for the framework attribute; empty when not applicable.
pub fn framework_tag(document: &DecodedDocument) -> &'static str {
    match document {
        DecodedDocument::Accuracy(_) => "Lighteval",
        DecodedDocument::Performance(_) | DecodedDocument::Telemetry(_) => "",
    }
}

/// Derive every canonical scalar field for one decoded document.
pub fn normalize(
    document: &DecodedDocument,
    source_key: Option<&str>,
    settings: &Settings,
) -> Result<NormalizedFields, NormalizeError> {
    let stamp = IngestStamp::capture(&settings.display_offset);

    let (model_name, benchmark_type) = match document {
        DecodedDocument::Performance(doc) => (
            canonical_model_name(
                doc.input_config.model_names.first().map_or("", String::as_str),
            ),
            BenchmarkType::Inference,
        ),
        DecodedDocument::Accuracy(doc) => (
            canonical_model_name(&doc.config_general.model_config.model_name),
            BenchmarkType::Accuracy,
        ),
        DecodedDocument::Telemetry(_) => (String::new(), BenchmarkType::Inference),
    };

    let dataset_name = match document {
        DecodedDocument::Accuracy(doc) => discover_dataset(&doc.config_tasks),
        _ => String::new(),
    };

    let total_evaluation_time = match document {
        DecodedDocument::Accuracy(doc) => parse_total_evaluation_time(
            doc.config_general.total_evaluation_time_secondes.as_deref(),
        )?,
        _ => 0.0,
    };

    Ok(NormalizedFields {
        workflow_id: derive_workflow_id(source_key),
        timestamp: stamp.timestamp,
        datetime: stamp.datetime,
        model_name,
        dataset_name,
        benchmark_type,
        framework: framework_tag(document).to_string(),
        total_evaluation_time,
    })
}
