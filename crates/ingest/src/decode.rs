// Copyright 2025 Benchsink Contributors
// SPDX-License-Identifier: Apache-2.0

//! Schema decoder: raw JSON bytes into one of the supported document shapes.
//!
//! The three families share no discriminator field and overlap in field
//! names, so the decoder parses to a [`serde_json::Value`] once, probes the
//! top-level keys to select a family, and only then commits to a typed
//! shape. Optional blocks and percentile fields decode to zero-valued
//! defaults; a missing identity field is fatal for the document.

use std::collections::BTreeMap;

use benchsink_core::record::{GenerationParameters, PerformanceProfile, TaskResults, TelemetryStats};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{DecodeError, DocumentFamily};

/// Decoded inference performance profile.
#[derive(Debug, Clone, Deserialize)]
pub struct PerformanceDocument {
    /// Fixed throughput/latency/sequence-length metrics, flattened at the
    /// document's top level by the producer.
    #[serde(flatten)]
    pub profile: PerformanceProfile,
    /// Input configuration carrying model identity.
    pub input_config: InputConfig,
    /// Telemetry captured alongside the profile, when present.
    #[serde(default)]
    pub telemetry_stats: TelemetryStats,
}

/// `input_config` block of a performance profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputConfig {
    /// Models exercised by the run; the first entry is the record identity.
    #[serde(default)]
    pub model_names: Vec<String>,
}

/// Decoded accuracy evaluation report.
#[derive(Debug, Clone, Deserialize)]
pub struct AccuracyDocument {
    /// General run configuration.
    pub config_general: ConfigGeneral,
    /// Per-task results keyed by dynamic task name.
    #[serde(default)]
    pub results: TaskResults,
    /// Free-form per-task configuration keyed by dynamic task name.
    #[serde(default)]
    pub config_tasks: BTreeMap<String, Value>,
}

/// `config_general` block of an accuracy report.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigGeneral {
    /// Model configuration block.
    pub model_config: ModelConfig,
    /// Total evaluation time as a numeric string. Kept raw here; the
    /// normalizer performs the explicit parse so an unparseable value
    /// surfaces as a normalization failure.
    #[serde(default)]
    pub total_evaluation_time_secondes: Option<String>,
}

/// `model_config` block of an accuracy report.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Model identity; required.
    pub model_name: String,
    /// Sampling hyperparameters; zero-valued when the producer omits them.
    #[serde(default)]
    pub generation_parameters: GenerationParameters,
}

/// Decoded standalone GPU telemetry snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelemetryDocument {
    /// Named telemetry channels.
    #[serde(default)]
    pub telemetry_stats: TelemetryStats,
}

/// A decoded document, tagged by the family the probe selected.
#[derive(Debug, Clone)]
pub enum DecodedDocument {
    /// Inference performance profile.
    Performance(PerformanceDocument),
    /// Accuracy evaluation report.
    Accuracy(AccuracyDocument),
    /// GPU telemetry snapshot.
    Telemetry(TelemetryDocument),
}

impl DecodedDocument {
    /// Family the structural probe selected.
    pub fn family(&self) -> DocumentFamily {
        match self {
            DecodedDocument::Performance(_) => DocumentFamily::Performance,
            DecodedDocument::Accuracy(_) => DocumentFamily::Accuracy,
            DecodedDocument::Telemetry(_) => DocumentFamily::Telemetry,
        }
    }
}

/// Shape the top-level keys probe into.
enum Probe {
    Accuracy,
    Performance,
    WrappedTelemetry,
    BareTelemetry,
}

fn probe_family(root: &serde_json::Map<String, Value>) -> Option<Probe> {
    if root.contains_key("config_general") || root.contains_key("results") {
        return Some(Probe::Accuracy);
    }
    if root.contains_key("input_config")
        || root.contains_key("request_throughput")
        || root.contains_key("request_latency")
    {
        return Some(Probe::Performance);
    }
    if root.contains_key("telemetry_stats") {
        return Some(Probe::WrappedTelemetry);
    }
    if root.contains_key("gpu_power_usage") || root.contains_key("gpu_utilization") {
        return Some(Probe::BareTelemetry);
    }
    None
}

/// Decode one raw result document into its typed shape.
pub fn decode_document(bytes: &[u8]) -> Result<DecodedDocument, DecodeError> {
    let value: Value = serde_json::from_slice(bytes)?;
    let probe = match value.as_object() {
        Some(root) => probe_family(root).ok_or(DecodeError::UnrecognizedShape)?,
        None => return Err(DecodeError::NotAnObject),
    };

    match probe {
        Probe::Accuracy => {
            let doc: AccuracyDocument =
                serde_json::from_value(value).map_err(|source| DecodeError::Malformed {
                    family: DocumentFamily::Accuracy,
                    source,
                })?;
            if doc.config_general.model_config.model_name.is_empty() {
                return Err(DecodeError::MissingField {
                    path: "config_general.model_config.model_name",
                });
            }
            Ok(DecodedDocument::Accuracy(doc))
        }
        Probe::Performance => {
            let doc: PerformanceDocument =
                serde_json::from_value(value).map_err(|source| DecodeError::Malformed {
                    family: DocumentFamily::Performance,
                    source,
                })?;
            if doc.input_config.model_names.first().map_or(true, String::is_empty) {
                return Err(DecodeError::MissingField {
                    path: "input_config.model_names",
                });
            }
            Ok(DecodedDocument::Performance(doc))
        }
        Probe::WrappedTelemetry => {
            let doc: TelemetryDocument =
                serde_json::from_value(value).map_err(|source| DecodeError::Malformed {
                    family: DocumentFamily::Telemetry,
                    source,
                })?;
            Ok(DecodedDocument::Telemetry(doc))
        }
        Probe::BareTelemetry => {
            let telemetry_stats: TelemetryStats =
                serde_json::from_value(value).map_err(|source| DecodeError::Malformed {
                    family: DocumentFamily::Telemetry,
                    source,
                })?;
            Ok(DecodedDocument::Telemetry(TelemetryDocument { telemetry_stats }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERF_DOC: &str = r#"{
        "request_throughput": {"unit": "requests/sec", "avg": 10.5},
        "request_latency": {"unit": "ms", "avg": 95.2, "p50": 90.0, "p99": 180.75},
        "request_count": {"unit": "count", "avg": 512.0},
        "time_to_first_token": {"unit": "ms", "avg": 31.4, "p50": 29.0},
        "inter_token_latency": {"unit": "ms", "avg": 8.6},
        "output_token_throughput": {"unit": "tokens/sec", "avg": 1420.0},
        "output_sequence_length": {"unit": "tokens", "avg": 204.0, "min": 12.0, "max": 998.0},
        "input_sequence_length": {"unit": "tokens", "avg": 550.0},
        "input_config": {"model_names": ["meta-llama/Llama-3-8B"]},
        "telemetry_stats": {
            "gpu_power_usage": {"unit": "W", "gpu0": {"avg": 250.0}, "gpu1": {"avg": 245.5}},
            "gpu_utilization": {"unit": "%", "gpu0": {"avg": 97.3}}
        }
    }"#;

    const ACCURACY_DOC: &str = r#"{
        "config_general": {
            "model_config": {
                "model_name": "openai/openai/gpt-x",
                "generation_parameters": {"temperature": 0.7, "top_p": 0.9, "max_new_tokens": 2048}
            },
            "total_evaluation_time_secondes": "1843.52"
        },
        "results": {
            "lighteval|gsm8k|0": {"acc": 0.81, "acc_stderr": 0.02},
            "lighteval|humaneval|0": {"pass@k_with_k&n": 0.42, "pass@k_with_k&n_stderr": 0.013}
        },
        "config_tasks": {
            "lighteval|gsm8k|0": {"hf_repo": "openai/gsm8k", "metric": "acc"}
        }
    }"#;

    #[test]
    fn test_decode_selects_performance_family() {
        let doc = decode_document(PERF_DOC.as_bytes()).unwrap();
        let DecodedDocument::Performance(perf) = doc else {
            panic!("expected performance family");
        };
        assert_eq!(perf.input_config.model_names[0], "meta-llama/Llama-3-8B");
        assert_eq!(perf.profile.request_throughput.avg, 10.5);
        assert_eq!(perf.telemetry_stats.gpu_power_usage.unit, "W");
        assert_eq!(perf.telemetry_stats.gpu_power_usage.per_device.len(), 2);
    }

    #[test]
    fn test_decode_selects_accuracy_family() {
        let doc = decode_document(ACCURACY_DOC.as_bytes()).unwrap();
        assert_eq!(doc.family(), DocumentFamily::Accuracy);
        let DecodedDocument::Accuracy(acc) = doc else {
            panic!("expected accuracy family");
        };
        assert_eq!(acc.config_general.model_config.model_name, "openai/openai/gpt-x");
        assert_eq!(acc.results.len(), 2);
        assert_eq!(
            acc.config_general.total_evaluation_time_secondes.as_deref(),
            Some("1843.52")
        );
    }

    #[test]
    fn test_decode_selects_telemetry_family_wrapped_and_bare() {
        let wrapped = r#"{"telemetry_stats": {"gpu_power_usage": {"unit": "W", "gpu0": {"avg": 240.0}}}}"#;
        let doc = decode_document(wrapped.as_bytes()).unwrap();
        let DecodedDocument::Telemetry(t) = doc else {
            panic!("expected telemetry family");
        };
        assert_eq!(t.telemetry_stats.gpu_power_usage.per_device["gpu0"].avg, 240.0);

        let bare = r#"{"gpu_utilization": {"unit": "%", "gpu0": {"avg": 88.0}, "gpu1": {"avg": 91.0}}}"#;
        let doc = decode_document(bare.as_bytes()).unwrap();
        let DecodedDocument::Telemetry(t) = doc else {
            panic!("expected telemetry family");
        };
        assert_eq!(t.telemetry_stats.gpu_utilization.unit, "%");
        assert_eq!(t.telemetry_stats.gpu_utilization.per_device.len(), 2);
        assert!(t.telemetry_stats.gpu_power_usage.per_device.is_empty());
    }

    #[test]
    fn test_decode_defaults_absent_metrics_and_percentiles() {
        let minimal = r#"{
            "request_throughput": {"unit": "requests/sec", "avg": 3.0},
            "input_config": {"model_names": ["mistralai/Mistral-7B"]}
        }"#;
        let DecodedDocument::Performance(perf) = decode_document(minimal.as_bytes()).unwrap()
        else {
            panic!("expected performance family");
        };
        assert_eq!(perf.profile.request_latency.p99, 0.0);
        assert_eq!(perf.profile.time_to_second_token.avg, 0.0);
        assert!(perf.telemetry_stats.gpu_power_usage.per_device.is_empty());
    }

    #[test]
    fn test_decode_requires_model_identity() {
        let no_models = r#"{"request_throughput": {"avg": 1.0}, "input_config": {"model_names": []}}"#;
        let err = decode_document(no_models.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MissingField { path: "input_config.model_names" }
        ));

        let no_input_config = r#"{"request_throughput": {"avg": 1.0}}"#;
        let err = decode_document(no_input_config.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Malformed { family: DocumentFamily::Performance, .. }
        ));

        let no_model_name = r#"{"config_general": {"model_config": {"model_name": ""}}, "results": {}}"#;
        let err = decode_document(no_model_name.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { .. }));
    }

    #[test]
    fn test_decode_rejects_unrecognized_shapes() {
        let err = decode_document(br#"{"hello": "world"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnrecognizedShape));

        let err = decode_document(br#"[1, 2, 3]"#).unwrap_err();
        assert!(matches!(err, DecodeError::NotAnObject));

        let err = decode_document(b"not json at all").unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn test_decode_round_trips_scalar_metrics_exactly() {
        let DecodedDocument::Performance(perf) = decode_document(PERF_DOC.as_bytes()).unwrap()
        else {
            panic!("expected performance family");
        };
        let rendered = serde_json::to_value(&perf.profile).unwrap();
        let input: Value = serde_json::from_str(PERF_DOC).unwrap();

        for metric in ["request_latency", "output_sequence_length"] {
            let input_metric = input[metric].as_object().unwrap();
            for (field, expected) in input_metric {
                if field == "unit" {
                    continue;
                }
                assert_eq!(
                    rendered[metric][field], *expected,
                    "{metric}.{field} changed across decode"
                );
            }
        }
        assert_eq!(rendered["request_throughput"]["avg"], input["request_throughput"]["avg"]);
    }
}
