// Copyright 2025 Benchsink Contributors
// SPDX-License-Identifier: Apache-2.0

//! Canonical benchmark record types.
//!
//! Every producer-specific result document is normalized into the
//! [`BenchmarkRecord`] defined here before it is persisted. A record is
//! constructed in one shot by the assembler and never mutated afterwards;
//! the store performs a blind overwrite keyed by `(workflow_id, timestamp)`.
//!
//! Dynamic-keyed payloads (per-device telemetry, per-task results) are
//! ordered maps; shape-polymorphic payloads are untagged unions resolved by
//! structural probing, since the producers emit no discriminator field.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single scalar measurement with its unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricSummary {
    /// Unit of the measurement (e.g. `requests/sec`).
    pub unit: String,
    /// Average over the benchmark run.
    pub avg: f64,
}

/// A measurement with its full distribution.
///
/// Reused for every latency, throughput and sequence-length metric as well
/// as for per-device telemetry values. Percentile sets vary by producer:
/// absent percentiles decode to zero and the canonical shape always carries
/// the complete set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionMetric {
    /// Unit of the measurement. Empty for per-device telemetry values,
    /// whose unit lives on the channel.
    pub unit: String,
    /// Average over the benchmark run.
    pub avg: f64,
    /// 1st percentile.
    pub p1: f64,
    /// 25th percentile.
    pub p25: f64,
    /// 50th percentile (median).
    pub p50: f64,
    /// 75th percentile.
    pub p75: f64,
    /// 90th percentile.
    pub p90: f64,
    /// 95th percentile.
    pub p95: f64,
    /// 99th percentile.
    pub p99: f64,
    /// Minimum observed value.
    pub min: f64,
    /// Maximum observed value.
    pub max: f64,
    /// Standard deviation.
    pub std: f64,
}

/// A named group of per-device telemetry statistics (e.g. power draw).
///
/// On the wire the channel object interleaves one reserved `unit` key with
/// an arbitrary number of device-identifier keys. The `unit` field is
/// extracted before the remainder is treated as the device map, so `unit`
/// never appears among the device identifiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryChannel {
    /// Unit shared by every device in the channel (e.g. `W`).
    #[serde(default)]
    pub unit: String,
    /// Distribution statistics keyed by device identifier.
    #[serde(flatten)]
    pub per_device: BTreeMap<String, DistributionMetric>,
}

/// GPU telemetry channels captured alongside a benchmark run.
///
/// Channels the producer did not capture decode to empty channels rather
/// than failing the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryStats {
    /// Per-GPU power draw.
    pub gpu_power_usage: TelemetryChannel,
    /// Per-GPU utilization.
    pub gpu_utilization: TelemetryChannel,
}

/// Fixed pass@k result pair emitted by accuracy producers.
///
/// The wire names carry the producer's `@`/`&` punctuation; the canonical
/// names are accepted on input as well so persisted records read back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassAtK {
    /// pass@k score.
    #[serde(rename = "pass_at_k", alias = "pass@k_with_k&n")]
    pub pass_at_k: f64,
    /// Standard error of the pass@k score.
    #[serde(rename = "pass_at_k_stderr", alias = "pass@k_with_k&n_stderr")]
    pub pass_at_k_stderr: f64,
}

/// Result of a single evaluation task.
///
/// Producers emit either the fixed pass@k pair or a free-form map of metric
/// name to value, with no discriminator; the variant is resolved by
/// structural probing. The pair is probed first because the metric map
/// accepts any object of numeric values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskOutcome {
    /// Fixed pass@k pair.
    PassAtK(PassAtK),
    /// Free-form metric name to value map (`acc`, `acc_stderr`, ...).
    Metrics(BTreeMap<String, f64>),
}

/// Per-task results keyed by dynamic task name.
pub type TaskResults = BTreeMap<String, TaskOutcome>;

/// Sampling hyperparameters of a generation run.
///
/// Zero-valued when the document family does not carry them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParameters {
    /// Repetition penalty.
    pub repetition_penalty: f64,
    /// Frequency penalty.
    pub frequency_penalty: f64,
    /// Maximum number of newly generated tokens.
    pub max_new_tokens: i64,
    /// Sampling temperature.
    pub temperature: f64,
    /// Top-k cutoff.
    pub top_k: i64,
    /// Min-p cutoff.
    pub min_p: f64,
    /// Nucleus sampling cutoff.
    pub top_p: f64,
}

/// Hardware the benchmark ran on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareDescriptor {
    /// GPU product name.
    pub gpu_name: String,
    /// GPUs per node.
    pub gpu_count: u32,
    /// Number of nodes.
    pub node_count: u32,
}

impl HardwareDescriptor {
    /// Fixed placeholder used until node discovery is wired in.
    pub fn placeholder() -> Self {
        Self {
            gpu_name: "NVIDIA-A100-SXM4-80GB".to_string(),
            gpu_count: 1,
            node_count: 1,
        }
    }
}

/// Kind of benchmark a record captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BenchmarkType {
    /// Inference performance profile (throughput, latency, telemetry).
    Inference,
    /// Accuracy evaluation report (per-task scores).
    Accuracy,
}

impl fmt::Display for BenchmarkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenchmarkType::Inference => f.write_str("inference"),
            BenchmarkType::Accuracy => f.write_str("accuracy"),
        }
    }
}

/// Fixed metric block of an inference performance profile, plus the
/// telemetry captured alongside it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceProfile {
    /// Completed requests per unit time.
    pub request_throughput: MetricSummary,
    /// End-to-end request latency distribution.
    pub request_latency: DistributionMetric,
    /// Total request count.
    pub request_count: MetricSummary,
    /// Time to first token distribution.
    pub time_to_first_token: DistributionMetric,
    /// Time to second token distribution.
    pub time_to_second_token: DistributionMetric,
    /// Inter-token latency distribution.
    pub inter_token_latency: DistributionMetric,
    /// Aggregate output token throughput.
    pub output_token_throughput: MetricSummary,
    /// Per-user output token throughput distribution.
    pub output_token_throughput_per_user: DistributionMetric,
    /// Output sequence length distribution.
    pub output_sequence_length: DistributionMetric,
    /// Input sequence length distribution.
    pub input_sequence_length: DistributionMetric,
    /// GPU telemetry channels for the run.
    pub telemetry: TelemetryStats,
}

/// Accuracy metric payload: per-task scores plus total evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyProfile {
    /// Per-task results keyed by task name.
    pub tasks: TaskResults,
    /// Total evaluation wall time in seconds.
    pub total_evaluation_time: f64,
}

/// Metric payload union of the canonical record.
///
/// Accuracy is probed first on deserialization: the inference profile
/// defaults every field and would otherwise match any object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricsPayload {
    /// Accuracy evaluation payload.
    Accuracy(AccuracyProfile),
    /// Inference performance payload.
    Inference(PerformanceProfile),
}

/// The canonical, producer-independent benchmark record.
///
/// `workflow_id` is the partition key and `timestamp` the sort key;
/// together they identify the record. The timestamp is always assigned at
/// ingestion time, never trusted from the source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    /// Partition key: the benchmark run this record belongs to.
    pub workflow_id: String,
    /// Sort key: ingestion time in seconds since epoch.
    pub timestamp: i64,
    /// Human-readable rendering of the timestamp in the configured fixed
    /// offset, independent of host timezone.
    pub datetime: String,
    /// Canonicalized model name.
    pub model_name: String,
    /// Dataset backing the run; empty when undiscoverable.
    pub dataset_name: String,
    /// Kind of benchmark.
    pub benchmark_type: BenchmarkType,
    /// Producer name; empty when not applicable.
    pub framework: String,
    /// Hardware the run executed on.
    pub node_info: HardwareDescriptor,
    /// Metric payload for the benchmark kind.
    pub profile: MetricsPayload,
    /// Sampling hyperparameters; zero-valued when not applicable.
    pub generation_parameters: GenerationParameters,
}
