// Copyright 2025 Benchsink Contributors
// SPDX-License-Identifier: Apache-2.0

//! Record assembler: pure construction of the canonical record.

use benchsink_core::record::{
    AccuracyProfile, BenchmarkRecord, GenerationParameters, HardwareDescriptor, MetricsPayload,
    PerformanceProfile,
};

use crate::decode::DecodedDocument;
use crate::normalize::NormalizedFields;

/// Compose the canonical record from decoder output, normalized fields and
/// the hardware descriptor.
///
/// No I/O; the only branching selects the metrics union variant from the
/// decoder family. A telemetry-only snapshot assembles as an inference
/// record whose fixed metric block is zero-valued.
pub fn assemble_record(
    document: DecodedDocument,
    fields: NormalizedFields,
    hardware: HardwareDescriptor,
) -> BenchmarkRecord {
    let (profile, generation_parameters) = match document {
        DecodedDocument::Performance(doc) => {
            let mut profile = doc.profile;
            profile.telemetry = doc.telemetry_stats;
            (MetricsPayload::Inference(profile), GenerationParameters::default())
        }
        DecodedDocument::Telemetry(doc) => {
            let profile = PerformanceProfile {
                telemetry: doc.telemetry_stats,
                ..PerformanceProfile::default()
            };
            (MetricsPayload::Inference(profile), GenerationParameters::default())
        }
        DecodedDocument::Accuracy(doc) => (
            MetricsPayload::Accuracy(AccuracyProfile {
                tasks: doc.results,
                total_evaluation_time: fields.total_evaluation_time,
            }),
            doc.config_general.model_config.generation_parameters,
        ),
    };

    BenchmarkRecord {
        workflow_id: fields.workflow_id,
        timestamp: fields.timestamp,
        datetime: fields.datetime,
        model_name: fields.model_name,
        dataset_name: fields.dataset_name,
        benchmark_type: fields.benchmark_type,
        framework: fields.framework,
        node_info: hardware,
        profile,
        generation_parameters,
    }
}
