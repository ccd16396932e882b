// Copyright 2025 Benchsink Contributors
// SPDX-License-Identifier: Apache-2.0

//! Stage-tagged error types for the normalization pipeline.
//!
//! All four kinds are terminal for the document being processed: there is
//! no automatic retry and no partial record is ever persisted. In batch
//! mode a failure is surfaced per document without aborting its siblings.

use std::fmt;

use benchsink_core::gateway::{FetchError, PersistenceError};
use thiserror::Error;

/// Document family selected by the structural probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFamily {
    /// Inference performance profile.
    Performance,
    /// Accuracy evaluation report.
    Accuracy,
    /// GPU telemetry snapshot.
    Telemetry,
}

impl fmt::Display for DocumentFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFamily::Performance => f.write_str("performance-profile"),
            DocumentFamily::Accuracy => f.write_str("accuracy"),
            DocumentFamily::Telemetry => f.write_str("telemetry"),
        }
    }
}

/// Malformed or missing-required-field JSON.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Input was not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Top-level value was not an object.
    #[error("document root is not a JSON object")]
    NotAnObject,
    /// Top-level keys matched no supported document family.
    #[error("document shape matches no supported benchmark family")]
    UnrecognizedShape,
    /// The probed family failed to deserialize.
    #[error("malformed {family} document: {source}")]
    Malformed {
        /// Family the probe selected.
        family: DocumentFamily,
        /// Field-level deserialization failure.
        #[source]
        source: serde_json::Error,
    },
    /// A required identity field was absent or empty.
    #[error("missing required field `{path}`")]
    MissingField {
        /// Path of the offending field.
        path: &'static str,
    },
}

/// Unparseable auxiliary field during normalization.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The producer's numeric-as-string evaluation time did not parse.
    #[error("total_evaluation_time_secondes `{value}` is not numeric")]
    InvalidEvaluationTime {
        /// Raw value the producer emitted.
        value: String,
        /// Underlying parse failure.
        #[source]
        source: std::num::ParseFloatError,
    },
}

/// Terminal failure for one document, tagged with the pipeline stage.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Raw bytes were unavailable.
    #[error("fetch stage failed: {0}")]
    Fetch(#[from] FetchError),
    /// The document did not decode.
    #[error("decode stage failed: {0}")]
    Decode(#[from] DecodeError),
    /// A canonical field could not be derived.
    #[error("normalize stage failed: {0}")]
    Normalize(#[from] NormalizeError),
    /// The store rejected the record.
    #[error("persist stage failed: {0}")]
    Persistence(#[from] PersistenceError),
}

impl IngestError {
    /// Name of the stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            IngestError::Fetch(_) => "fetch",
            IngestError::Decode(_) => "decode",
            IngestError::Normalize(_) => "normalize",
            IngestError::Persistence(_) => "persist",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_error_names_the_failed_stage() {
        let err = IngestError::from(DecodeError::UnrecognizedShape);
        assert_eq!(err.stage(), "decode");
        assert!(err.to_string().contains("decode stage failed"));

        let err = IngestError::from(PersistenceError::Write("timeout".to_string()));
        assert_eq!(err.stage(), "persist");
    }
}
