// Copyright 2025 Benchsink Contributors
// SPDX-License-Identifier: Apache-2.0

//! Read-once process configuration.
//!
//! A [`Settings`] value is built once at process start and passed by
//! reference into the pipeline; nothing in it mutates afterwards. A missing
//! or invalid required value is a startup error, never a per-document one.

use chrono::FixedOffset;
use thiserror::Error;

use crate::record::HardwareDescriptor;

/// Default target region for the store and result buckets.
pub const DEFAULT_REGION: &str = "ap-northeast-1";

/// Default fixed UTC offset for the display timestamp (JST).
pub const DEFAULT_UTC_OFFSET: &str = "+09:00";

/// Errors raised while building [`Settings`].
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The table name was empty.
    #[error("table name must not be empty")]
    EmptyTableName,
    /// The UTC offset did not parse.
    #[error("invalid UTC offset `{0}`: expected a ±HH:MM offset such as +09:00")]
    InvalidUtcOffset(String),
}

/// Process-wide configuration shared read-only by every ingestion.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Table receiving canonical benchmark records.
    pub table_name: String,
    /// Region hosting the store and result buckets.
    pub region: String,
    /// Fixed offset used to render the human-readable datetime attribute,
    /// independent of the host timezone.
    pub display_offset: FixedOffset,
    /// Hardware descriptor handed to the assembler when no node-information
    /// provider is wired in.
    pub hardware: HardwareDescriptor,
}

impl Settings {
    /// Build settings, validating the required values.
    pub fn new(
        table_name: impl Into<String>,
        region: impl Into<String>,
        utc_offset: &str,
    ) -> Result<Self, SettingsError> {
        let table_name = table_name.into();
        if table_name.is_empty() {
            return Err(SettingsError::EmptyTableName);
        }
        let display_offset = utc_offset
            .parse::<FixedOffset>()
            .map_err(|_| SettingsError::InvalidUtcOffset(utc_offset.to_string()))?;
        Ok(Self {
            table_name,
            region: region.into(),
            display_offset,
            hardware: HardwareDescriptor::placeholder(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_parse_fixed_offset() {
        let settings = Settings::new("benchmark-result", DEFAULT_REGION, "+09:00").unwrap();
        assert_eq!(settings.display_offset.local_minus_utc(), 9 * 3600);

        let settings = Settings::new("benchmark-result", DEFAULT_REGION, "-05:30").unwrap();
        assert_eq!(settings.display_offset.local_minus_utc(), -(5 * 3600 + 30 * 60));
    }

    #[test]
    fn test_settings_reject_invalid_offset() {
        let err = Settings::new("benchmark-result", DEFAULT_REGION, "tokyo").unwrap_err();
        assert!(matches!(err, SettingsError::InvalidUtcOffset(_)));
    }

    #[test]
    fn test_settings_reject_empty_table_name() {
        let err = Settings::new("", DEFAULT_REGION, DEFAULT_UTC_OFFSET).unwrap_err();
        assert!(matches!(err, SettingsError::EmptyTableName));
    }
}
