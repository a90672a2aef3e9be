//! Report encoding
//!
//! This module wraps a feature's day-indexed output in a JSON envelope that
//! records who produced it and when.

use crate::error::ComputeError;
use crate::types::{Feature, Location};
use crate::{DAYCAST_VERSION, PRODUCER_NAME};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current report envelope version
pub const REPORT_VERSION: &str = "1.0.0";

/// A feature output that can be wrapped in a report envelope
pub trait Report: Serialize {
    fn feature(&self) -> Feature;
    fn location(&self) -> &Location;
}

/// Producer metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Envelope around one feature report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEnvelope {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub feature: Feature,
    pub location: Location,
    /// The feature output itself
    pub report: serde_json::Value,
}

/// Report encoder producing JSON envelopes
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Wrap a report in an envelope
    pub fn encode<R: Report>(&self, report: &R) -> Result<ReportEnvelope, ComputeError> {
        let body = serde_json::to_value(report)
            .map_err(|e| ComputeError::EncodingError(e.to_string()))?;

        Ok(ReportEnvelope {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: DAYCAST_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            feature: report.feature(),
            location: report.location().clone(),
            report: body,
        })
    }

    /// Encode to JSON string
    pub fn encode_to_json<R: Report>(&self, report: &R) -> Result<String, ComputeError> {
        let envelope = self.encode(report)?;
        serde_json::to_string_pretty(&envelope).map_err(ComputeError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Serialize)]
    struct WindStub {
        location: Location,
        days: Vec<&'static str>,
    }

    impl Report for WindStub {
        fn feature(&self) -> Feature {
            Feature::Wind
        }

        fn location(&self) -> &Location {
            &self.location
        }
    }

    fn stub() -> WindStub {
        WindStub {
            location: Location {
                latitude: 52.37,
                longitude: 4.89,
                timezone: "Europe/Amsterdam".to_string(),
                utc_offset_minutes: 120,
            },
            days: vec!["NW", "W"],
        }
    }

    #[test]
    fn test_encode_envelope() {
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let envelope = encoder.encode(&stub()).unwrap();

        assert_eq!(envelope.report_version, REPORT_VERSION);
        assert_eq!(envelope.producer.name, PRODUCER_NAME);
        assert_eq!(envelope.producer.version, DAYCAST_VERSION);
        assert_eq!(envelope.producer.instance_id, "test-instance");
        assert_eq!(envelope.feature, Feature::Wind);
        assert_eq!(envelope.location.timezone, "Europe/Amsterdam");
        assert_eq!(envelope.report["days"][1], "W");
    }

    #[test]
    fn test_encode_to_json() {
        let encoder = ReportEncoder::new();
        assert_eq!(encoder.instance_id().len(), 36);

        let json = encoder.encode_to_json(&stub()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["feature"], "wind");
        assert!(parsed.get("producer").is_some());
        assert!(parsed.get("computed_at_utc").is_some());
        assert!(parsed.get("report").is_some());
    }
}
