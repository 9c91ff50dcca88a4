use crate::telemetry::TelemetrySample;
use serde::{Deserialize, Serialize};

/// Client → Server message types
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "join-campus")]
    JoinCampus {
        #[serde(rename = "campusId")]
        campus_id: String,
    },
    #[serde(rename = "leave-campus")]
    LeaveCampus {
        #[serde(rename = "campusId")]
        campus_id: String,
    },
    #[serde(rename = "get-latest-data")]
    GetLatestData {
        #[serde(rename = "campusId")]
        campus_id: String,
    },
}

/// Server → Client: telemetry sample
#[derive(Debug, Clone, Serialize)]
pub struct EnergyDataMessage<'a> {
    #[serde(rename = "type")]
    pub msg_type: &'static str,
    pub data: &'a TelemetrySample,
}

impl<'a> From<&'a TelemetrySample> for EnergyDataMessage<'a> {
    fn from(sample: &'a TelemetrySample) -> Self {
        Self {
            msg_type: "energy-data",
            data: sample,
        }
    }
}

/// Server → Client: Error message
#[derive(Debug, Clone, Serialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub error: String,
}

impl ErrorMessage {
    pub fn new(error: String) -> Self {
        Self {
            msg_type: "error".to_string(),
            error,
        }
    }
}
