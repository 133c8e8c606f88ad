//! Uniform result returned by every data entry operation.

use serde::Serialize;
use serde_json::Value;

use crate::error::DataEntryError;

/// Status plus either a payload or an error message.
///
/// Serializes as `{"response_status": 200, "data": ...}` or
/// `{"response_status": 404, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    #[serde(rename = "response_status")]
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    /// 200 with a payload.
    pub fn ok(data: impl Into<Value>) -> Self {
        Self::with_data(200, data)
    }

    /// 201 with a payload.
    pub fn created(data: impl Into<Value>) -> Self {
        Self::with_data(201, data)
    }

    fn with_data(status: u16, data: impl Into<Value>) -> Self {
        Self {
            status,
            data: Some(data.into()),
            error: None,
        }
    }

    /// Error envelope carrying the error's status and message.
    pub fn from_error(e: &DataEntryError) -> Self {
        Self {
            status: e.status(),
            data: None,
            error: Some(e.to_string()),
        }
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<DataEntryError> for Envelope {
    fn from(e: DataEntryError) -> Self {
        Self::from_error(&e)
    }
}
