//! Uniform `{status, statusCode, data}` shape returned by every operation.
//!
//! # Design
//! Normalization is pure. A response is an error when its status is not 2xx
//! or when the transport rejected it with the response attached; in both
//! cases the status code and payload are repackaged, never raised. Only a
//! transport failure with no response at all stays an `Err`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::{HttpResponse, TransportError};

/// Outcome tag of a `NormalizedResponse`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    #[default]
    Success,
    Error,
}

/// The uniform response record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResponse {
    pub status: ResponseStatus,
    pub status_code: u16,
    pub data: Value,
}

impl NormalizedResponse {
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

/// Repackage `response` under `status`.
///
/// An empty body becomes `null`; a body that is not JSON is kept as a JSON
/// string.
pub fn normalize(response: HttpResponse, status: ResponseStatus) -> NormalizedResponse {
    NormalizedResponse {
        status,
        status_code: response.status,
        data: parse_payload(&response.body),
    }
}

/// Normalize the outcome of a transport call.
pub fn normalize_result(
    result: Result<HttpResponse, TransportError>,
) -> Result<NormalizedResponse, TransportError> {
    match result {
        Ok(response) if response.is_success() => Ok(normalize(response, ResponseStatus::Success)),
        Ok(response) | Err(TransportError::Response(response)) => {
            Ok(normalize(response, ResponseStatus::Error))
        }
        Err(err @ TransportError::Connection(_)) => Err(err),
    }
}

fn parse_payload(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}
