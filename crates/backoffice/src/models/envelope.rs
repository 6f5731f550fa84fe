//! Response envelopes.
//!
//! The backend answers in one of two shapes:
//!
//! - a status envelope `{ responseStatus, responseMessage, responseData }`
//! - a bare payload (objects, or `{ data, totalCount, totalPages }` pages)
//!
//! Both decode into [`ApiResponse`], which callers match on instead of
//! probing string fields.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `responseStatus` value that marks a successful call.
pub const SUCCESS_STATUS: &str = "SUCCESS";

/// Decoded response: either the payload or an application-level failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Success(T),
    Failure { message: Option<String> },
}

/// Wire form of the status envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEnvelope {
    pub response_status: String,
    #[serde(default)]
    pub response_message: Option<String>,
    #[serde(default)]
    pub response_data: Option<Value>,
}

impl StatusEnvelope {
    pub fn success(data: Value) -> Self {
        Self {
            response_status: SUCCESS_STATUS.to_string(),
            response_message: None,
            response_data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            response_status: "FAILED".to_string(),
            response_message: Some(message.into()),
            response_data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.response_status.eq_ignore_ascii_case(SUCCESS_STATUS)
    }
}

impl<T> ApiResponse<T> {
    pub fn into_result(self, fallback: &str) -> Result<T, crate::api::ApiError> {
        match self {
            ApiResponse::Success(value) => Ok(value),
            ApiResponse::Failure { message } => {
                Err(crate::api::ApiError::application(message, fallback))
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success(_))
    }
}

impl<T: DeserializeOwned> ApiResponse<T> {
    /// Decodes a JSON body in either envelope shape.
    ///
    /// A status envelope with a non-`SUCCESS` status is a failure even
    /// though the transport succeeded. A successful status envelope with no
    /// `responseData` decodes `null` into `T`, so `T = ()` works for
    /// delete-style calls.
    pub fn from_value(body: Value) -> Result<Self, serde_json::Error> {
        if let Some(obj) = body.as_object() {
            if obj.contains_key("responseStatus") {
                let envelope: StatusEnvelope = serde_json::from_value(body)?;
                if !envelope.is_success() {
                    return Ok(ApiResponse::Failure {
                        message: envelope.response_message,
                    });
                }
                let data = envelope.response_data.unwrap_or(Value::Null);
                return Ok(ApiResponse::Success(serde_json::from_value(data)?));
            }
        }
        Ok(ApiResponse::Success(serde_json::from_value(body)?))
    }
}

/// Pulls a human-readable message out of an error body, whatever its shape.
pub fn extract_message(body: &Value) -> Option<String> {
    let obj = body.as_object()?;
    ["responseMessage", "message", "title", "error"]
        .iter()
        .filter_map(|key| obj.get(*key))
        .find_map(|v| v.as_str().filter(|m| !m.trim().is_empty()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: String,
    }

    #[test]
    fn test_status_envelope_success() {
        let body = json!({
            "responseStatus": "SUCCESS",
            "responseMessage": "ok",
            "responseData": {"id": "j-1"}
        });
        let decoded: ApiResponse<Item> = ApiResponse::from_value(body).unwrap();
        assert_eq!(
            decoded,
            ApiResponse::Success(Item {
                id: "j-1".to_string()
            })
        );
    }

    #[test]
    fn test_status_envelope_failure_is_failure() {
        let body = json!({
            "responseStatus": "FAILED",
            "responseMessage": "Job not found"
        });
        let decoded: ApiResponse<Item> = ApiResponse::from_value(body).unwrap();
        let err = decoded.into_result("Failed to load job").unwrap_err();
        assert_eq!(err.user_message(), "Job not found");
    }

    #[test]
    fn test_unknown_status_counts_as_failure() {
        let body = json!({"responseStatus": "PARTIAL", "responseData": {"id": "x"}});
        let decoded: ApiResponse<Item> = ApiResponse::from_value(body).unwrap();
        assert_eq!(decoded, ApiResponse::Failure { message: None });
        let err = decoded.into_result("Request failed").unwrap_err();
        assert_eq!(err.user_message(), "Request failed");
    }

    #[test]
    fn test_bare_payload() {
        let decoded: ApiResponse<Item> = ApiResponse::from_value(json!({"id": "c-9"})).unwrap();
        assert!(decoded.is_success());
    }

    #[test]
    fn test_success_without_data_decodes_unit() {
        let body = json!({"responseStatus": "SUCCESS"});
        let decoded: ApiResponse<()> = ApiResponse::from_value(body).unwrap();
        assert_eq!(decoded, ApiResponse::Success(()));
    }

    #[test]
    fn test_extract_message_prefers_envelope_field() {
        let body = json!({"responseMessage": "Envelope says no", "message": "other"});
        assert_eq!(extract_message(&body).as_deref(), Some("Envelope says no"));
        assert_eq!(
            extract_message(&json!({"title": "Bad Request"})).as_deref(),
            Some("Bad Request")
        );
        assert_eq!(extract_message(&json!({"message": ""})), None);
        assert_eq!(extract_message(&json!("plain")), None);
        let blank_envelope = json!({"responseMessage": " ", "message": "Title is required"});
        assert_eq!(
            extract_message(&blank_envelope).as_deref(),
            Some("Title is required")
        );
    }
}
