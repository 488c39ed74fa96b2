//! The uniform response envelope.
//!
//! Every endpoint answers `{ success, data?, message?, error?, errorCode? }`.
//! Success responses are built here; error responses come from
//! `AppError::into_response`.

use serde::Serialize;

/// Success envelope wrapping a response payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    /// Always true for this type; failures go through `AppError`.
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wraps a payload in a success envelope.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Wraps a payload with an additional human-readable message.
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_envelope() {
        let envelope = ApiResponse::ok(json!({"balance": "100.00"}));
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["balance"], "100.00");
        assert!(json.get("message").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_with_message_envelope() {
        let envelope = ApiResponse::with_message(json!({}), "Hold released");
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Hold released");
    }
}
