//! The uniform `{statusCode, message, data}` response envelope.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Message used for plain successful reads.
pub const SUCCESS: &str = "Success";

/// Response envelope shared by every API endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    #[serde(skip)]
    status: StatusCode,
    status_code: u16,
    message: String,
    data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 with the default success message.
    pub fn ok(data: T) -> Self {
        Self::new(StatusCode::OK, SUCCESS, Some(data))
    }

    /// 200 with a custom message.
    pub fn ok_with(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::OK, message, Some(data))
    }

    /// 201 for freshly created resources.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::CREATED, message, Some(data))
    }

    fn new(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status,
            status_code: status.as_u16(),
            message: message.into(),
            data,
        }
    }
}

impl ApiResponse<()> {
    /// 200 with no payload, used after deletes.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, message, None)
    }

    /// Error envelope with `data: null`.
    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, message, None)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Collection payload: `{"value": [...], "count": n}`.
#[derive(Debug, Serialize)]
pub struct Collection {
    pub value: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::ok(vec![1, 2])).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"statusCode": 200, "message": "Success", "data": [1, 2]})
        );
    }

    #[test]
    fn test_created_status() {
        let response = ApiResponse::created("Tag created successfully", 7).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn test_message_only_has_null_data() {
        let json = serde_json::to_value(ApiResponse::message("Tag deleted successfully")).unwrap();
        assert!(json["data"].is_null());
    }

    #[test]
    fn test_collection_omits_absent_count() {
        let json = serde_json::to_value(Collection {
            value: vec![],
            count: None,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"value": []}));
    }
}
