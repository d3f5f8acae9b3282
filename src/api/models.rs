use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::core::errors::MakutaError;
use crate::core::models::{Currency, TxType};

/// Error envelope: `{ "error": <code>, "message": <text>, "details"?: ... }`.
/// Codes are the stable contract; messages are advisory.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Success envelope: `{ "ok": true, "data": ... }`.
#[derive(Serialize, ToSchema)]
pub struct OkBody<T> {
    pub ok: bool,
    pub data: T,
}

pub struct ApiOk<T>(pub StatusCode, pub T);

impl<T: Serialize> IntoResponse for ApiOk<T> {
    fn into_response(self) -> axum::response::Response {
        (
            self.0,
            Json(OkBody {
                ok: true,
                data: self.1,
            }),
        )
            .into_response()
    }
}

// Newtype wrapper for MakutaError to implement IntoResponse
pub struct ApiError(pub MakutaError);

impl From<MakutaError> for ApiError {
    fn from(err: MakutaError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let message = self.0.to_string();
        let (status, code, details) = match &self.0 {
            MakutaError::InvalidMonth => (
                StatusCode::BAD_REQUEST,
                "invalid_month",
                Some(json!({ "expected": "YYYY-MM" })),
            ),
            MakutaError::InvalidCurrency => (
                StatusCode::BAD_REQUEST,
                "invalid_currency",
                Some(json!({ "expected": Currency::ALL })),
            ),
            MakutaError::InvalidType => (
                StatusCode::BAD_REQUEST,
                "invalid_type",
                Some(json!({ "expected": TxType::ALL })),
            ),
            MakutaError::InvalidGranularity => {
                (StatusCode::BAD_REQUEST, "invalid_granularity", None)
            }
            MakutaError::InvalidAmount => (StatusCode::BAD_REQUEST, "invalid_amount", None),
            MakutaError::InvalidDate => (
                StatusCode::BAD_REQUEST,
                "invalid_date",
                Some(json!({ "expected": "ISO-8601 datetime" })),
            ),
            MakutaError::InvalidLimit => (StatusCode::BAD_REQUEST, "invalid_limit", None),
            MakutaError::InvalidName => (StatusCode::BAD_REQUEST, "invalid_name", None),
            MakutaError::InvalidPageToken => (StatusCode::BAD_REQUEST, "invalid_page_token", None),
            MakutaError::InvalidCategory(id) => (
                StatusCode::BAD_REQUEST,
                "invalid_category",
                Some(json!({ "categoryId": id })),
            ),
            MakutaError::InvalidPatch => (StatusCode::BAD_REQUEST, "invalid_patch", None),
            MakutaError::MissingToken => (StatusCode::UNAUTHORIZED, "missing_token", None),
            MakutaError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            MakutaError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden", None),
            MakutaError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", None),
            MakutaError::AuthUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "auth_unavailable", None)
            }
            MakutaError::DatabaseUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "database_unavailable", None)
            }
            MakutaError::StorageError(detail) => {
                // Internal detail stays in the logs; callers get a generic code.
                tracing::error!(detail = %detail, "storage failure");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        error: "server_error".to_string(),
                        message: "internal server error".to_string(),
                        details: None,
                    }),
                )
                    .into_response();
            }
        };
        (
            status,
            Json(ErrorBody {
                error: code.to_string(),
                message,
                details,
            }),
        )
            .into_response()
    }
}
