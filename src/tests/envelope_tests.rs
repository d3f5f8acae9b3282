use axum::response::IntoResponse;
use http::StatusCode;
use serde_json::{Value, json};

use crate::api::models::{ApiError, ApiOk};
use crate::core::errors::MakutaError;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_ok_envelope_wraps_data() {
    let response = ApiOk(StatusCode::OK, json!({ "id": "tx_1" })).into_response();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["data"]["id"], "tx_1");
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_invalid_currency_lists_expected_values() {
    let response = ApiError(MakutaError::InvalidCurrency).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "invalid_currency");
    assert_eq!(body["details"]["expected"], json!(["USD", "CDF"]));
    // Callers branch on the presence of `ok`.
    assert!(body.get("ok").is_none());
}

#[tokio::test]
async fn test_invalid_type_lists_expected_values() {
    let response = ApiError(MakutaError::InvalidType).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "invalid_type");
    assert_eq!(body["details"]["expected"], json!(["income", "expense"]));
}

#[tokio::test]
async fn test_storage_error_is_masked() {
    let response =
        ApiError(MakutaError::StorageError("connection reset".to_string())).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["error"], "server_error");
    assert!(!body["message"].as_str().unwrap().contains("connection"));
    assert!(body.get("details").is_none());
}
