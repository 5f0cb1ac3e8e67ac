use common_http_errors::ApiError;
use axum::response::IntoResponse;
use axum::http::StatusCode;
use http_body_util::BodyExt;

#[test]
fn unauthorized_variant() {
    let resp = ApiError::unauthorized("auth_required").into_response();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "auth_required");
}

#[test]
fn forbidden_variant() {
    let err = ApiError::Forbidden { code: "forbidden" };
    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "forbidden");
}

#[test]
fn bad_request_variant() {
    let err = ApiError::BadRequest { code: "upload_missing_file", message: None };
    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "upload_missing_file");
}

#[test]
fn not_found_variant() {
    let err = ApiError::NotFound { code: "missing_resource" };
    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "missing_resource");
}

#[test]
fn payload_too_large_variant() {
    let resp = ApiError::PayloadTooLarge { code: "upload_too_large" }.into_response();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "upload_too_large");
}

#[test]
fn bad_gateway_variant() {
    let err = ApiError::BadGateway { code: "upload_failed", message: Some("bucket said no".into()) };
    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "upload_failed");
}

#[tokio::test]
async fn internal_variant_carries_message() {
    let resp = ApiError::internal("boom").into_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "internal_error");

    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "internal_error");
    assert_eq!(body["message"], "boom");
}
