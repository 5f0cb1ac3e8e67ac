use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use common_auth::AuthContext;
use common_http_errors::{ApiError, ApiResult};
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::UploadConfig;

const FILE_FIELD: &str = "file";
const PUBLIC_READ: &str = "public-read";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("invalid signing key")]
    SigningKey,
    #[error("object store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("object store rejected upload with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Destination for uploaded files; returns the public URL of the stored object.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, content_type: &str, body: Bytes) -> Result<String, UploadError>;
}

/// Object name for an upload: millisecond timestamp followed by the sanitized file name.
pub fn object_key(now: DateTime<Utc>, original_name: &str) -> String {
    format!("{}-{}", now.timestamp_millis(), sanitize_key(original_name))
}

/// Keeps ASCII letters, digits, `.`, `_` and `-`; anything else becomes `-`.
pub fn sanitize_key(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '-' })
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>, UploadError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| UploadError::SigningKey)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// SigV4 signing key for `date` (`YYYYMMDD`), region and service.
pub fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Result<Vec<u8>, UploadError> {
    let k_date = hmac(format!("AWS4{secret}").as_bytes(), date.as_bytes())?;
    let k_region = hmac(&k_date, region.as_bytes())?;
    let k_service = hmac(&k_region, service.as_bytes())?;
    hmac(&k_service, b"aws4_request")
}

/// Headers to attach to a signed single-shot PUT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPut {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
}

/// S3 (or S3-compatible) store signing requests with AWS Signature V4.
pub struct S3Store {
    client: Client,
    config: UploadConfig,
}

impl S3Store {
    pub fn new(client: Client, config: UploadConfig) -> Self {
        Self { client, config }
    }

    /// Host and path of `key`: path-style on a custom endpoint, virtual-hosted on AWS.
    fn location(&self, key: &str) -> (String, String, String) {
        match self.config.endpoint.as_deref() {
            Some(endpoint) => {
                let endpoint = endpoint.trim_end_matches('/');
                let host = endpoint
                    .split_once("://")
                    .map(|(_, rest)| rest)
                    .unwrap_or(endpoint)
                    .to_string();
                let path = format!("/{}/{}", self.config.bucket, key);
                (format!("{endpoint}{path}"), host, path)
            }
            None => {
                let host = format!("{}.s3.{}.amazonaws.com", self.config.bucket, self.config.region);
                let path = format!("/{key}");
                (format!("https://{host}{path}"), host, path)
            }
        }
    }

    pub fn sign_put(&self, key: &str, content_type: &str, body: &[u8], now: DateTime<Utc>) -> Result<SignedPut, UploadError> {
        let (url, host, path) = self.location(key);
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let payload_hash = hex::encode(Sha256::digest(body));

        let mut headers: Vec<(&'static str, String)> = vec![
            ("content-type", content_type.to_string()),
            ("host", host),
            ("x-amz-acl", PUBLIC_READ.to_string()),
            ("x-amz-content-sha256", payload_hash.clone()),
            ("x-amz-date", amz_date.clone()),
        ];
        let signed_headers = headers.iter().map(|(name, _)| *name).collect::<Vec<_>>().join(";");
        let canonical_headers: String = headers
            .iter()
            .map(|(name, value)| format!("{name}:{}\n", value.trim()))
            .collect();
        let canonical_request = format!("PUT\n{path}\n\n{canonical_headers}\n{signed_headers}\n{payload_hash}");

        let scope = format!("{date}/{}/s3/aws4_request", self.config.region);
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{amz_date}\n{scope}\n{}",
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );
        let key = signing_key(&self.config.secret_access_key, &date, &self.config.region, "s3")?;
        let signature = hex::encode(hmac(&key, string_to_sign.as_bytes())?);

        headers.retain(|(name, _)| *name != "host");
        headers.push((
            "authorization",
            format!(
                "AWS4-HMAC-SHA256 Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
                self.config.access_key_id
            ),
        ));
        Ok(SignedPut { url, headers })
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, key: &str, content_type: &str, body: Bytes) -> Result<String, UploadError> {
        let signed = self.sign_put(key, content_type, &body, Utc::now())?;
        let mut request = self.client.put(&signed.url);
        for (name, value) in &signed.headers {
            request = request.header(*name, value);
        }
        let response = request.body(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Rejected { status: status.as_u16(), body });
        }
        Ok(signed.url)
    }
}

/// Keeps uploads in memory; used by tests and local runs without a bucket.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, (String, Bytes)>>,
}

impl MemoryStore {
    pub fn get(&self, key: &str) -> Option<(String, Bytes)> {
        self.objects.lock().ok()?.get(key).cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, key: &str, content_type: &str, body: Bytes) -> Result<String, UploadError> {
        if let Ok(mut objects) = self.objects.lock() {
            objects.insert(key.to_string(), (content_type.to_string(), body));
        }
        Ok(format!("memory://{key}"))
    }
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::PayloadTooLarge { code: "upload_too_large" };
    }
    ApiError::BadRequest {
        code: "upload_malformed",
        message: Some(err.body_text()),
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// `POST /uploads`: stores the multipart `file` field and returns its URL.
pub async fn upload_file(
    State(store): State<Arc<dyn ObjectStore>>,
    auth: AuthContext,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = field.bytes().await.map_err(multipart_error)?;

        let key = object_key(Utc::now(), &name);
        let url = store.put(&key, &content_type, body).await.map_err(|err| {
            warn!(error = %err, %key, "upload failed");
            ApiError::BadGateway {
                code: "upload_failed",
                message: Some("Could not store the uploaded file.".to_string()),
            }
        })?;
        info!(%key, user_id = %auth.claims.subject, "file uploaded");
        return Ok(Json(UploadResponse { url }));
    }
    Err(ApiError::BadRequest {
        code: "upload_missing_file",
        message: Some("Multipart field 'file' is required.".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn store(endpoint: Option<&str>) -> S3Store {
        S3Store::new(
            Client::new(),
            UploadConfig {
                bucket: "eats-uploads".into(),
                region: "us-east-1".into(),
                endpoint: endpoint.map(str::to_string),
                access_key_id: "AKIDEXAMPLE".into(),
                secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".into(),
            },
        )
    }

    #[test]
    fn signing_key_matches_published_vector() {
        let key = signing_key("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY", "20120215", "us-east-1", "iam").unwrap();
        assert_eq!(hex::encode(key), "f4780e2d9f65fa895f9c67b32ce1baf0b0d8a43505a000a1a9e090d414db404d");
    }

    #[test]
    fn sanitize_strips_paths_and_odd_characters() {
        assert_eq!(sanitize_key("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_key("C:\\photos\\my burger.png"), "my-burger.png");
        assert_eq!(sanitize_key("pho #1!.jpg"), "pho--1-.jpg");
        assert_eq!(sanitize_key("..."), "upload");
        assert_eq!(sanitize_key(""), "upload");
    }

    #[test]
    fn object_key_is_prefixed_with_millis() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(object_key(now, "taco.png"), format!("{}-taco.png", now.timestamp_millis()));
    }

    #[test]
    fn signed_put_uses_virtual_host_on_aws() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let signed = store(None).sign_put("1-taco.png", "image/png", b"bytes", now).unwrap();
        assert_eq!(signed.url, "https://eats-uploads.s3.us-east-1.amazonaws.com/1-taco.png");
        let auth = &signed.headers.iter().find(|(name, _)| *name == "authorization").unwrap().1;
        assert!(auth.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20240501/us-east-1/s3/aws4_request"));
        assert!(auth.contains("SignedHeaders=content-type;host;x-amz-acl;x-amz-content-sha256;x-amz-date"));
        assert!(signed.headers.iter().any(|(name, value)| *name == "x-amz-acl" && value == "public-read"));
        assert!(!signed.headers.iter().any(|(name, _)| *name == "host"));
    }

    #[test]
    fn signing_is_deterministic_and_body_sensitive() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let s3 = store(Some("http://localhost:9000/"));
        let first = s3.sign_put("k", "text/plain", b"a", now).unwrap();
        let again = s3.sign_put("k", "text/plain", b"a", now).unwrap();
        let other = s3.sign_put("k", "text/plain", b"b", now).unwrap();
        assert_eq!(first, again);
        assert_ne!(first, other);
        assert_eq!(first.url, "http://localhost:9000/eats-uploads/k");
    }

    #[tokio::test]
    async fn memory_store_keeps_objects() {
        let store = MemoryStore::default();
        let url = store.put("k.txt", "text/plain", Bytes::from_static(b"hi")).await.unwrap();
        assert_eq!(url, "memory://k.txt");
        assert_eq!(store.get("k.txt"), Some(("text/plain".to_string(), Bytes::from_static(b"hi"))));
    }
}
