//! Durable image hosting. Cloudinary is the only backend.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use tracing::{debug, info};

use crate::{config::CloudinaryConfig, error::UpstreamError, image::UploadedImage};

#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Stores the bytes and returns a permanent HTTPS URL.
    async fn upload(&self, image: UploadedImage) -> Result<String, UpstreamError>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

/// Signed uploads against `{base_url}/{cloud_name}/image/upload`.
#[derive(Debug, Clone)]
pub struct CloudinaryHost {
    http: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryHost {
    pub fn new(http: reqwest::Client, config: CloudinaryConfig) -> Self {
        Self { http, config }
    }

    fn endpoint(&self) -> String {
        format!("{}/{}/image/upload", self.config.base_url, self.config.cloud_name)
    }
}

/// SHA-1 over the alphabetically sorted signed params followed by the secret.
pub fn sign_upload(folder: &str, timestamp: i64, api_secret: &str) -> String {
    let to_sign = format!("folder={folder}&timestamp={timestamp}{api_secret}");
    hex::encode(Sha1::digest(to_sign.as_bytes()))
}

#[async_trait]
impl ImageHost for CloudinaryHost {
    async fn upload(&self, image: UploadedImage) -> Result<String, UpstreamError> {
        let timestamp = chrono::Utc::now().timestamp();
        let signature = sign_upload(&self.config.folder, timestamp, &self.config.api_secret);
        let size = image.bytes.len();

        let file = Part::bytes(image.bytes)
            .file_name(image.file_name.unwrap_or_else(|| "upload".to_string()))
            .mime_str(&image.media_type)
            .map_err(|e| UpstreamError::Malformed(format!("invalid media type: {e}")))?;

        let form = Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("folder", self.config.folder.clone())
            .text("signature", signature);

        debug!(size, folder = %self.config.folder, "Uploading image to Cloudinary");

        let response = self.http.post(self.endpoint()).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let url = serde_json::from_str::<UploadResponse>(&body)
            .map_err(|e| UpstreamError::Malformed(e.to_string()))?
            .secure_url
            .ok_or_else(|| UpstreamError::Malformed("response has no secure_url".to_string()))?;

        info!(%url, "Image uploaded");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{body_string_contains, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    fn host_for(server: &MockServer) -> CloudinaryHost {
        CloudinaryHost::new(
            reqwest::Client::new(),
            CloudinaryConfig {
                base_url: server.uri(),
                cloud_name: "demo".to_string(),
                api_key: "1234".to_string(),
                api_secret: "abcd".to_string(),
                folder: "caption-generator".to_string(),
            },
        )
    }

    fn image() -> UploadedImage {
        UploadedImage {
            bytes: b"\x89PNG fake".to_vec(),
            media_type: "image/png".to_string(),
            file_name: Some("x.png".to_string()),
        }
    }

    #[test]
    fn test_signature() {
        let signature = sign_upload("caption-generator", 1315060510, "abcd");
        assert_eq!(signature, "4037ad3fc0a97865175d784e7201a4e2536abe33");
        assert_ne!(signature, sign_upload("caption-generator", 1315060511, "abcd"));
    }

    #[tokio::test]
    async fn test_upload_returns_secure_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/demo/image/upload"))
            .and(body_string_contains("caption-generator"))
            .and(body_string_contains("name=\"signature\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "public_id": "caption-generator/x",
                "secure_url": "https://host/x.jpg"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let url = host_for(&server).upload(image()).await.unwrap();
        assert_eq!(url, "https://host/x.jpg");
    }

    #[tokio::test]
    async fn test_upload_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({ "error": { "message": "Invalid Signature" } })),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "public_id": "x" })))
            .mount(&server)
            .await;

        let host = host_for(&server);
        let err = host.upload(image()).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Status { status: 401, .. }));

        let err = host.upload(image()).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Malformed(_)));
    }
}
