use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Failure talking to one of the external collaborators (completion API or image host).
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed upstream response: {0}")]
    Malformed(String),
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

/// Which input the analyze/upload routes were missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingInput {
    File,
    Url,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing image input ({0:?})")]
    MissingImageInput(MissingInput),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("request body over the upload limit: {0}")]
    PayloadTooLarge(String),
    #[error("caption generation failed")]
    CaptionGenerationFailed(#[source] UpstreamError),
    #[error("image analysis failed")]
    ImageAnalysisFailed(#[source] UpstreamError),
    #[error("image upload failed")]
    ImageUploadFailed(#[source] UpstreamError),
}

impl AppError {
    /// Maps a body-reading failure, keeping length-limit hits apart from malformed input.
    pub fn from_body_error(status: StatusCode, detail: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(detail)
        } else {
            AppError::InvalidRequest(detail)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingImageInput(_) | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::CaptionGenerationFailed(_)
            | AppError::ImageAnalysisFailed(_)
            | AppError::ImageUploadFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message exposed to the client. Upstream details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::MissingImageInput(MissingInput::File) => "No image file provided".to_string(),
            AppError::MissingImageInput(MissingInput::Url) => "No image URL provided".to_string(),
            AppError::InvalidRequest(reason) => reason.clone(),
            AppError::PayloadTooLarge(_) => "Image exceeds the upload size limit".to_string(),
            AppError::CaptionGenerationFailed(_) => "Failed to generate caption".to_string(),
            AppError::ImageAnalysisFailed(_) => "Failed to analyze image".to_string(),
            AppError::ImageUploadFailed(_) => "Failed to upload image".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::CaptionGenerationFailed(source)
            | AppError::ImageAnalysisFailed(source)
            | AppError::ImageUploadFailed(source) => {
                error!(error = %self, source = %source, "Request failed upstream");
            }
            AppError::MissingImageInput(_)
            | AppError::InvalidRequest(_)
            | AppError::PayloadTooLarge(_) => {
                warn!(error = %self, "Rejected request");
            }
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classes() {
        assert_eq!(
            AppError::MissingImageInput(MissingInput::File).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InvalidRequest("nope".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::CaptionGenerationFailed(UpstreamError::Malformed("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_body_errors_keep_length_limit_apart() {
        let err = AppError::from_body_error(StatusCode::PAYLOAD_TOO_LARGE, "length limit".into());
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.public_message(), "Image exceeds the upload size limit");

        let err = AppError::from_body_error(StatusCode::BAD_REQUEST, "bad boundary".into());
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[test]
    fn test_public_message_hides_upstream_details() {
        let err = AppError::ImageUploadFailed(UpstreamError::Status {
            status: 401,
            body: "invalid api_secret".to_string(),
        });
        assert_eq!(err.public_message(), "Failed to upload image");
    }
}
