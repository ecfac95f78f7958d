use axum::extract::Multipart;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, MissingInput};

/// Multipart field carrying the uploaded file.
pub const IMAGE_FIELD: &str = "image";

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// A user-supplied file, read fully into memory and otherwise untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    pub media_type: String,
    pub file_name: Option<String>,
}

/// What the vision model is pointed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageReference {
    Inline { bytes: Vec<u8>, media_type: String },
    Remote { url: String },
}

impl ImageReference {
    /// Data URI for inline images, the URL itself for remote ones.
    pub fn to_url(&self) -> String {
        match self {
            ImageReference::Inline { bytes, media_type } => format!(
                "data:{};base64,{}",
                media_type,
                general_purpose::STANDARD.encode(bytes)
            ),
            ImageReference::Remote { url } => url.clone(),
        }
    }
}

impl From<UploadedImage> for ImageReference {
    fn from(image: UploadedImage) -> Self {
        ImageReference::Inline {
            bytes: image.bytes,
            media_type: image.media_type,
        }
    }
}

/// JSON variant of `POST /analyze-image`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageUrlRequest {
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
}

impl ImageUrlRequest {
    /// Passed through unchanged; reachability is the model's problem.
    pub fn into_reference(self) -> Result<ImageReference, AppError> {
        match self.image_url {
            Some(url) if !url.trim().is_empty() => Ok(ImageReference::Remote { url }),
            _ => Err(AppError::MissingImageInput(MissingInput::Url)),
        }
    }
}

/// Pulls the `image` field out of a multipart body. Other fields are ignored.
pub async fn read_uploaded_image(mut multipart: Multipart) -> Result<UploadedImage, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::from_body_error(e.status(), format!("Malformed multipart body: {e}"))
    })? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let declared = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            AppError::from_body_error(e.status(), format!("Could not read image field: {e}"))
        })?;

        if bytes.is_empty() {
            break;
        }

        let media_type = resolve_media_type(declared.as_deref(), file_name.as_deref());
        debug!(size = bytes.len(), %media_type, "Received image upload");

        return Ok(UploadedImage {
            bytes: bytes.to_vec(),
            media_type,
            file_name,
        });
    }

    Err(AppError::MissingImageInput(MissingInput::File))
}

fn resolve_media_type(declared: Option<&str>, file_name: Option<&str>) -> String {
    match declared {
        Some(declared) if !declared.trim().is_empty() => declared.to_string(),
        _ => file_name
            .and_then(|name| mime_guess::from_path(name).first())
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_else(|| FALLBACK_MEDIA_TYPE.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_reference_is_data_uri() {
        let reference = ImageReference::from(UploadedImage {
            bytes: b"abc".to_vec(),
            media_type: "image/png".to_string(),
            file_name: None,
        });
        assert_eq!(reference.to_url(), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_remote_reference_passes_through() {
        let reference = ImageUrlRequest {
            image_url: Some("not even a url".to_string()),
        }
        .into_reference()
        .unwrap();
        assert_eq!(reference.to_url(), "not even a url");
    }

    #[test]
    fn test_blank_url_is_missing_input() {
        for image_url in [None, Some("   ".to_string())] {
            let err = ImageUrlRequest { image_url }.into_reference().unwrap_err();
            assert!(matches!(err, AppError::MissingImageInput(MissingInput::Url)));
        }
    }

    #[test]
    fn test_media_type_resolution() {
        assert_eq!(resolve_media_type(Some("image/webp"), Some("a.png")), "image/webp");
        assert_eq!(resolve_media_type(None, Some("photo.JPG")), "image/jpeg");
        assert_eq!(resolve_media_type(Some(""), None), FALLBACK_MEDIA_TYPE);
    }
}
