use std::sync::{atomic::AtomicUsize, Arc};

use axum::{
    body::Bytes,
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, DefaultBodyLimit, FromRequest,
        Multipart, Request, State,
    },
    http::{header::CONTENT_TYPE, HeaderMap},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, info_span, warn};

use crate::{
    caption::{CaptionGenerator, CaptionRequest},
    completion::{ChatCompletions, HttpChatClient},
    config::Config,
    error::{AppError, MissingInput, UpstreamError},
    host::{CloudinaryHost, ImageHost},
    image::{read_uploaded_image, ImageReference, ImageUrlRequest},
    page,
    vision::ImageDescriber,
};

/// Everything a handler needs, built once at startup and shared read-only.
#[derive(Clone)]
pub struct AppState {
    pub captions: CaptionGenerator,
    pub describer: ImageDescriber,
    pub host: Option<Arc<dyn ImageHost>>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        let http = reqwest::Client::new();
        let completions: Arc<dyn ChatCompletions> =
            Arc::new(HttpChatClient::new(http.clone(), &config.completion));

        let host = match &config.cloudinary {
            Some(cloudinary) => {
                Some(Arc::new(CloudinaryHost::new(http, cloudinary.clone())) as Arc<dyn ImageHost>)
            }
            None => {
                warn!("Cloudinary credentials not set, /upload-image will fail");
                None
            }
        };

        Self {
            captions: CaptionGenerator::new(completions.clone(), &config.completion.caption_model),
            describer: ImageDescriber::new(completions, &config.completion.vision_model),
            host,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DescriptionResponse {
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CaptionResponse {
    pub caption: String,
}

pub fn app(state: AppState, max_upload_bytes: usize) -> Router {
    let counter = Arc::new(AtomicUsize::new(0));

    Router::new()
        .route("/", get(page::index))
        .route("/analyze-image", post(analyze_image))
        .route("/upload-image", post(upload_image))
        .route("/generate-caption", post(generate_caption))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http().make_span_with(move |request: &Request| {
                let req_id = counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                info_span!(
                    "http_request",
                    req_id,
                    method = ?request.method(),
                    path = ?request.uri(),
                )
            }),
        )
        .with_state(Arc::new(state))
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false)
}

/// Accepts a multipart `image` upload (inlined as base64) or JSON `{ imageUrl }`.
async fn analyze_image(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<DescriptionResponse>, AppError> {
    let reference = if is_multipart(request.headers()) {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| AppError::from_body_error(e.status(), e.body_text()))?;
        ImageReference::from(read_uploaded_image(multipart).await?)
    } else {
        let body = Bytes::from_request(request, &state)
            .await
            .map_err(|e| AppError::from_body_error(e.status(), e.body_text()))?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(AppError::MissingImageInput(MissingInput::File));
        }
        serde_json::from_slice::<ImageUrlRequest>(&body)
            .map_err(|e| AppError::InvalidRequest(format!("Invalid JSON body: {e}")))?
            .into_reference()?
    };

    let description = state.describer.describe(&reference).await?;
    Ok(Json(DescriptionResponse { description }))
}

async fn upload_image(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let multipart = multipart.map_err(|e| {
        warn!(error = %e.body_text(), "Upload without a multipart body");
        AppError::MissingImageInput(MissingInput::File)
    })?;
    let image = read_uploaded_image(multipart).await?;

    let host = state
        .host
        .as_ref()
        .ok_or_else(|| AppError::ImageUploadFailed(UpstreamError::NotConfigured("image host")))?;
    let image_url = host.upload(image).await.map_err(AppError::ImageUploadFailed)?;

    Ok(Json(UploadResponse { image_url }))
}

async fn generate_caption(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CaptionRequest>, JsonRejection>,
) -> Result<Json<CaptionResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    request.validate()?;

    info!(category = %request.category, vibes = request.vibes.len(), "Generating caption");
    let result = state.captions.generate(&request).await?;

    Ok(Json(CaptionResponse {
        caption: result.text,
    }))
}
