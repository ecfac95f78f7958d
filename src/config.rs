use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_CAPTION_MODEL: &str = "llama-3.2-90b-text-preview";
pub const DEFAULT_VISION_MODEL: &str = "llama-3.2-11b-vision-preview";
pub const DEFAULT_CLOUDINARY_BASE_URL: &str = "https://api.cloudinary.com/v1_1";
pub const DEFAULT_CLOUDINARY_FOLDER: &str = "caption-generator";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment or .env file")]
    Missing(&'static str),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error(
        "CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET must be set together"
    )]
    PartialCloudinary,
}

#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub base_url: String,
    pub api_key: String,
    pub caption_model: String,
    pub vision_model: String,
}

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub base_url: String,
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub max_upload_bytes: usize,
    pub completion: CompletionConfig,
    /// `None` when no image host credentials are configured; uploads then fail.
    pub cloudinary: Option<CloudinaryConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset.
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("GROQ_API_KEY").ok_or(ConfigError::Missing("GROQ_API_KEY"))?;
        let completion = CompletionConfig {
            base_url: trim_base_url(or_default(get("GROQ_BASE_URL"), DEFAULT_GROQ_BASE_URL)),
            api_key,
            caption_model: or_default(get("CAPTION_MODEL"), DEFAULT_CAPTION_MODEL),
            vision_model: or_default(get("VISION_MODEL"), DEFAULT_VISION_MODEL),
        };

        let cloudinary = match (
            get("CLOUDINARY_CLOUD_NAME"),
            get("CLOUDINARY_API_KEY"),
            get("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryConfig {
                base_url: trim_base_url(or_default(
                    get("CLOUDINARY_BASE_URL"),
                    DEFAULT_CLOUDINARY_BASE_URL,
                )),
                cloud_name,
                api_key,
                api_secret,
                folder: or_default(get("CLOUDINARY_FOLDER"), DEFAULT_CLOUDINARY_FOLDER),
            }),
            (None, None, None) => None,
            _ => return Err(ConfigError::PartialCloudinary),
        };

        let bind_addr = or_default(get("BIND_ADDR"), DEFAULT_BIND_ADDR)
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(raw) => raw.parse::<usize>().map_err(|e| ConfigError::Invalid {
                key: "MAX_UPLOAD_BYTES",
                reason: e.to_string(),
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            bind_addr,
            max_upload_bytes,
            completion,
            cloudinary,
        })
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    value.unwrap_or_else(|| default.to_string())
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
