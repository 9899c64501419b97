//! Backend endpoint configuration
//!
//! One entry per backend content service, loaded from environment
//! variables with local-stack defaults.

use std::env;

use url::Url;

/// Endpoints and names of the backend content services
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Display name of the published-content source, used in errors and logs
    pub content_source_name: String,
    /// Batched read endpoint of the published-content source
    pub content_source_url: String,
    /// Display name of the internal-content source
    pub internal_source_name: String,
    /// Batched read endpoint of the internal-content source
    pub internal_source_url: String,
    /// Display name of the native source
    pub native_source_name: String,
    /// Per-item read endpoint of the native source; the identity is appended
    pub native_source_url: String,
    /// Basic auth credentials for the native source
    pub native_source_auth: String,
    /// Display name of the transform source
    pub transform_source_name: String,
    /// Transform endpoint taking a native payload and returning content
    pub transform_source_url: String,
}

impl ReaderConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            content_source_name: env::var("CONTENT_SOURCE_NAME")
                .unwrap_or_else(|_| "content-store-api".to_string()),
            content_source_url: env::var("CONTENT_SOURCE_URL")
                .unwrap_or_else(|_| "http://localhost:8081/content".to_string()),
            internal_source_name: env::var("INTERNAL_CONTENT_SOURCE_NAME")
                .unwrap_or_else(|_| "internal-store-api".to_string()),
            internal_source_url: env::var("INTERNAL_CONTENT_SOURCE_URL")
                .unwrap_or_else(|_| "http://localhost:8082/internalcontent".to_string()),
            native_source_name: env::var("NATIVE_CONTENT_SOURCE_NAME")
                .unwrap_or_else(|_| "native-store-api".to_string()),
            native_source_url: env::var("NATIVE_CONTENT_SOURCE_URL")
                .unwrap_or_else(|_| "http://localhost:8083/native/".to_string()),
            native_source_auth: env::var("NATIVE_CONTENT_SOURCE_AUTH").unwrap_or_default(),
            transform_source_name: env::var("TRANSFORM_CONTENT_SOURCE_NAME")
                .unwrap_or_else(|_| "transform-api".to_string()),
            transform_source_url: env::var("TRANSFORM_CONTENT_SOURCE_URL")
                .unwrap_or_else(|_| "http://localhost:8084/transform".to_string()),
        }
    }

    /// Validate that every configured endpoint is a parseable URL
    pub fn validate(&self) -> Result<(), String> {
        for (name, url) in [
            (&self.content_source_name, &self.content_source_url),
            (&self.internal_source_name, &self.internal_source_url),
            (&self.native_source_name, &self.native_source_url),
            (&self.transform_source_name, &self.transform_source_url),
        ] {
            Url::parse(url).map_err(|err| format!("invalid URL for {}: {}", name, err))?;
        }
        Ok(())
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            content_source_name: "content-store-api".to_string(),
            content_source_url: "http://localhost:8081/content".to_string(),
            internal_source_name: "internal-store-api".to_string(),
            internal_source_url: "http://localhost:8082/internalcontent".to_string(),
            native_source_name: "native-store-api".to_string(),
            native_source_url: "http://localhost:8083/native/".to_string(),
            native_source_auth: String::new(),
            transform_source_name: "transform-api".to_string(),
            transform_source_url: "http://localhost:8084/transform".to_string(),
        }
    }
}
