//! Client side of the image privacy-analysis backend.

pub mod client;
pub mod error;
pub mod pii;

use std::sync::Arc;

use base64::Engine;
use serde::Deserialize;

pub use client::AnalysisClient;
pub use error::AnalysisError;

pub const NO_DESCRIPTION: &str = "No description available.";
pub const NO_ANALYSIS: &str = "No analysis available.";

/// An image picked by the user, kept in memory until it is replaced or cleared
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Arc<[u8]>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    /// `data:` URL suitable for an `<img src>` preview.
    pub fn preview_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Guess an image MIME type from a file name; unknown extensions fall back
/// to `application/octet-stream`.
pub fn mime_for_file_name(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub image: ImageUpload,
    pub prompt: String,
}

/// Text returned by a successful analysis, placeholders already applied
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub description: String,
    pub analysis: String,
}

/// Body of a 2xx `/analyze` response
#[derive(Debug, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub image_description: Option<String>,
    #[serde(default)]
    pub privacy_analysis: Option<String>,
    /// Backend's own verdict; logged, but rendering uses [`pii::classify`].
    #[serde(default)]
    pub pii_detected: Option<bool>,
}

impl From<AnalyzeResponse> for AnalysisResult {
    fn from(response: AnalyzeResponse) -> Self {
        fn or_placeholder(value: Option<String>, placeholder: &str) -> String {
            value
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| placeholder.to_string())
        }
        Self {
            description: or_placeholder(response.image_description, NO_DESCRIPTION),
            analysis: or_placeholder(response.privacy_analysis, NO_ANALYSIS),
        }
    }
}

/// Body of a non-2xx `/analyze` response
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_for_missing_fields() {
        let result: AnalysisResult = serde_json::from_str::<AnalyzeResponse>("{}")
            .unwrap()
            .into();
        assert_eq!(result.description, NO_DESCRIPTION);
        assert_eq!(result.analysis, NO_ANALYSIS);

        let result: AnalysisResult = serde_json::from_str::<AnalyzeResponse>(
            r#"{"image_description":"A cat","privacy_analysis":"","pii_detected":false}"#,
        )
        .unwrap()
        .into();
        assert_eq!(result.description, "A cat");
        assert_eq!(result.analysis, NO_ANALYSIS);
    }

    #[test]
    fn test_preview_data_url() {
        let image = ImageUpload::new("dot.png", "image/png", vec![1, 2, 3]);
        assert_eq!(image.preview_data_url(), "data:image/png;base64,AQID");
    }

    #[test]
    fn test_mime_for_file_name() {
        assert_eq!(mime_for_file_name("scan.JPG"), "image/jpeg");
        assert_eq!(mime_for_file_name("a.b.png"), "image/png");
        assert_eq!(mime_for_file_name("README"), "application/octet-stream");
    }
}
