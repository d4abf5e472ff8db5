use std::time::Duration;

use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

use crate::analysis::error::BACKEND_FALLBACK_ERROR;
use crate::analysis::{
    AnalysisError, AnalysisRequest, AnalysisResult, AnalyzeResponse, ErrorResponse,
};
use crate::config::BackendConfig;

/// HTTP client for the analysis backend (`/health`, `/analyze`)
#[derive(Clone)]
pub struct AnalysisClient {
    client: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
    health_timeout: Duration,
}

impl AnalysisClient {
    pub fn new(config: &BackendConfig) -> Self {
        Self::with_base_url(
            config.effective_base_url(),
            config.request_timeout(),
            config.health_timeout(),
        )
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        request_timeout: Duration,
        health_timeout: Duration,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout,
            health_timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Liveness check. Any 2xx counts as healthy.
    pub async fn health(&self) -> Result<(), AnalysisError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(self.health_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::Unhealthy(status));
        }
        Ok(())
    }

    /// Upload the image and prompt as multipart and return the analysis text.
    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, AnalysisError> {
        let url = format!("{}/analyze", self.base_url);

        let image = Part::bytes(request.image.bytes.to_vec())
            .file_name(request.image.file_name.clone())
            .mime_str(&request.image.mime)?;
        let form = Form::new()
            .part("image", image)
            .text("prompt", request.prompt.clone());

        debug!(
            "Sending {} ({} bytes) to {}",
            request.image.file_name,
            request.image.bytes.len(),
            url
        );

        let response = self
            .client
            .post(&url)
            .timeout(self.request_timeout)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let error: ErrorResponse = serde_json::from_slice(&body).map_err(|e| {
                AnalysisError::Malformed(format!("error body for status {status}: {e}"))
            })?;
            let message = error
                .error
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| BACKEND_FALLBACK_ERROR.to_string());
            warn!("Analysis backend returned {}: {}", status, message);
            return Err(AnalysisError::Backend(message));
        }

        let parsed: AnalyzeResponse = serde_json::from_slice(&body)
            .map_err(|e| AnalysisError::Malformed(e.to_string()))?;
        if let Some(flag) = parsed.pii_detected {
            debug!("Backend pii_detected flag: {}", flag);
        }

        Ok(parsed.into())
    }
}
