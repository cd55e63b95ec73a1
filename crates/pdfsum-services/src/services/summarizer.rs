// HTTP client for the external summarization service

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use pdfsum_core::models::{Language, SummaryStyle};
use pdfsum_core::SummarizerConfig;

/// Everything needed for one `/summarize` call
#[derive(Debug, Clone)]
pub struct SummarizeRequest {
    pub file_bytes: Vec<u8>,
    pub filename: String,
    pub language: Language,
    pub style: SummaryStyle,
}

/// Failure kinds of a summarizer call. The message of each variant is what ends
/// up in the summary's error metadata.
#[derive(Debug, thiserror::Error)]
pub enum SummarizerError {
    #[error("AI request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Failed to read AI response: {0}")]
    ReadBody(#[source] reqwest::Error),

    #[error("AI service error: {detail}")]
    Status { status: u16, detail: String },

    #[error("Invalid AI JSON response: {0}")]
    InvalidJson(#[source] serde_json::Error),
}

impl SummarizerError {
    /// Short label used as the audit message.
    pub fn kind(&self) -> &'static str {
        match self {
            SummarizerError::Request(_) => "AI request failed",
            SummarizerError::ReadBody(_) => "Failed to read AI response",
            SummarizerError::Status { .. } => "AI service error",
            SummarizerError::InvalidJson(_) => "Invalid AI JSON response",
        }
    }

    /// Error text without the label.
    pub fn detail(&self) -> String {
        match self {
            SummarizerError::Request(e) | SummarizerError::ReadBody(e) => e.to_string(),
            SummarizerError::Status { detail, .. } => detail.clone(),
            SummarizerError::InvalidJson(e) => e.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct SummarizerClient {
    http_client: Client,
    base_url: String,
}

impl Debug for SummarizerClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SummarizerClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl SummarizerClient {
    pub fn new(config: &SummarizerConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to create HTTP client for summarizer")?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/summarize", self.base_url)
    }

    /// POST the document and return the parsed JSON body.
    #[tracing::instrument(skip(self, request), fields(filename = %request.filename, size_bytes = request.file_bytes.len()))]
    pub async fn summarize(
        &self,
        request: SummarizeRequest,
    ) -> std::result::Result<serde_json::Value, SummarizerError> {
        let file_part = Part::bytes(request.file_bytes)
            .file_name(request.filename)
            .mime_str("application/pdf")
            .map_err(SummarizerError::Request)?;

        let form = Form::new()
            .text("language", request.language.to_string())
            .text("style", request.style.to_string())
            .part("file", file_part);

        let response = self
            .http_client
            .post(self.endpoint())
            .multipart(form)
            .send()
            .await
            .map_err(SummarizerError::Request)?;

        let status = response.status();
        let body = response.text().await.map_err(SummarizerError::ReadBody)?;

        if !status.is_success() {
            let trimmed = body.trim();
            let detail = if trimmed.is_empty() {
                format!("AI returned status {}", status.as_u16())
            } else {
                trimmed.to_string()
            };
            return Err(SummarizerError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        serde_json::from_str(&body).map_err(SummarizerError::InvalidJson)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(url: &str) -> SummarizerClient {
        SummarizerClient::new(&SummarizerConfig {
            base_url: format!("{}/", url),
            timeout_secs: 5,
            max_concurrent: 1,
            queue_size: 1,
        })
        .unwrap()
    }

    fn request() -> SummarizeRequest {
        SummarizeRequest {
            file_bytes: b"%PDF-1.7 body".to_vec(),
            filename: "report.pdf".to_string(),
            language: Language::Jp,
            style: SummaryStyle::Professional,
        }
    }

    #[tokio::test]
    async fn test_summarize_posts_multipart_form() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/summarize")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=".to_string()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="language"\r\n\r\nJP"#.to_string()),
                Matcher::Regex(r#"name="style"\r\n\r\nprofessional"#.to_string()),
                Matcher::Regex(r#"name="file"; filename="report.pdf""#.to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"content":"hello","model":"m-1"}"#)
            .create_async()
            .await;

        let body = client_for(&server.url()).summarize(request()).await.unwrap();
        assert_eq!(body["content"], "hello");
        assert_eq!(body["model"], "m-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_carries_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/summarize")
            .with_status(502)
            .with_body("  upstream exploded \n")
            .create_async()
            .await;

        let err = client_for(&server.url())
            .summarize(request())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "AI service error");
        assert_eq!(err.detail(), "upstream exploded");
        assert!(matches!(err, SummarizerError::Status { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_non_success_status_with_empty_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/summarize")
            .with_status(500)
            .create_async()
            .await;

        let err = client_for(&server.url())
            .summarize(request())
            .await
            .unwrap_err();
        assert_eq!(err.detail(), "AI returned status 500");
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/summarize")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = client_for(&server.url())
            .summarize(request())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "Invalid AI JSON response");
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client = client_for("http://localhost:8000");
        assert_eq!(client.endpoint(), "http://localhost:8000/summarize");
    }
}
