//! Service client — the single point of contact with the remote generation service.
//!
//! Every pipeline action performs exactly one exchange through this module.
//! No retries: a failed exchange is reported once and left to the user.
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::errors::ServiceError;
use crate::models::wire::{
    GenerateRequest, GenerateResponse, LoadSourceResponse, ReanalyzeSkillsRequest,
    ReanalyzeSkillsResponse, RegenerateSkillsRequest, RegenerateSkillsResponse, ReoptimizeRequest,
    ReoptimizeResponse, SaveSourceRequest, SaveSourceResponse,
};

const GENERATE_ENDPOINT: &str = "/generate_resume";
const REOPTIMIZE_ENDPOINT: &str = "/reoptimize_resume";
const REANALYZE_SKILLS_ENDPOINT: &str = "/reanalyze_skills";
const REGENERATE_SKILLS_ENDPOINT: &str = "/regenerate_skills_latex";
const SAVE_SOURCE_ENDPOINT: &str = "/save_main_resume";
const LOAD_SOURCE_ENDPOINT: &str = "/get_main_resume";
const LOGIN_ENDPOINT: &str = "/login";
const DOWNLOAD_PREFIX: &str = "/download_latex/";

// ────────────────────────────────────────────────────────────────────────────
// Trait definitions
// ────────────────────────────────────────────────────────────────────────────

/// The generation/analysis endpoints. Implement this to run the pipeline
/// against something other than the HTTP service.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ServiceError>;

    async fn reoptimize(
        &self,
        request: &ReoptimizeRequest,
    ) -> Result<ReoptimizeResponse, ServiceError>;

    async fn reanalyze_skills(
        &self,
        request: &ReanalyzeSkillsRequest,
    ) -> Result<ReanalyzeSkillsResponse, ServiceError>;

    async fn regenerate_skills_section(
        &self,
        request: &RegenerateSkillsRequest,
    ) -> Result<RegenerateSkillsResponse, ServiceError>;
}

/// Key-value persistence of the source document.
#[async_trait]
pub trait SourceStore: Send + Sync {
    async fn save_source(&self, request: &SaveSourceRequest)
        -> Result<SaveSourceResponse, ServiceError>;

    async fn load_source(&self) -> Result<LoadSourceResponse, ServiceError>;
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ServiceClient {
    client: Client,
    base_url: String,
    timeout_secs: u64,
}

impl ServiceClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Stable reference for downloading a generated document. Not fetched here.
    pub fn download_reference(&self, resume_id: &str) -> String {
        download_reference(&self.base_url, resume_id)
    }

    /// Fetches the document behind a download reference.
    pub async fn download(&self, reference: &str) -> Result<String, ServiceError> {
        let response = self
            .client
            .get(reference)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(|e| self.transport_error(e))
    }

    /// Posts the service passcode; the session cookie is kept by the client.
    pub async fn login(&self, passcode: &str) -> Result<(), ServiceError> {
        let response = self
            .client
            .post(self.url(LOGIN_ENDPOINT))
            .form(&[("passcode", passcode)])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let status = response.status();
        debug!("Login responded with {status}");
        if status.is_success() || status.is_redirection() {
            Ok(())
        } else {
            Err(ServiceError::Status {
                status: status.as_u16(),
            })
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Sends one request and decodes the structured body.
    async fn exchange<R: DeserializeOwned>(&self, request: RequestBuilder) -> Result<R, ServiceError> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("Service returned {status}: {body}");
            return Err(ServiceError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        decode_body(&body)
    }

    fn transport_error(&self, e: reqwest::Error) -> ServiceError {
        if e.is_timeout() {
            ServiceError::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            ServiceError::Network(e)
        }
    }
}

#[async_trait]
impl GenerationService for ServiceClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ServiceError> {
        debug!("POST {GENERATE_ENDPOINT}");
        self.exchange(self.client.post(self.url(GENERATE_ENDPOINT)).form(request))
            .await
    }

    async fn reoptimize(
        &self,
        request: &ReoptimizeRequest,
    ) -> Result<ReoptimizeResponse, ServiceError> {
        debug!("POST {REOPTIMIZE_ENDPOINT}");
        self.exchange(self.client.post(self.url(REOPTIMIZE_ENDPOINT)).form(request))
            .await
    }

    async fn reanalyze_skills(
        &self,
        request: &ReanalyzeSkillsRequest,
    ) -> Result<ReanalyzeSkillsResponse, ServiceError> {
        debug!("POST {REANALYZE_SKILLS_ENDPOINT}");
        self.exchange(
            self.client
                .post(self.url(REANALYZE_SKILLS_ENDPOINT))
                .form(request),
        )
        .await
    }

    async fn regenerate_skills_section(
        &self,
        request: &RegenerateSkillsRequest,
    ) -> Result<RegenerateSkillsResponse, ServiceError> {
        debug!("POST {REGENERATE_SKILLS_ENDPOINT}");
        self.exchange(
            self.client
                .post(self.url(REGENERATE_SKILLS_ENDPOINT))
                .json(request),
        )
        .await
    }
}

#[async_trait]
impl SourceStore for ServiceClient {
    async fn save_source(
        &self,
        request: &SaveSourceRequest,
    ) -> Result<SaveSourceResponse, ServiceError> {
        self.exchange(self.client.post(self.url(SAVE_SOURCE_ENDPOINT)).json(request))
            .await
    }

    async fn load_source(&self) -> Result<LoadSourceResponse, ServiceError> {
        self.exchange(self.client.get(self.url(LOAD_SOURCE_ENDPOINT)))
            .await
    }
}

pub fn download_reference(base_url: &str, resume_id: &str) -> String {
    format!(
        "{}{}{}",
        base_url.trim_end_matches('/'),
        DOWNLOAD_PREFIX,
        resume_id
    )
}

/// Decodes a success body: must be a JSON object; a non-empty `error` field
/// wins over everything else.
pub(crate) fn decode_body<R: DeserializeOwned>(body: &str) -> Result<R, ServiceError> {
    let value: Value = serde_json::from_str(body).map_err(|_| ServiceError::InvalidResponse)?;

    let Value::Object(map) = &value else {
        return Err(ServiceError::InvalidResponse);
    };

    match map.get("error") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => {}
        Some(Value::String(message)) if message.is_empty() => {}
        Some(Value::String(message)) => return Err(ServiceError::Service(message.clone())),
        Some(other) => return Err(ServiceError::Service(other.to_string())),
    }

    serde_json::from_value(value).map_err(|_| ServiceError::InvalidResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_body_error_field_wins() {
        let result: Result<ReoptimizeResponse, _> =
            decode_body(r#"{"error": "rate limited", "latex_code": "X"}"#);
        assert!(matches!(result, Err(ServiceError::Service(m)) if m == "rate limited"));
    }

    #[test]
    fn test_decode_body_empty_error_is_ignored() {
        let result: ReoptimizeResponse = decode_body(r#"{"error": "", "latex_code": "X"}"#).unwrap();
        assert_eq!(result.latex_code.as_deref(), Some("X"));
    }

    #[test]
    fn test_decode_body_structured_error_is_stringified() {
        let result: Result<ReoptimizeResponse, _> =
            decode_body(r#"{"error": {"code": "LLM_ERROR"}}"#);
        assert!(matches!(result, Err(ServiceError::Service(m)) if m.contains("LLM_ERROR")));
    }

    #[test]
    fn test_decode_body_rejects_non_json() {
        let result: Result<GenerateResponse, _> = decode_body("<html>login</html>");
        assert!(matches!(result, Err(ServiceError::InvalidResponse)));
    }

    #[test]
    fn test_decode_body_rejects_non_object() {
        let result: Result<GenerateResponse, _> = decode_body("[1, 2]");
        assert!(matches!(result, Err(ServiceError::InvalidResponse)));
    }

    #[test]
    fn test_download_reference_joins_cleanly() {
        assert_eq!(
            download_reference("http://localhost:5000/", "r1"),
            "http://localhost:5000/download_latex/r1"
        );
    }
}
