//! Surmado API client.

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::{field_message, Result, SurmadoError};
use crate::models::{
    ListReportsQuery, ScanRequest, ScanRerunRequest, SignalRequest, SignalRerunRequest,
    SolutionsRequest,
};
use crate::utils::{self, Clock, HttpClient, ReportFetcher, TokioClock, WaitOptions};

/// Production API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.surmado.com/v1";

/// Environment variable read when no API key is passed explicitly
pub const API_KEY_ENV: &str = "SURMADO_API_KEY";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the Surmado API.
///
/// Every method sends exactly one request (except [`Surmado::wait_for_report`],
/// which polls) and classifies the response status into a [`SurmadoError`].
/// Transport errors are returned unchanged as [`SurmadoError::Http`].
///
/// ```rust,no_run
/// use surmado::models::{SignalContext, SignalRequest};
/// use surmado::Surmado;
///
/// # #[tokio::main]
/// # async fn main() -> surmado::Result<()> {
/// let client = Surmado::new(None)?; // reads SURMADO_API_KEY
/// let context = SignalContext::new(
///     "B2B SaaS",
///     "United States",
///     "CTOs at mid-market companies",
///     "Integration challenges, lack of visibility",
///     "Modern, dev-focused tooling",
///     "Asana, Monday.com",
/// );
/// let request = SignalRequest::new("https://acme.com", "Acme Corp", "you@acme.com", context);
/// let created = client.signal(&request).await?;
/// println!("Report ID: {}", created["report_id"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Surmado {
    http: HttpClient,
    base_url: String,
    timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl Surmado {
    /// Create a client with the default base URL and timeout.
    ///
    /// Falls back to `SURMADO_API_KEY` when `api_key` is `None`; fails with
    /// [`SurmadoError::Authentication`] if neither provides a key.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let mut builder = Self::builder();
        if let Some(key) = api_key {
            builder = builder.api_key(key);
        }
        builder.build()
    }

    pub fn builder() -> SurmadoBuilder {
        SurmadoBuilder::default()
    }

    /// Create a client from loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = Self::builder()
            .base_url(config.base_url.clone())
            .timeout(Duration::from_secs(config.timeout_secs));
        if let Some(ref key) = config.api_key {
            builder = builder.api_key(key.clone());
        }
        builder.build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // ========== FULL REPORTS ==========

    /// Run an AI Visibility Test (Signal).
    ///
    /// The response carries `report_id`, `status` and a `token` that can be
    /// passed to [`Surmado::solutions`].
    pub async fn signal(&self, request: &SignalRequest) -> Result<Value> {
        self.post("/reports/signal", &request.to_payload()?).await
    }

    /// Run an SEO Audit (Scan).
    pub async fn scan(&self, request: &ScanRequest) -> Result<Value> {
        self.post("/reports/scan", &request.to_payload()?).await
    }

    /// Run Strategic Advisory (Solutions).
    ///
    /// Without a signal token every standalone context field must be set; if
    /// one is missing this fails with [`SurmadoError::Validation`] and no
    /// request is sent.
    pub async fn solutions(&self, request: &SolutionsRequest) -> Result<Value> {
        let payload = request.to_payload()?;
        self.post("/reports/solutions", &payload).await
    }

    // ========== RERUNS ==========

    /// Re-run a Signal report from stored brand and persona context.
    pub async fn signal_rerun(&self, request: &SignalRerunRequest) -> Result<Value> {
        self.post("/reports/signal/rerun", &request.to_payload()?).await
    }

    /// Re-run a Scan report from stored brand context.
    pub async fn scan_rerun(&self, request: &ScanRerunRequest) -> Result<Value> {
        self.post("/reports/scan/rerun", &request.to_payload()?).await
    }

    // ========== STATUS & LISTING ==========

    /// Get report status, with signed download URLs once completed.
    pub async fn get_report(&self, report_id: &str) -> Result<Value> {
        let path = format!("/reports/{}", urlencoding::encode(report_id));
        self.get(&path, &[]).await
    }

    /// List reports for the organization, one page at a time.
    pub async fn list_reports(&self, query: ListReportsQuery) -> Result<Value> {
        self.get(
            "/reports",
            &[
                ("page", query.page.to_string()),
                ("page_size", query.page_size.to_string()),
            ],
        )
        .await
    }

    /// Poll a report until it completes.
    ///
    /// Failed and cancelled reports, and reports still running when
    /// `options.timeout` passes, end in [`SurmadoError::Api`].
    pub async fn wait_for_report(&self, report_id: &str, options: &WaitOptions) -> Result<Value> {
        utils::wait_for_report(self, self.clock.as_ref(), report_id, options).await
    }

    // ========== HTTP ==========

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, path: &str, payload: &Map<String, Value>) -> Result<Value> {
        tracing::debug!("POST {}", path);
        let response = self
            .http
            .client()
            .post(self.url(path))
            .json(payload)
            .send()
            .await?;
        handle_response(response).await
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        tracing::debug!("GET {}", path);
        let mut request = self.http.client().get(self.url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await?;
        handle_response(response).await
    }
}

#[async_trait]
impl ReportFetcher for Surmado {
    async fn fetch_report(&self, report_id: &str) -> Result<Value> {
        self.get_report(report_id).await
    }
}

/// Builder for [`Surmado`]
#[derive(Debug, Default)]
pub struct SurmadoBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    clock: Option<Arc<dyn Clock>>,
}

impl SurmadoBuilder {
    /// API key (`sur_live_...` or `sur_test_...`)
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Time source used by [`Surmado::wait_for_report`]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<Surmado> {
        let api_key = self
            .api_key
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()))
            .ok_or_else(SurmadoError::missing_api_key)?;

        let base_url = self
            .base_url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);

        tracing::debug!("Creating Surmado client for {}", base_url);

        Ok(Surmado {
            http: HttpClient::new(&api_key, timeout)?,
            base_url,
            timeout,
            clock: self.clock.unwrap_or_else(|| Arc::new(TokioClock::new())),
        })
    }
}

/// Parse a response body and map its status code to a result.
async fn handle_response(response: Response) -> Result<Value> {
    let status = response.status();
    let text = response.text().await?;
    tracing::debug!("Response status: {}", status);
    classify(status, &text)
}

/// Body parsing and status classification, shared by every call.
pub(crate) fn classify(status: StatusCode, text: &str) -> Result<Value> {
    let data: Value = serde_json::from_str(text).unwrap_or_else(|_| json!({ "error": text }));
    let code = status.as_u16();

    match code {
        401 => Err(SurmadoError::Authentication {
            message: "Invalid or missing API key".to_string(),
            status_code: Some(code),
            response: Some(data),
        }),
        402 => Err(SurmadoError::InsufficientCredits {
            message: field_message(&data, &["message"])
                .unwrap_or_else(|| "Insufficient credits".to_string()),
            status_code: Some(code),
            response: Some(data),
        }),
        404 => Err(SurmadoError::NotFound {
            message: field_message(&data, &["error"])
                .unwrap_or_else(|| "Resource not found".to_string()),
            status_code: Some(code),
            response: Some(data),
        }),
        422 => Err(SurmadoError::Validation {
            message: field_message(&data, &["detail", "error"])
                .unwrap_or_else(|| "Invalid request data".to_string()),
            status_code: Some(code),
            response: Some(data),
        }),
        c if c >= 400 => Err(SurmadoError::Api {
            message: field_message(&data, &["error"])
                .unwrap_or_else(|| format!("API error: {}", c)),
            status_code: Some(code),
            response: Some(data),
        }),
        _ => Ok(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_success_returns_body() {
        let body = classify(StatusCode::OK, r#"{"report_id": "rpt_1", "status": "queued"}"#)
            .unwrap();
        assert_eq!(body, json!({"report_id": "rpt_1", "status": "queued"}));
    }

    #[test]
    fn test_classify_success_non_json() {
        let body = classify(StatusCode::OK, "pong").unwrap();
        assert_eq!(body, json!({"error": "pong"}));
    }

    #[test]
    fn test_classify_401() {
        let err = classify(StatusCode::UNAUTHORIZED, r#"{"error": "bad key"}"#).unwrap_err();
        assert!(matches!(err, SurmadoError::Authentication { .. }));
        assert_eq!(err.message(), "Invalid or missing API key");
        assert_eq!(err.status_code(), Some(401));
        assert_eq!(err.response(), Some(&json!({"error": "bad key"})));
    }

    #[test]
    fn test_classify_402() {
        let err = classify(StatusCode::PAYMENT_REQUIRED, r#"{"message": "no credits"}"#)
            .unwrap_err();
        assert!(err.is_insufficient_credits());
        assert_eq!(err.message(), "no credits");
        assert_eq!(err.status_code(), Some(402));

        let err = classify(StatusCode::PAYMENT_REQUIRED, "{}").unwrap_err();
        assert_eq!(err.message(), "Insufficient credits");
    }

    #[test]
    fn test_classify_404() {
        let err = classify(StatusCode::NOT_FOUND, r#"{"error": "Report not found"}"#).unwrap_err();
        assert!(matches!(err, SurmadoError::NotFound { .. }));
        assert_eq!(err.message(), "Report not found");

        let err = classify(StatusCode::NOT_FOUND, "{}").unwrap_err();
        assert_eq!(err.message(), "Resource not found");
    }

    #[test]
    fn test_classify_422_prefers_detail() {
        let err = classify(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail": "url is invalid", "error": "validation"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SurmadoError::Validation { .. }));
        assert_eq!(err.message(), "url is invalid");

        let err = classify(StatusCode::UNPROCESSABLE_ENTITY, r#"{"error": "bad tier"}"#)
            .unwrap_err();
        assert_eq!(err.message(), "bad tier");

        let err = classify(StatusCode::UNPROCESSABLE_ENTITY, "{}").unwrap_err();
        assert_eq!(err.message(), "Invalid request data");
    }

    #[test]
    fn test_classify_422_structured_detail() {
        let err = classify(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail": [{"loc": ["body", "url"], "msg": "field required"}]}"#,
        )
        .unwrap_err();
        assert!(err.message().contains("field required"));
    }

    #[test]
    fn test_classify_generic() {
        let err = classify(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").unwrap_err();
        assert!(matches!(err, SurmadoError::Api { .. }));
        assert_eq!(err.message(), "upstream exploded");
        assert_eq!(err.response(), Some(&json!({"error": "upstream exploded"})));

        let err = classify(StatusCode::TOO_MANY_REQUESTS, "{}").unwrap_err();
        assert_eq!(err.message(), "API error: 429");
        assert_eq!(err.status_code(), Some(429));
    }

    #[test]
    fn test_classify_redirect_is_success() {
        let body = classify(StatusCode::NOT_MODIFIED, r#"{"ok": true}"#).unwrap();
        assert_eq!(body["ok"], true);
    }
}
