//! Report creation payloads.
//!
//! Each request type serializes to the JSON body of one endpoint. Required
//! fields are always sent; typed optional fields are sent only when set; the
//! `extra` map is merged in last so callers can pass fields this crate does
//! not model yet.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SurmadoError};

/// Signal (AI visibility test) tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalTier {
    /// 1 credit
    #[default]
    Basic,
    /// 2 credits
    Pro,
}

/// Scan (SEO audit) tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanTier {
    /// 1 credit
    #[default]
    Basic,
    /// 2 credits
    Premium,
}

/// Business scale hint for Signal reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessScale {
    Small,
    Medium,
    Large,
}

/// Scan report presentation style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStyle {
    Executive,
    Technical,
    Comprehensive,
}

/// Whether Solutions should include a financial analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncludeFinancial {
    Yes,
    No,
}

/// Business context every Signal report needs.
///
/// All six fields are sent with every request, so they are taken together
/// when the request is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalContext {
    /// Industry or sector (max 200 chars)
    pub industry: String,
    /// Primary market location (max 200 chars)
    pub location: String,
    /// Target customer description (max 800 chars)
    pub persona: String,
    /// Comma-separated problems the product solves (max 1000 chars)
    pub pain_points: String,
    /// Brand positioning (max 1200 chars)
    pub brand_details: String,
    /// Comma-separated competitor names (max 500 chars)
    pub direct_competitors: String,
}

impl SignalContext {
    pub fn new(
        industry: impl Into<String>,
        location: impl Into<String>,
        persona: impl Into<String>,
        pain_points: impl Into<String>,
        brand_details: impl Into<String>,
        direct_competitors: impl Into<String>,
    ) -> Self {
        Self {
            industry: industry.into(),
            location: location.into(),
            persona: persona.into(),
            pain_points: pain_points.into(),
            brand_details: brand_details.into(),
            direct_competitors: direct_competitors.into(),
        }
    }
}

/// Run an AI Visibility Test (Signal).
///
/// The nine required fields are constructor arguments; a request cannot be
/// built without its business context:
///
/// ```compile_fail
/// use surmado::models::SignalRequest;
///
/// let request = SignalRequest::new("https://acme.com", "Acme Corp", "you@acme.com");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalRequest {
    /// Website URL to analyze
    pub url: String,
    /// Brand name (max 100 chars)
    pub brand_name: String,
    /// Email for notifications
    pub email: String,
    #[serde(flatten)]
    pub context: SignalContext,
    pub tier: SignalTier,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indirect_competitors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_scale: Option<BusinessScale>,
    /// HTTPS URL that receives a POST when the report completes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,

    /// Additional fields merged into the body verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SignalRequest {
    pub fn new(
        url: impl Into<String>,
        brand_name: impl Into<String>,
        email: impl Into<String>,
        context: SignalContext,
    ) -> Self {
        Self {
            url: url.into(),
            brand_name: brand_name.into(),
            email: email.into(),
            context,
            tier: SignalTier::default(),
            indirect_competitors: None,
            keywords: None,
            product: None,
            business_scale: None,
            webhook_url: None,
            extra: Map::new(),
        }
    }

    pub fn tier(mut self, tier: SignalTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn indirect_competitors(mut self, competitors: impl Into<String>) -> Self {
        self.indirect_competitors = Some(competitors.into());
        self
    }

    pub fn keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = Some(keywords.into());
        self
    }

    pub fn product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    pub fn business_scale(mut self, scale: BusinessScale) -> Self {
        self.business_scale = Some(scale);
        self
    }

    pub fn webhook_url(mut self, webhook_url: impl Into<String>) -> Self {
        self.webhook_url = Some(webhook_url.into());
        self
    }

    /// Add an arbitrary field to the body
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// JSON body for `POST /reports/signal`
    pub fn to_payload(&self) -> Result<Map<String, Value>> {
        to_object(self)
    }
}

/// Run an SEO Audit (Scan).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanRequest {
    /// Website URL to audit
    pub url: String,
    /// Brand name (max 100 chars)
    pub brand_name: String,
    /// Email for notifications
    pub email: String,
    pub tier: ScanTier,

    /// Competitor sites to compare against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitor_urls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_style: Option<ReportStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,

    /// Additional fields merged into the body verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScanRequest {
    pub fn new(
        url: impl Into<String>,
        brand_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            brand_name: brand_name.into(),
            email: email.into(),
            ..Default::default()
        }
    }

    pub fn tier(mut self, tier: ScanTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn competitor_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.competitor_urls = Some(urls.into_iter().map(Into::into).collect());
        self
    }

    pub fn report_style(mut self, style: ReportStyle) -> Self {
        self.report_style = Some(style);
        self
    }

    pub fn webhook_url(mut self, webhook_url: impl Into<String>) -> Self {
        self.webhook_url = Some(webhook_url.into());
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// JSON body for `POST /reports/scan`
    pub fn to_payload(&self) -> Result<Map<String, Value>> {
        to_object(self)
    }
}

/// Run Strategic Advisory (Solutions).
///
/// Solutions works in one of two ways:
///
/// - **Signal token**: pass the `token` from a Signal report and the server
///   inherits its context. Only `email`, `signal_token` and, when set,
///   `scan_token` and `brand_name` are sent.
/// - **Standalone**: without a signal token, all six business context fields
///   (`brand_name`, `business_story`, `decision`, `success`, `timeline`,
///   `scale_indicator`) are required.
///
/// A scan token adds SEO context in either case.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolutionsRequest {
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_story: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_indicator: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_financial: Option<IncludeFinancial>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_revenue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_costs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_available: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,

    /// Additional fields merged into the body verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const STANDALONE_FIELDS_MESSAGE: &str = "Without signal_token, these fields are required: \
     brand_name, business_story, decision, success, timeline, scale_indicator";

impl SolutionsRequest {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }

    pub fn signal_token(mut self, token: impl Into<String>) -> Self {
        self.signal_token = Some(token.into());
        self
    }

    pub fn scan_token(mut self, token: impl Into<String>) -> Self {
        self.scan_token = Some(token.into());
        self
    }

    pub fn brand_name(mut self, brand_name: impl Into<String>) -> Self {
        self.brand_name = Some(brand_name.into());
        self
    }

    pub fn business_story(mut self, story: impl Into<String>) -> Self {
        self.business_story = Some(story.into());
        self
    }

    pub fn decision(mut self, decision: impl Into<String>) -> Self {
        self.decision = Some(decision.into());
        self
    }

    pub fn success(mut self, success: impl Into<String>) -> Self {
        self.success = Some(success.into());
        self
    }

    pub fn timeline(mut self, timeline: impl Into<String>) -> Self {
        self.timeline = Some(timeline.into());
        self
    }

    pub fn scale_indicator(mut self, scale: impl Into<String>) -> Self {
        self.scale_indicator = Some(scale.into());
        self
    }

    pub fn include_financial(mut self, include: IncludeFinancial) -> Self {
        self.include_financial = Some(include);
        self
    }

    pub fn financial_context(mut self, context: impl Into<String>) -> Self {
        self.financial_context = Some(context.into());
        self
    }

    pub fn monthly_revenue(mut self, revenue: impl Into<String>) -> Self {
        self.monthly_revenue = Some(revenue.into());
        self
    }

    pub fn monthly_costs(mut self, costs: impl Into<String>) -> Self {
        self.monthly_costs = Some(costs.into());
        self
    }

    pub fn cash_available(mut self, cash: impl Into<String>) -> Self {
        self.cash_available = Some(cash.into());
        self
    }

    pub fn webhook_url(mut self, webhook_url: impl Into<String>) -> Self {
        self.webhook_url = Some(webhook_url.into());
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// JSON body for `POST /reports/solutions`.
    ///
    /// Fails with [`SurmadoError::Validation`] when no signal token is given
    /// and any standalone context field is missing or empty.
    pub fn to_payload(&self) -> Result<Map<String, Value>> {
        let mut payload = Map::new();
        payload.insert("email".to_string(), Value::String(self.email.clone()));

        if let Some(include) = self.include_financial {
            payload.insert(
                "include_financial".to_string(),
                serde_json::to_value(include)?,
            );
        }
        let financial = [
            ("financial_context", &self.financial_context),
            ("monthly_revenue", &self.monthly_revenue),
            ("monthly_costs", &self.monthly_costs),
            ("cash_available", &self.cash_available),
            ("webhook_url", &self.webhook_url),
        ];
        for (key, value) in financial {
            if let Some(value) = value {
                payload.insert(key.to_string(), Value::String(value.clone()));
            }
        }
        payload.extend(self.extra.clone());

        if let Some(signal_token) = present(&self.signal_token) {
            insert_str(&mut payload, "signal_token", signal_token);
            if let Some(scan_token) = present(&self.scan_token) {
                insert_str(&mut payload, "scan_token", scan_token);
            }
            if let Some(brand_name) = present(&self.brand_name) {
                insert_str(&mut payload, "brand_name", brand_name);
            }
            return Ok(payload);
        }

        let standalone = [
            ("brand_name", present(&self.brand_name)),
            ("business_story", present(&self.business_story)),
            ("decision", present(&self.decision)),
            ("success", present(&self.success)),
            ("timeline", present(&self.timeline)),
            ("scale_indicator", present(&self.scale_indicator)),
        ];
        if standalone.iter().any(|(_, value)| value.is_none()) {
            return Err(SurmadoError::validation(STANDALONE_FIELDS_MESSAGE));
        }
        for (key, value) in standalone {
            if let Some(value) = value {
                insert_str(&mut payload, key, value);
            }
        }
        if let Some(scan_token) = present(&self.scan_token) {
            insert_str(&mut payload, "scan_token", scan_token);
        }

        Ok(payload)
    }
}

/// Re-run a Signal report from stored brand context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalRerunRequest {
    /// Brand identifier, e.g. `acme_corp`
    pub brand_slug: String,
    /// Persona identifier from brand settings, e.g. `cto-enterprise`
    pub persona_slug: String,
    pub email: String,
    #[serde(default)]
    pub tier: SignalTier,
}

impl SignalRerunRequest {
    pub fn new(
        brand_slug: impl Into<String>,
        persona_slug: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            brand_slug: brand_slug.into(),
            persona_slug: persona_slug.into(),
            email: email.into(),
            tier: SignalTier::default(),
        }
    }

    pub fn tier(mut self, tier: SignalTier) -> Self {
        self.tier = tier;
        self
    }

    /// JSON body for `POST /reports/signal/rerun`
    pub fn to_payload(&self) -> Result<Map<String, Value>> {
        to_object(self)
    }
}

/// Re-run a Scan report from stored brand context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRerunRequest {
    pub brand_slug: String,
    pub email: String,
    #[serde(default)]
    pub tier: ScanTier,
}

impl ScanRerunRequest {
    pub fn new(brand_slug: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            brand_slug: brand_slug.into(),
            email: email.into(),
            tier: ScanTier::default(),
        }
    }

    pub fn tier(mut self, tier: ScanTier) -> Self {
        self.tier = tier;
        self
    }

    /// JSON body for `POST /reports/scan/rerun`
    pub fn to_payload(&self) -> Result<Map<String, Value>> {
        to_object(self)
    }
}

/// Pagination for `GET /reports`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListReportsQuery {
    /// 1-indexed page number
    pub page: u32,
    /// Reports per page (server maximum is 100)
    pub page_size: u32,
}

impl Default for ListReportsQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 50,
        }
    }
}

impl ListReportsQuery {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }
}

/// Serialize into a JSON object; later keys (the flattened `extra` map) win
/// over earlier ones with the same name.
fn to_object<T: Serialize>(value: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(SurmadoError::validation(format!(
            "request did not serialize to a JSON object: {}",
            other
        ))),
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn insert_str(payload: &mut Map<String, Value>, key: &str, value: &str) {
    payload.insert(key.to_string(), Value::String(value.to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn acme_context() -> SignalContext {
        SignalContext::new(
            "B2B SaaS",
            "United States",
            "CTOs at mid-market companies",
            "Integration challenges, lack of visibility",
            "Modern, dev-focused tooling",
            "Asana, Monday.com",
        )
    }

    fn full_signal() -> SignalRequest {
        SignalRequest::new("https://acme.com", "Acme Corp", "you@acme.com", acme_context())
    }

    fn standalone_solutions() -> SolutionsRequest {
        SolutionsRequest::new("you@acme.com")
            .brand_name("Acme Corp")
            .business_story("B2B SaaS in project management")
            .decision("Expand to enterprise?")
            .success("$10M ARR in 18 months")
            .timeline("Q2 2025")
            .scale_indicator("$2M ARR, 20 employees")
    }

    #[test]
    fn test_signal_payload_has_required_fields() {
        let payload = full_signal().to_payload().unwrap();

        for key in [
            "url",
            "brand_name",
            "email",
            "industry",
            "location",
            "persona",
            "pain_points",
            "brand_details",
            "direct_competitors",
            "tier",
        ] {
            assert!(payload.contains_key(key), "missing {}", key);
        }
        assert_eq!(payload["industry"], "B2B SaaS");
        assert_eq!(payload["direct_competitors"], "Asana, Monday.com");
        assert_eq!(payload["tier"], "basic");
        assert!(!payload.contains_key("keywords"));
        assert!(!payload.contains_key("webhook_url"));
        assert_eq!(payload.len(), 10);
    }

    #[test]
    fn test_signal_payload_optional_and_extra_fields() {
        let payload = full_signal()
            .tier(SignalTier::Pro)
            .keywords("ai, devtools")
            .business_scale(BusinessScale::Large)
            .webhook_url("https://hooks.acme.com/surmado")
            .extra("campaign", "spring")
            .to_payload()
            .unwrap();

        assert_eq!(payload["tier"], "pro");
        assert_eq!(payload["keywords"], "ai, devtools");
        assert_eq!(payload["business_scale"], "large");
        assert_eq!(payload["webhook_url"], "https://hooks.acme.com/surmado");
        assert_eq!(payload["campaign"], "spring");
    }

    #[test]
    fn test_extra_overrides_named_field() {
        let payload = full_signal().extra("tier", "enterprise").to_payload().unwrap();
        assert_eq!(payload["tier"], "enterprise");
    }

    #[test]
    fn test_scan_payload() {
        let payload = ScanRequest::new("https://acme.com", "Acme Corp", "you@acme.com")
            .tier(ScanTier::Premium)
            .competitor_urls(["https://a.com", "https://b.com"])
            .report_style(ReportStyle::Technical)
            .to_payload()
            .unwrap();

        assert_eq!(payload["tier"], "premium");
        assert_eq!(payload["competitor_urls"], json!(["https://a.com", "https://b.com"]));
        assert_eq!(payload["report_style"], "technical");
        assert!(!payload.contains_key("webhook_url"));
    }

    #[test]
    fn test_solutions_signal_token_mode() {
        let payload = SolutionsRequest::new("you@acme.com")
            .signal_token("sig_tok")
            .business_story("ignored in token mode")
            .to_payload()
            .unwrap();

        assert_eq!(
            Value::Object(payload),
            json!({"email": "you@acme.com", "signal_token": "sig_tok"})
        );
    }

    #[test]
    fn test_solutions_signal_token_with_scan_and_brand() {
        let payload = SolutionsRequest::new("you@acme.com")
            .signal_token("sig_tok")
            .scan_token("scan_tok")
            .brand_name("Acme Corp")
            .to_payload()
            .unwrap();

        assert_eq!(payload["scan_token"], "scan_tok");
        assert_eq!(payload["brand_name"], "Acme Corp");
        assert_eq!(payload.len(), 4);
    }

    #[test]
    fn test_solutions_standalone_mode() {
        let payload = standalone_solutions()
            .scan_token("scan_tok")
            .include_financial(IncludeFinancial::Yes)
            .monthly_revenue("$150k")
            .to_payload()
            .unwrap();

        assert_eq!(payload["brand_name"], "Acme Corp");
        assert_eq!(payload["scale_indicator"], "$2M ARR, 20 employees");
        assert_eq!(payload["scan_token"], "scan_tok");
        assert_eq!(payload["include_financial"], "yes");
        assert_eq!(payload["monthly_revenue"], "$150k");
        assert!(!payload.contains_key("signal_token"));
    }

    #[test]
    fn test_solutions_standalone_missing_field() {
        let mut request = standalone_solutions();
        request.timeline = None;

        let err = request.to_payload().unwrap_err();
        assert!(matches!(err, SurmadoError::Validation { status_code: None, .. }));
        assert!(err.message().contains("Without signal_token"));
    }

    #[test]
    fn test_solutions_empty_field_counts_as_missing() {
        let err = standalone_solutions().decision("").to_payload().unwrap_err();
        assert!(matches!(err, SurmadoError::Validation { .. }));

        // An empty signal token falls back to standalone mode
        let err = SolutionsRequest::new("you@acme.com")
            .signal_token("")
            .to_payload()
            .unwrap_err();
        assert!(matches!(err, SurmadoError::Validation { .. }));
    }

    #[test]
    fn test_signal_context_round_trips_flat() {
        let payload = full_signal().to_payload().unwrap();
        assert!(!payload.contains_key("context"));

        let parsed: SignalRequest = serde_json::from_value(Value::Object(payload)).unwrap();
        assert_eq!(parsed.context, acme_context());
        assert!(parsed.extra.is_empty());
    }

    #[test]
    fn test_solutions_serializes_in_wire_shape() {
        let request = SolutionsRequest::new("you@acme.com")
            .signal_token("sig_tok")
            .extra("campaign", "spring");

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"email": "you@acme.com", "signal_token": "sig_tok", "campaign": "spring"})
        );
    }

    #[test]
    fn test_rerun_payloads() {
        let signal = SignalRerunRequest::new("acme_corp", "cto-enterprise", "you@acme.com")
            .to_payload()
            .unwrap();
        assert_eq!(
            Value::Object(signal),
            json!({
                "brand_slug": "acme_corp",
                "persona_slug": "cto-enterprise",
                "email": "you@acme.com",
                "tier": "basic"
            })
        );

        let scan = ScanRerunRequest::new("acme_corp", "you@acme.com")
            .tier(ScanTier::Premium)
            .to_payload()
            .unwrap();
        assert_eq!(
            Value::Object(scan),
            json!({"brand_slug": "acme_corp", "email": "you@acme.com", "tier": "premium"})
        );
    }

    #[test]
    fn test_list_query_default() {
        let query = ListReportsQuery::default();
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 50);
    }
}
