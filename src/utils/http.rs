//! HTTP transport setup.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Result, SurmadoError};

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("surmado-rust/", env!("CARGO_PKG_VERSION"));

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Shared HTTP client with the Surmado authentication headers baked in
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a client that authenticates with `api_key` and gives up on
    /// each request after `timeout`.
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(default_headers(api_key)?)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Get the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

fn default_headers(api_key: &str) -> Result<HeaderMap> {
    let mut api_key_value = HeaderValue::from_str(api_key).map_err(|_| {
        SurmadoError::Authentication {
            message: "API key contains characters that are not valid in an HTTP header"
                .to_string(),
            status_code: None,
            response: None,
        }
    })?;
    api_key_value.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(API_KEY_HEADER, api_key_value);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}
