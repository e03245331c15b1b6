//! Blocking HTTP transport for the remote platform.

use crate::config::RemoteConfig;
use crate::remote::{Method, RemoteApi};
use crate::{Error, Result};
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// `RemoteApi` over HTTPS with a bearer token
#[derive(Clone, Debug)]
pub struct HttpRemoteApi {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpRemoteApi {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        // Trailing slash so endpoint joins append instead of replacing
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| Error::Config(format!("Invalid base URL '{}': {}", base_url, e)))?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Build from config, reading the token from the configured environment variable
    pub fn from_config(config: &RemoteConfig) -> Result<Self> {
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty());
        if token.is_none() {
            tracing::warn!(
                "{} is not set; requests will be sent without credentials",
                config.token_env
            );
        }

        Self::new(
            &config.base_url,
            token,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        self.base_url
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| Error::Other(format!("Invalid endpoint '{}': {}", endpoint, e)))
    }
}

impl RemoteApi for HttpRemoteApi {
    fn call(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = self.endpoint_url(endpoint)?;
        tracing::debug!("{} {}", method, url);

        let verb = match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut request = self.client.request(verb, url);
        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send()?;
        let status = response.status();
        let text = response.text()?;

        if !status.is_success() {
            return Err(Error::Remote(format!(
                "{} {} failed with status {}: {}",
                method,
                endpoint,
                status.as_u16(),
                text.trim()
            )));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}
