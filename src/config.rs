//! Runtime configuration for the FatSecret client.

use std::env;
use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use secrecy::SecretString;

pub const DEFAULT_TOKEN_URL: &str = "https://oauth.fatsecret.com/connect/token";
pub const DEFAULT_API_URL: &str = "https://platform.fatsecret.com/rest/server.api";
pub const DEFAULT_SCOPE: &str = "basic premier";

/// Credentials and endpoints for one FatSecret client instance.
///
/// Only `client_id` and `client_secret` are required; everything else has a
/// production default and exists so tests can point at a mock server.
pub struct FatSecretConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub token_url: String,
    pub api_url: String,
    pub scope: String,
    /// Per round trip timeout applied when the caller supplies none.
    pub request_timeout: Duration,
    /// A token this close to its expiry is treated as already expired.
    pub refresh_margin: Duration,
}

impl fmt::Debug for FatSecretConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FatSecretConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("token_url", &self.token_url)
            .field("api_url", &self.api_url)
            .field("scope", &self.scope)
            .field("request_timeout", &self.request_timeout)
            .field("refresh_margin", &self.refresh_margin)
            .finish()
    }
}

impl FatSecretConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            request_timeout: Duration::from_secs(10),
            refresh_margin: Duration::from_secs(60),
        }
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = margin;
        self
    }

    /// Load configuration from `FATSECRET_*` environment variables.
    ///
    /// `FATSECRET_CLIENT_ID` and `FATSECRET_CLIENT_SECRET` are required.
    /// `FATSECRET_TOKEN_URL`, `FATSECRET_API_URL`, `FATSECRET_SCOPE` and
    /// `FATSECRET_TIMEOUT_SECS` override the defaults when set.
    pub fn from_env() -> Result<Self> {
        let client_id = env::var("FATSECRET_CLIENT_ID")
            .context("FATSECRET_CLIENT_ID environment variable not set")?;
        let client_secret = env::var("FATSECRET_CLIENT_SECRET")
            .context("FATSECRET_CLIENT_SECRET environment variable not set")?;

        let mut config = Self::new(client_id, client_secret);

        if let Ok(url) = env::var("FATSECRET_TOKEN_URL") {
            config = config.with_token_url(url);
        }
        if let Ok(url) = env::var("FATSECRET_API_URL") {
            config = config.with_api_url(url);
        }
        if let Ok(scope) = env::var("FATSECRET_SCOPE") {
            config = config.with_scope(scope);
        }
        if let Ok(secs) = env::var("FATSECRET_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("FATSECRET_TIMEOUT_SECS is not a number: {secs}"))?;
            config = config.with_request_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }
}
