//! Authentication handling for the FatSecret platform API.
//!
//! FatSecret uses the OAuth2 client-credentials grant: the application trades
//! its own id and secret for a bearer token at the token endpoint, then sends
//! that token as `oauth_token` on every food API call. This module owns the
//! exchange and the cached token.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;

use crate::client::client::RequestOptions;
use crate::client::error::{FatSecretError, Result};
use crate::client::types::AuthResponse;
use crate::config::FatSecretConfig;

/// A bearer token obtained from the token endpoint.
///
/// The token string itself stays inside the crate; callers can only inspect
/// its metadata.
#[derive(Clone)]
pub struct Credential {
    access_token: Arc<SecretString>,
    token_type: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Credential {
    pub fn token_type(&self) -> Option<&str> {
        self.token_type.as_deref()
    }

    /// When the token stops being accepted, if the server said so.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub(crate) fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    /// A token without a known expiry is reused until invalidated.
    fn is_fresh(&self, now: DateTime<Utc>, margin: chrono::Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => now
                .checked_add_signed(margin)
                .is_some_and(|deadline| deadline < expires_at),
            None => true,
        }
    }
}

/// # FatSecret Token Manager
///
/// Acquires and caches one bearer credential per client instance.
///
/// ## Concurrency
///
/// The cache sits behind an async mutex that stays locked for the whole
/// exchange. Concurrent callers that arrive before a token exists wait for the
/// single in-flight request and then reuse its result, so only one
/// authentication round trip is ever issued at a time.
///
/// ## Expiry
///
/// When the token endpoint reports `expires_in`, the token is refreshed once
/// it comes within `refresh_margin` of expiring. Otherwise it is reused until
/// [`TokenManager::invalidate`] is called.
pub struct TokenManager {
    http: Client,
    token_url: Url,
    client_id: String,
    client_secret: SecretString,
    scope: String,
    request_timeout: Duration,
    refresh_margin: chrono::Duration,
    credential: Mutex<Option<Credential>>,
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("token_url", &self.token_url.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    pub fn new(http: Client, config: &FatSecretConfig) -> Result<Self> {
        if config.client_id.trim().is_empty() {
            return Err(FatSecretError::InvalidUrl(
                "client id must not be empty".to_string(),
            ));
        }
        if config.client_secret.expose_secret().is_empty() {
            return Err(FatSecretError::InvalidUrl(
                "client secret must not be empty".to_string(),
            ));
        }

        let token_url = Url::parse(&config.token_url).map_err(|e| {
            FatSecretError::InvalidUrl(format!("token URL {}: {}", config.token_url, e))
        })?;
        let refresh_margin = chrono::Duration::from_std(config.refresh_margin)
            .map_err(|e| FatSecretError::InvalidUrl(format!("refresh margin out of range: {e}")))?;

        Ok(Self {
            http,
            token_url,
            client_id: config.client_id.clone(),
            client_secret: SecretString::from(config.client_secret.expose_secret().to_owned()),
            scope: config.scope.clone(),
            request_timeout: config.request_timeout,
            refresh_margin,
            credential: Mutex::new(None),
        })
    }

    /// Return the cached credential, authenticating first if there is none
    /// or it is about to expire.
    pub async fn ensure_token(&self) -> Result<Credential> {
        self.ensure_token_with(&RequestOptions::default()).await
    }

    pub async fn ensure_token_with(&self, options: &RequestOptions) -> Result<Credential> {
        let timeout = options.timeout_or(self.request_timeout);
        options.run(self.acquire(timeout)).await
    }

    /// `timeout` bounds both the wait for another task's exchange and our own.
    pub(crate) async fn acquire(&self, timeout: Duration) -> Result<Credential> {
        let mut cached = tokio::time::timeout(timeout, self.credential.lock())
            .await
            .map_err(|_| {
                tracing::warn!("Timed out waiting for an in-flight FatSecret authentication");
                FatSecretError::AuthenticationFailed(format!(
                    "timed out after {timeout:?} waiting for another authentication to finish"
                ))
            })?;

        if let Some(credential) = cached.as_ref() {
            if credential.is_fresh(Utc::now(), self.refresh_margin) {
                return Ok(credential.clone());
            }
            tracing::debug!("Cached FatSecret token is about to expire, re-authenticating");
        }

        let credential = self.exchange(timeout).await?;
        *cached = Some(credential.clone());
        Ok(credential)
    }

    /// Drop the cached credential so the next call authenticates again.
    pub async fn invalidate(&self) {
        let mut cached = self.credential.lock().await;
        if cached.take().is_some() {
            tracing::debug!("Discarded cached FatSecret token");
        }
    }

    /// Drop the cached credential only if it is still `rejected`.
    ///
    /// A concurrent caller may already have replaced it with a fresh token,
    /// which must survive.
    pub(crate) async fn invalidate_if_current(&self, rejected: &Credential) {
        let mut cached = self.credential.lock().await;
        let is_current = cached
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(&current.access_token, &rejected.access_token));
        if is_current {
            cached.take();
            tracing::debug!("Discarded rejected FatSecret token");
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.credential.lock().await.is_some()
    }

    fn form_body(&self) -> String {
        format!(
            "grant_type={}&scope={}",
            urlencoding::encode("client_credentials"),
            urlencoding::encode(&self.scope)
        )
    }

    fn basic_auth_header(&self) -> String {
        let raw = format!("{}:{}", self.client_id, self.client_secret.expose_secret());
        format!("Basic {}", STANDARD.encode(raw))
    }

    async fn exchange(&self, timeout: Duration) -> Result<Credential> {
        tracing::info!("Requesting FatSecret access token for client: {}", self.client_id);
        tracing::debug!("Making authentication request to: {}", self.token_url);

        let response = self
            .http
            .post(self.token_url.clone())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(AUTHORIZATION, self.basic_auth_header())
            .body(self.form_body())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Network error during authentication: {}", e);
                FatSecretError::AuthenticationFailed(format!(
                    "failed to reach token endpoint {}: {}",
                    self.token_url, e
                ))
            })?;

        let status = response.status();
        tracing::debug!("Authentication response status: {}", status);

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            tracing::error!("Authentication failed with status {}: {}", status, error_body);
            return Err(FatSecretError::AuthenticationFailed(format!(
                "token endpoint returned {status}"
            )));
        }

        let bytes = response.bytes().await.map_err(|e| {
            tracing::error!("Failed to read authentication response: {}", e);
            FatSecretError::AuthenticationFailed(format!("failed to read token response: {e}"))
        })?;

        let auth: AuthResponse = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!("Failed to parse authentication response: {}", e);
            FatSecretError::InvalidResponse(format!("malformed token response: {e}"))
        })?;

        if auth.access_token.is_empty() {
            tracing::error!("Token endpoint returned an empty access token");
            return Err(FatSecretError::InvalidResponse(
                "token response contained an empty access_token".to_string(),
            ));
        }

        // Lifetimes beyond what chrono can represent count as no known expiry
        let expires_at = auth
            .expires_in
            .filter(|secs| *secs > 0)
            .and_then(chrono::Duration::try_seconds)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime));

        tracing::info!(
            "Authentication successful, token expires in {}",
            auth.expires_in
                .map_or_else(|| "an unknown time".to_string(), |secs| format!("{secs}s"))
        );

        Ok(Credential {
            access_token: Arc::new(SecretString::from(auth.access_token)),
            token_type: auth.token_type,
            expires_at,
        })
    }
}
