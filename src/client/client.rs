use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::client::{
    auth::{Credential, TokenManager},
    error::{FatSecretError, Result},
    types::*,
};
use crate::config::FatSecretConfig;

/// Per-operation controls supplied by the caller.
///
/// `timeout` bounds every HTTP round trip the operation makes (the token
/// exchange and the lookup itself). Cancelling `cancel` aborts the operation
/// with [`FatSecretError::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub(crate) fn timeout_or(&self, default: Duration) -> Duration {
        self.timeout.unwrap_or(default)
    }

    pub(crate) async fn run<T, F>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => {
                    tracing::debug!("FatSecret operation cancelled by caller");
                    Err(FatSecretError::Cancelled)
                }
                result = operation => result,
            },
            None => operation.await,
        }
    }
}

/// Paging controls for `foods.search`.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub max_results: Option<u32>,
    pub page_number: Option<u32>,
}

#[derive(Debug)]
pub struct FatSecretClient {
    api_url: String,
    client: Client,
    auth: TokenManager,
    request_timeout: Duration,
}

impl FatSecretClient {
    pub fn new(config: FatSecretConfig) -> Result<Self> {
        Url::parse(&config.api_url).map_err(|e| {
            FatSecretError::InvalidUrl(format!("API URL {}: {}", config.api_url, e))
        })?;

        let client = Client::new();
        let auth = TokenManager::new(client.clone(), &config)?;

        Ok(Self {
            api_url: config.api_url,
            client,
            auth,
            request_timeout: config.request_timeout,
        })
    }

    pub fn auth(&self) -> &TokenManager {
        &self.auth
    }

    pub async fn ensure_token(&self) -> Result<Credential> {
        self.auth.ensure_token().await
    }

    /// Search the food database by free text or barcode digits.
    ///
    /// Results come back in server order; no hits is an empty `Vec`.
    pub async fn search_foods(&self, query: &str) -> Result<Vec<SearchResult>> {
        self.search_foods_with(query, &SearchParams::default(), &RequestOptions::default())
            .await
    }

    pub async fn search_foods_with(
        &self,
        query: &str,
        params: &SearchParams,
        options: &RequestOptions,
    ) -> Result<Vec<SearchResult>> {
        let timeout = options.timeout_or(self.request_timeout);

        options
            .run(async {
                let credential = self.auth.acquire(timeout).await?;

                let mut query_params = vec![
                    ("method", "foods.search".to_string()),
                    ("search_expression", query.to_string()),
                    ("format", "json".to_string()),
                ];
                if let Some(max) = params.max_results {
                    query_params.push(("max_results", max.to_string()));
                }
                if let Some(page) = params.page_number {
                    query_params.push(("page_number", page.to_string()));
                }
                query_params.push(("oauth_token", credential.access_token().to_string()));

                let url = self.build_url(&query_params)?;
                let response: FoodSearchResponse = self.get_json(url, &credential, timeout, "Food search").await?;

                tracing::debug!("Food search returned {} results", response.foods.food.len());
                Ok(response.foods.food)
            })
            .await
    }

    /// Fetch nutrition details for an id taken from a [`SearchResult`].
    pub async fn get_food(&self, id: &str) -> Result<NutritionDetails> {
        self.get_food_with(id, &RequestOptions::default()).await
    }

    pub async fn get_food_with(&self, id: &str, options: &RequestOptions) -> Result<NutritionDetails> {
        let timeout = options.timeout_or(self.request_timeout);

        options
            .run(async {
                let credential = self.auth.acquire(timeout).await?;

                let url = self.build_url(&[
                    ("method", "food.get".to_string()),
                    ("food_id", id.to_string()),
                    ("format", "json".to_string()),
                    ("oauth_token", credential.access_token().to_string()),
                ])?;
                let response: FoodDetailsResponse =
                    self.get_json(url, &credential, timeout, "Food details").await?;

                tracing::debug!(
                    "Food {} has {} servings",
                    response.food.id,
                    response.food.servings.len()
                );
                Ok(response.food)
            })
            .await
    }

    fn build_url(&self, params: &[(&str, String)]) -> Result<Url> {
        let query = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        Url::parse(&format!("{}?{}", self.api_url, query))
            .map_err(|e| FatSecretError::InvalidUrl(format!("failed to build request URL: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        credential: &Credential,
        timeout: Duration,
        operation: &str,
    ) -> Result<T> {
        tracing::debug!("Making {} request to: {}", operation, redact_token(&url));

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Network error during {}: {}", operation, e);
                FatSecretError::NetworkError(e)
            })?;

        let status = response.status();
        tracing::debug!("{} response status: {}", operation, status);

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            tracing::error!("{} failed with status {}: {}", operation, status, error_body);

            if status == StatusCode::UNAUTHORIZED {
                tracing::warn!("FatSecret rejected the access token, it will be refreshed on the next call");
                self.auth.invalidate_if_current(credential).await;
            }
            return Err(FatSecretError::InvalidResponse(format!(
                "{operation} failed with status {status}"
            )));
        }

        let bytes = response.bytes().await.map_err(|e| {
            tracing::error!("Failed to read {} response: {}", operation, e);
            FatSecretError::NetworkError(e)
        })?;

        if let Ok(envelope) = serde_json::from_slice::<ApiErrorEnvelope>(&bytes) {
            let error = envelope.error;
            // Token errors echo the rejected token in their message
            if error.invalidates_token() {
                tracing::error!("{} returned FatSecret error {}", operation, error.code);
                self.auth.invalidate_if_current(credential).await;
                return Err(FatSecretError::InvalidResponse(format!(
                    "FatSecret error {}: access token rejected",
                    error.code
                )));
            }
            tracing::error!("{} returned FatSecret error {}: {}", operation, error.code, error.message);
            return Err(FatSecretError::InvalidResponse(format!(
                "FatSecret error {}: {}",
                error.code, error.message
            )));
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!("Failed to parse {} response: {}", operation, e);
            FatSecretError::InvalidResponse(format!("malformed {operation} response: {e}"))
        })
    }
}

/// Render a request URL for logs with the access token masked.
fn redact_token(url: &Url) -> String {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if key == "oauth_token" {
                "REDACTED".to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();

    let mut redacted = url.clone();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}
