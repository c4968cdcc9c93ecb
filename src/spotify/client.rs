use std::{sync::Arc, time::Duration};

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::sleep;

use crate::{
    config::ProviderConfig,
    error::{JukeboxError, Result},
    management::TokenManager,
};

/// How many forced token refreshes a single request may trigger before the
/// credentials are declared dead.
const DEFAULT_REFRESH_CEILING: u32 = 3;

/// How many times a request is attempted when the provider does not answer
/// at all.
const DEFAULT_NETWORK_RETRIES: u32 = 3;

/// Authenticated request executor for the provider's Web API.
///
/// Every call obtains a token from the [`TokenManager`] first; with no
/// credentials on record the call fails immediately and nothing goes over
/// the wire. Response handling:
///
/// - 401 forces one token refresh and retries the same request, bounded by
///   a small ceiling; past the ceiling the credentials are cleared and the
///   caller gets an auth-required error.
/// - 429 surfaces as a rate-limit error carrying the provider's
///   `Retry-After`. This layer never sleeps a rate limit away.
/// - Transport failures (no response) retry with linear backoff, on a
///   counter separate from the 401 path.
/// - 204 and 202 are success with no body.
/// - Any other non-2xx becomes an API error with the provider's message.
///
/// Batching is the caller's concern; one call here is one logical request.
pub struct SpotifyClient {
    http: Client,
    provider: ProviderConfig,
    tokens: Arc<TokenManager>,
    refresh_ceiling: u32,
    network_retries: u32,
}

impl SpotifyClient {
    pub fn new(provider: ProviderConfig, tokens: Arc<TokenManager>) -> Self {
        SpotifyClient {
            http: Client::new(),
            provider,
            tokens,
            refresh_ceiling: DEFAULT_REFRESH_CEILING,
            network_retries: DEFAULT_NETWORK_RETRIES,
        }
    }

    pub fn with_refresh_ceiling(mut self, ceiling: u32) -> Self {
        self.refresh_ceiling = ceiling;
        self
    }

    pub fn with_network_retries(mut self, retries: u32) -> Self {
        self.network_retries = retries.max(1);
        self
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    /// Executes one authenticated request against the API.
    ///
    /// `endpoint` is either a path relative to the configured API base URL
    /// or an absolute URL, which pagination `next` links need.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Option<Value>> {
        let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("{}{}", self.provider.api_url, endpoint)
        };

        let mut token = self.tokens.get_valid_access_token().await?;
        let mut refreshes: u32 = 0;
        let mut network_failures: u32 = 0;

        loop {
            let mut request = self.http.request(method.clone(), &url).bearer_auth(&token);
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    network_failures += 1;
                    if network_failures >= self.network_retries {
                        return Err(JukeboxError::Network {
                            attempts: network_failures,
                            source: e,
                        });
                    }
                    sleep(Duration::from_secs(network_failures as u64)).await;
                    continue;
                }
            };

            let status = response.status();
            match status {
                StatusCode::UNAUTHORIZED => {
                    refreshes += 1;
                    if refreshes > self.refresh_ceiling {
                        // Freshly refreshed tokens keep bouncing; the grant
                        // is gone, not the token.
                        self.tokens.clear().await?;
                        return Err(JukeboxError::AuthRequired(
                            "provider rejected freshly refreshed tokens".to_string(),
                        ));
                    }
                    token = self.tokens.force_refresh(&token).await?;
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = response
                        .headers()
                        .get("Retry-After")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok())
                        .unwrap_or(1);
                    return Err(JukeboxError::RateLimited { retry_after });
                }
                StatusCode::NO_CONTENT | StatusCode::ACCEPTED => return Ok(None),
                status if status.is_success() => {
                    let text = response
                        .text()
                        .await
                        .map_err(|e| JukeboxError::InvalidResponse(e.to_string()))?;
                    if text.is_empty() {
                        return Ok(None);
                    }
                    let value = serde_json::from_str(&text)
                        .map_err(|e| JukeboxError::InvalidResponse(e.to_string()))?;
                    return Ok(Some(value));
                }
                status => {
                    let body = response.text().await.unwrap_or_default();
                    return Err(JukeboxError::Api {
                        status: status.as_u16(),
                        message: provider_message(&body)
                            .unwrap_or_else(|| if body.is_empty() { status.to_string() } else { body.clone() }),
                    });
                }
            }
        }
    }

    /// GET that must produce a body.
    pub async fn get_json(&self, endpoint: &str) -> Result<Value> {
        match self.request(Method::GET, endpoint, None).await? {
            Some(value) => Ok(value),
            None => Err(JukeboxError::InvalidResponse(
                "empty response body".to_string(),
            )),
        }
    }

    pub async fn post_json(&self, endpoint: &str, body: &Value) -> Result<Option<Value>> {
        self.request(Method::POST, endpoint, Some(body)).await
    }

    pub async fn delete_json(&self, endpoint: &str, body: &Value) -> Result<Option<Value>> {
        self.request(Method::DELETE, endpoint, Some(body)).await
    }

    /// Deserializes a response value into a typed payload.
    pub(crate) fn parse<T: DeserializeOwned>(value: Value) -> Result<T> {
        serde_json::from_value(value).map_err(|e| JukeboxError::InvalidResponse(e.to_string()))
    }
}

/// Pulls the human-readable message out of the provider's error envelope,
/// `{"error": {"status": ..., "message": ...}}`.
fn provider_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}
