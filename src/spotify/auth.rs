use std::sync::Arc;

use chrono::Utc;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::{
    config::ProviderConfig,
    error::{JukeboxError, Result},
    management::TokenManager,
    types::{PkceAttempt, TokenResponse, UserIdentity, UserProfile},
    utils, warning,
};

/// How long an authorization attempt may sit unanswered before a callback
/// for it is rejected.
const ATTEMPT_TTL_SECS: i64 = 600;

/// The authorization URL handed to the browser, together with the state
/// token that the eventual callback must echo back.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub authorize_url: String,
    pub state: String,
}

/// Drives the OAuth 2.0 PKCE flow against the provider.
///
/// `begin` creates an authorization attempt (verifier, challenge, state)
/// and returns the URL the admin's browser must visit; `handle_callback`
/// consumes the redirect, validates the state against the stored attempt,
/// exchanges the code for tokens and caches the account identity. Attempts
/// are single-use and pruned by TTL, so an abandoned login cannot be
/// replayed later.
///
/// The PKCE (Proof Key for Code Exchange) shape means no client secret is
/// needed for the code exchange; the verifier proves that the party
/// finishing the flow is the one that started it.
pub struct AuthFlow {
    provider: ProviderConfig,
    http: Client,
    tokens: Arc<TokenManager>,
    attempts: Mutex<Vec<PkceAttempt>>,
}

impl AuthFlow {
    pub fn new(provider: ProviderConfig, tokens: Arc<TokenManager>) -> Self {
        AuthFlow {
            provider,
            http: Client::new(),
            tokens,
            attempts: Mutex::new(Vec::new()),
        }
    }

    /// Starts a new authorization attempt.
    ///
    /// Generates a PKCE code verifier with its SHA-256 challenge and a
    /// random anti-CSRF state token, stores them as a pending attempt, and
    /// builds the provider's authorization URL. Control then leaves the
    /// process: the admin finishes (or abandons) the flow in a browser and
    /// the provider redirects to our callback.
    pub async fn begin(&self) -> AuthorizationRequest {
        let code_verifier = utils::generate_code_verifier();
        let code_challenge = utils::generate_code_challenge(&code_verifier);
        let state = utils::generate_state_token();

        {
            let now = Utc::now().timestamp();
            let mut attempts = self.attempts.lock().await;
            attempts.retain(|a| now - a.created_at < ATTEMPT_TTL_SECS);
            attempts.push(PkceAttempt {
                code_verifier,
                state: state.clone(),
                created_at: now,
            });
        }

        let authorize_url = format!(
            "{auth_url}?client_id={client_id}&response_type=code&redirect_uri={redirect_uri}&code_challenge={code_challenge}&code_challenge_method=S256&scope={scope}&state={state}",
            auth_url = &self.provider.auth_url,
            client_id = &self.provider.client_id,
            redirect_uri = urlencoding::encode(&self.provider.redirect_uri),
            code_challenge = code_challenge,
            scope = urlencoding::encode(&self.provider.scope),
            state = state,
        );

        AuthorizationRequest {
            authorize_url,
            state,
        }
    }

    /// Consumes the provider's redirect back to us.
    ///
    /// The matching attempt is deleted whatever happens on this path; a
    /// second callback with the same state fails. Order of checks:
    ///
    /// 1. A provider-reported `error` parameter short-circuits before any
    ///    token exchange is attempted.
    /// 2. The `state` must match a stored, unexpired attempt. A mismatch
    ///    fails closed as a CSRF rejection; the exchange endpoint is never
    ///    contacted.
    /// 3. The code plus the attempt's verifier are exchanged for tokens,
    ///    which the token manager installs and persists.
    /// 4. The account profile is fetched and cached. A profile fetch
    ///    failure downgrades to a warning since the tokens are already in
    ///    place.
    pub async fn handle_callback(
        &self,
        code: Option<&str>,
        state: Option<&str>,
        error: Option<&str>,
    ) -> Result<()> {
        let attempt = match state {
            Some(state) => self.consume_attempt(state).await,
            None => None,
        };

        if let Some(provider_error) = error {
            return Err(JukeboxError::AuthCallback(format!(
                "provider reported: {provider_error}"
            )));
        }

        let attempt = attempt.ok_or_else(|| {
            JukeboxError::AuthCallback("state does not match any pending attempt".to_string())
        })?;

        let code = code
            .ok_or_else(|| JukeboxError::AuthCallback("missing authorization code".to_string()))?;

        let token = self.exchange_code(code, &attempt.code_verifier).await?;
        self.tokens.install(token).await?;

        match self.fetch_identity().await {
            Ok(identity) => self.tokens.store_identity(identity).await?,
            Err(e) => warning!("Authenticated, but fetching the profile failed: {}", e),
        }

        Ok(())
    }

    /// Clears credentials and identity. Safe to call when not logged in.
    pub async fn logout(&self) -> Result<()> {
        self.tokens.clear().await
    }

    /// Removes and returns the attempt matching `state`, pruning expired
    /// attempts along the way.
    async fn consume_attempt(&self, state: &str) -> Option<PkceAttempt> {
        let now = Utc::now().timestamp();
        let mut attempts = self.attempts.lock().await;
        attempts.retain(|a| now - a.created_at < ATTEMPT_TTL_SECS);

        let index = attempts.iter().position(|a| a.state == state)?;
        Some(attempts.remove(index))
    }

    async fn exchange_code(&self, code: &str, verifier: &str) -> Result<TokenResponse> {
        let response = self
            .http
            .post(&self.provider.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", &self.provider.client_id),
                ("code", code),
                ("code_verifier", verifier),
                ("redirect_uri", &self.provider.redirect_uri),
            ])
            .send()
            .await
            .map_err(|e| JukeboxError::Network {
                attempts: 1,
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JukeboxError::AuthCallback(format!(
                "code exchange failed with {status}: {body}"
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| JukeboxError::InvalidResponse(e.to_string()))
    }

    async fn fetch_identity(&self) -> Result<UserIdentity> {
        let token = self.tokens.get_valid_access_token().await?;
        let response = self
            .http
            .get(format!("{}/me", self.provider.api_url))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| JukeboxError::Network {
                attempts: 1,
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(JukeboxError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let profile: UserProfile = response
            .json()
            .await
            .map_err(|e| JukeboxError::InvalidResponse(e.to_string()))?;

        Ok(UserIdentity {
            display_name: profile.display_name.unwrap_or_else(|| profile.id.clone()),
            avatar_url: profile
                .images
                .and_then(|images| images.into_iter().next())
                .map(|image| image.url),
            email: profile.email,
            id: profile.id,
        })
    }
}
