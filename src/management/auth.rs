use std::sync::Arc;

use chrono::Utc;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::{
    config::ProviderConfig,
    error::{JukeboxError, Result},
    management::{SyncLogManager, TokenVault},
    types::{Credentials, StoredAuth, SyncAction, SyncLogEntry, SyncStatus, TokenResponse, UserIdentity},
    warning,
};

/// Smallest expiry buffer the manager accepts. The stored expiry is always
/// at least this far ahead of the provider's literal expiry.
pub const MIN_EXPIRY_BUFFER_SECS: i64 = 60;

/// Owner of the credential record and the only component that talks to the
/// provider's token endpoint.
///
/// Freshness checks are plain comparisons because the expiry buffer is
/// subtracted once, when a token is installed. Refreshes run behind a
/// single gate: concurrent callers that find a stale token all wait on the
/// same in-flight refresh, and everyone but the winner picks up the fresh
/// token from the re-check after the gate opens.
///
/// An `invalid_grant` answer from the provider means the refresh token
/// itself is dead; the manager wipes the stored credentials and reports
/// that re-authorization is required. Any other refresh failure leaves the
/// credentials in place since the cause may be transient.
pub struct TokenManager {
    provider: ProviderConfig,
    http: Client,
    vault: TokenVault,
    credentials: Mutex<Option<Credentials>>,
    identity: Mutex<Option<UserIdentity>>,
    refresh_gate: Mutex<()>,
    expiry_buffer_secs: i64,
    audit: Option<Arc<Mutex<SyncLogManager>>>,
}

impl TokenManager {
    /// Opens the manager, loading whatever the vault has on disk.
    pub async fn open(provider: ProviderConfig, vault: TokenVault) -> Result<Self> {
        let stored = vault.load().await?;
        let (credentials, identity) = match stored {
            Some(auth) => (Some(auth.credentials), auth.identity),
            None => (None, None),
        };

        Ok(TokenManager {
            provider,
            http: Client::new(),
            vault,
            credentials: Mutex::new(credentials),
            identity: Mutex::new(identity),
            refresh_gate: Mutex::new(()),
            expiry_buffer_secs: MIN_EXPIRY_BUFFER_SECS,
            audit: None,
        })
    }

    /// Overrides the expiry buffer. Values below the minimum are clamped up.
    pub fn with_expiry_buffer(mut self, secs: i64) -> Self {
        self.expiry_buffer_secs = secs.max(MIN_EXPIRY_BUFFER_SECS);
        self
    }

    /// Attaches the audit trail; refresh outcomes get recorded there.
    pub fn with_audit(mut self, audit: Arc<Mutex<SyncLogManager>>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub async fn is_authenticated(&self) -> bool {
        self.credentials.lock().await.is_some()
    }

    pub async fn identity(&self) -> Option<UserIdentity> {
        self.identity.lock().await.clone()
    }

    pub async fn credentials(&self) -> Option<Credentials> {
        self.credentials.lock().await.clone()
    }

    /// Returns a usable access token, refreshing first when the stored one
    /// is stale.
    ///
    /// With no credentials on record this fails immediately without a
    /// network call.
    pub async fn get_valid_access_token(&self) -> Result<String> {
        let now = Utc::now().timestamp();
        {
            let guard = self.credentials.lock().await;
            match guard.as_ref() {
                None => {
                    return Err(JukeboxError::AuthRequired(
                        "not connected to the provider".to_string(),
                    ));
                }
                Some(creds) if creds.is_fresh(now) => return Ok(creds.access_token.clone()),
                Some(_) => {}
            }
        }

        let _gate = self.refresh_gate.lock().await;

        // Re-check: a caller that held the gate before us may have already
        // refreshed.
        let now = Utc::now().timestamp();
        if let Some(creds) = self.credentials.lock().await.as_ref() {
            if creds.is_fresh(now) {
                return Ok(creds.access_token.clone());
            }
        }

        self.refresh_locked().await
    }

    /// Refreshes even though the stored token still looks fresh, used when
    /// the provider rejected it mid-flight with a 401.
    ///
    /// `stale` is the token the caller just failed with. If the stored
    /// token already differs and is fresh, another caller refreshed in the
    /// meantime and that token is returned without a provider call.
    pub async fn force_refresh(&self, stale: &str) -> Result<String> {
        let _gate = self.refresh_gate.lock().await;

        let now = Utc::now().timestamp();
        if let Some(creds) = self.credentials.lock().await.as_ref() {
            if creds.access_token != stale && creds.is_fresh(now) {
                return Ok(creds.access_token.clone());
            }
        }

        self.refresh_locked().await
    }

    /// Installs a token endpoint response as the current credential record.
    ///
    /// The stored expiry is `now + expires_in - buffer`; the buffer is never
    /// applied twice because freshness checks compare directly against it.
    /// A response without a rotated refresh token keeps the previous one.
    pub async fn install(&self, token: TokenResponse) -> Result<Credentials> {
        let now = Utc::now().timestamp();
        let (previous_refresh, previous_scope) = {
            let guard = self.credentials.lock().await;
            match guard.as_ref() {
                Some(creds) => (Some(creds.refresh_token.clone()), creds.scope.clone()),
                None => (None, Vec::new()),
            }
        };

        let refresh_token = token
            .refresh_token
            .or(previous_refresh)
            .unwrap_or_default();
        let scope = match token.scope {
            Some(scope) => scope.split_whitespace().map(str::to_string).collect(),
            None => previous_scope,
        };

        let creds = Credentials {
            access_token: token.access_token,
            refresh_token,
            scope,
            expires_at: now + token.expires_in - self.expiry_buffer_secs,
        };

        *self.credentials.lock().await = Some(creds.clone());
        self.persist().await?;
        Ok(creds)
    }

    /// Caches and persists the account identity next to the credentials.
    pub async fn store_identity(&self, identity: UserIdentity) -> Result<()> {
        *self.identity.lock().await = Some(identity);
        self.persist().await
    }

    /// Drops credentials and identity, in memory and on disk. Idempotent.
    pub async fn clear(&self) -> Result<()> {
        *self.credentials.lock().await = None;
        *self.identity.lock().await = None;
        self.vault.clear().await
    }

    /// Performs the actual refresh-token exchange. Callers must hold the
    /// refresh gate.
    async fn refresh_locked(&self) -> Result<String> {
        let refresh_token = match self.credentials.lock().await.as_ref() {
            Some(creds) if !creds.refresh_token.is_empty() => creds.refresh_token.clone(),
            Some(_) => {
                return Err(JukeboxError::AuthRequired(
                    "no refresh token on record".to_string(),
                ));
            }
            None => {
                return Err(JukeboxError::AuthRequired(
                    "not connected to the provider".to_string(),
                ));
            }
        };

        let mut form = vec![
            ("grant_type".to_string(), "refresh_token".to_string()),
            ("refresh_token".to_string(), refresh_token),
            ("client_id".to_string(), self.provider.client_id.clone()),
        ];
        if let Some(secret) = &self.provider.client_secret {
            form.push(("client_secret".to_string(), secret.clone()));
        }

        let response = match self.http.post(&self.provider.token_url).form(&form).send().await {
            Ok(response) => response,
            Err(e) => {
                self.audit_refresh(SyncStatus::Failed, "no response from token endpoint", Some(e.to_string()))
                    .await;
                return Err(JukeboxError::Network {
                    attempts: 1,
                    source: e,
                });
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if body.contains("invalid_grant") {
                // The refresh token is revoked or expired. Retrying cannot
                // help; only a fresh authorization can.
                self.clear().await?;
                self.audit_refresh(
                    SyncStatus::Failed,
                    "refresh token revoked, credentials cleared",
                    Some(body),
                )
                .await;
                return Err(JukeboxError::AuthRequired(
                    "refresh token revoked".to_string(),
                ));
            }

            self.audit_refresh(SyncStatus::Failed, "token endpoint error", Some(body.clone()))
                .await;
            return Err(JukeboxError::Api {
                status: status.as_u16(),
                message: if body.is_empty() {
                    status.to_string()
                } else {
                    body
                },
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| JukeboxError::InvalidResponse(e.to_string()))?;
        let creds = self.install(token).await?;
        self.audit_refresh(SyncStatus::Success, "access token refreshed", None)
            .await;
        Ok(creds.access_token)
    }

    async fn persist(&self) -> Result<()> {
        let credentials = self.credentials.lock().await.clone();
        let identity = self.identity.lock().await.clone();
        match credentials {
            Some(credentials) => {
                self.vault
                    .store(&StoredAuth {
                        credentials,
                        identity,
                    })
                    .await
            }
            None => self.vault.clear().await,
        }
    }

    async fn audit_refresh(&self, status: SyncStatus, details: &str, error: Option<String>) {
        if let Some(audit) = &self.audit {
            let entry = SyncLogEntry {
                timestamp: Utc::now(),
                action: SyncAction::RefreshToken,
                status,
                details: details.to_string(),
                affected_count: 0,
                error,
                actor: "token-manager".to_string(),
            };
            if let Err(e) = audit.lock().await.append(entry).await {
                warning!("Failed to record token refresh in sync log: {}", e);
            }
        }
    }
}
