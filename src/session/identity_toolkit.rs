//! [`IdentityProvider`] backed by the identity provider's REST API
//! (`accounts:*` endpoints plus the secure-token refresh endpoint).
//!
//! Tokens live in memory for the lifetime of the process only.

use anyhow::Context;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use url::form_urlencoded;

use super::{AuthError, FederatedCredential, IdentityProvider, IssuedToken};
use crate::config::{ApiConfig, IdentityConfig};
use crate::entities::{Credential, Identity};

/// Refresh tokens this long before they actually expire
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);
/// Lifetime assumed when the provider omits `expiresIn`
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;

struct TokenSet {
    identity: Identity,
    id_token: SecretString,
    refresh_token: SecretString,
    expires_at: Instant,
}

/// Account response shared by sign-up, sign-in, federated sign-in and update
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

pub struct IdentityToolkitProvider {
    client: Client,
    api_key: SecretString,
    auth_base_url: String,
    token_base_url: String,
    session: Mutex<Option<TokenSet>>,
}

impl IdentityToolkitProvider {
    pub fn new(api_key: impl Into<String>, auth_base_url: &str, token_base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: SecretString::from(api_key.into()),
            auth_base_url: auth_base_url.trim_end_matches('/').to_string(),
            token_base_url: token_base_url.trim_end_matches('/').to_string(),
            session: Mutex::new(None),
        })
    }

    /// Build from configuration, reading the API key from the environment
    pub fn from_config(identity: &IdentityConfig, api: &ApiConfig) -> anyhow::Result<Self> {
        Self::new(
            identity.api_key()?,
            &identity.auth_base_url,
            &identity.token_base_url,
            api.timeout(),
        )
    }

    async fn post<T: DeserializeOwned>(&self, url: String, body: &impl Serialize) -> Result<T, AuthError> {
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.expose_secret())])
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| AuthError::Network(e.to_string()))?;

        if !status.is_success() {
            let code = provider_error_code(&text).unwrap_or_default();
            debug!("Identity provider answered {} with '{}'", status.as_u16(), code);
            return Err(classify_error(&code));
        }

        serde_json::from_str(&text).map_err(|e| AuthError::Unknown(format!("unexpected provider response: {e}")))
    }

    async fn account(&self, endpoint: &str, body: &impl Serialize) -> Result<AccountResponse, AuthError> {
        self.post(format!("{}/accounts:{}", self.auth_base_url, endpoint), body).await
    }

    /// Store the session described by an account response and return its identity
    async fn establish(&self, account: AccountResponse, fallback_email: Option<&str>) -> Result<Identity, AuthError> {
        let identity = Identity {
            uid: account.local_id,
            email: account
                .email
                .or_else(|| fallback_email.map(str::to_string))
                .unwrap_or_default(),
            display_name: account.display_name,
            photo_url: account.photo_url,
        };

        let (Some(id_token), Some(refresh_token)) = (account.id_token, account.refresh_token) else {
            return Err(AuthError::Unknown("provider did not issue a session token".to_string()));
        };

        *self.session.lock().await = Some(TokenSet {
            identity: identity.clone(),
            id_token: SecretString::from(id_token),
            refresh_token: SecretString::from(refresh_token),
            expires_at: expiry_from(account.expires_in.as_deref()),
        });

        Ok(identity)
    }

    async fn refresh(&self, tokens: &mut TokenSet) -> Result<(), AuthError> {
        info!("🔄 Refreshing identity token");
        let body = json!({
            "grant_type": "refresh_token",
            "refresh_token": tokens.refresh_token.expose_secret(),
        });
        let refreshed: RefreshResponse = self.post(format!("{}/token", self.token_base_url), &body).await?;

        tokens.id_token = SecretString::from(refreshed.id_token);
        tokens.refresh_token = SecretString::from(refreshed.refresh_token);
        tokens.expires_at = expiry_from(refreshed.expires_in.as_deref());
        Ok(())
    }
}

fn expiry_from(expires_in: Option<&str>) -> Instant {
    let secs = expires_in
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
    Instant::now() + Duration::from_secs(secs)
}

/// Error code out of `{"error": {"message": "CODE : details"}}`
fn provider_error_code(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let message = value.get("error")?.get("message")?.as_str()?;
    Some(message.split(" : ").next().unwrap_or(message).trim().to_string())
}

/// Map provider error codes onto the client's classification
pub fn classify_error(code: &str) -> AuthError {
    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "INVALID_EMAIL" | "USER_DISABLED"
        | "USER_NOT_FOUND" | "INVALID_IDP_RESPONSE" | "INVALID_ID_TOKEN" | "TOKEN_EXPIRED"
        | "INVALID_REFRESH_TOKEN" | "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => AuthError::InvalidCredential,
        "EMAIL_EXISTS" | "FEDERATED_USER_ID_ALREADY_LINKED" => AuthError::AlreadyInUse,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::TooManyAttempts,
        "WEAK_PASSWORD" => AuthError::WeakPassword(code.to_string()),
        "" => AuthError::Unknown("empty error response".to_string()),
        other => AuthError::Unknown(other.to_string()),
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitProvider {
    async fn current_identity(&self) -> Result<Option<Identity>, AuthError> {
        Ok(self.session.lock().await.as_ref().map(|tokens| tokens.identity.clone()))
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let account = self.account("signUp", &body).await?;
        self.establish(account, Some(email)).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let account = self.account("signInWithPassword", &body).await?;
        self.establish(account, Some(email)).await
    }

    async fn sign_in_with_federated(&self, credential: &FederatedCredential) -> Result<Identity, AuthError> {
        let post_body = {
            let mut form = form_urlencoded::Serializer::new(String::new());
            form.append_pair("providerId", &credential.provider_id);
            if let Some(id_token) = &credential.id_token {
                form.append_pair("id_token", id_token);
            }
            if let Some(access_token) = &credential.access_token {
                form.append_pair("access_token", access_token);
            }
            form.finish()
        };

        let body = json!({
            "postBody": post_body,
            "requestUri": "http://localhost",
            "returnIdpCredential": true,
            "returnSecureToken": true,
        });
        let account = self.account("signInWithIdp", &body).await?;
        self.establish(account, None).await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.session.lock().await.take();
        Ok(())
    }

    async fn update_profile(&self, display_name: Option<&str>, photo_url: Option<&str>) -> Result<Identity, AuthError> {
        let mut guard = self.session.lock().await;
        let tokens = guard.as_mut().ok_or(AuthError::NotSignedIn)?;
        if tokens.expires_at <= Instant::now() + EXPIRY_MARGIN {
            self.refresh(tokens).await?;
        }

        let body = json!({
            "idToken": tokens.id_token.expose_secret(),
            "displayName": display_name,
            "photoUrl": photo_url,
            "returnSecureToken": true,
        });
        let account: AccountResponse = self
            .post(format!("{}/accounts:update", self.auth_base_url), &body)
            .await?;

        tokens.identity.display_name = account.display_name.or_else(|| display_name.map(str::to_string));
        tokens.identity.photo_url = account.photo_url.or_else(|| photo_url.map(str::to_string));
        if let (Some(id_token), Some(refresh_token)) = (account.id_token, account.refresh_token) {
            tokens.id_token = SecretString::from(id_token);
            tokens.refresh_token = SecretString::from(refresh_token);
            tokens.expires_at = expiry_from(account.expires_in.as_deref());
        }

        Ok(tokens.identity.clone())
    }

    async fn id_token(&self) -> Result<IssuedToken, AuthError> {
        let mut guard = self.session.lock().await;
        let tokens = guard.as_mut().ok_or(AuthError::NotSignedIn)?;

        let mut refreshed = false;
        if tokens.expires_at <= Instant::now() + EXPIRY_MARGIN {
            self.refresh(tokens).await?;
            refreshed = true;
        }

        Ok(IssuedToken {
            credential: Credential::new(tokens.id_token.expose_secret().to_string()),
            refreshed,
        })
    }
}
