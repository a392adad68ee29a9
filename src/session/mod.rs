//! Session store.
//!
//! Mirrors the external identity provider's session locally. The store owns
//! the single [`SessionState`] value and publishes every change on a
//! `tokio::sync::watch` channel; components receive a read-only
//! [`SessionHandle`] instead of reaching for a global.
//!
//! Subscribers are notified on every sign-in, sign-out, profile update and
//! token refresh, whether or not the identity itself changed.

use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::watch;

use crate::constants::{
    ERROR_WEAK_PASSWORD, PASSWORD_MIN_LENGTH, SUCCESS_ACCOUNT_CREATED, SUCCESS_PROFILE_UPDATED, SUCCESS_SIGNED_IN,
    SUCCESS_SIGNED_OUT,
};
use crate::entities::{Credential, Identity};
use crate::notifications::Notifier;

pub mod identity_toolkit;

pub use identity_toolkit::IdentityToolkitProvider;

/// Authentication state as seen by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// The provider has not reported the initial session yet
    Resolving,
    SignedOut,
    SignedIn(Identity),
}

impl SessionState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::SignedIn(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, SessionState::Resolving)
    }
}

/// Provider failures, classified for display
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredential,

    #[error("An account already exists for this email")]
    AlreadyInUse,

    #[error("Too many attempts, please try again later")]
    TooManyAttempts,

    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    WeakPassword(String),

    #[error("You are not signed in")]
    NotSignedIn,

    #[error("Authentication failed: {0}")]
    Unknown(String),
}

/// Proof of a federated (OAuth) sign-in obtained by the view layer
#[derive(Debug, Clone)]
pub struct FederatedCredential {
    /// Provider identifier, e.g. `google.com`
    pub provider_id: String,
    pub id_token: Option<String>,
    pub access_token: Option<String>,
}

impl FederatedCredential {
    pub fn google(id_token: impl Into<String>) -> Self {
        Self {
            provider_id: "google.com".to_string(),
            id_token: Some(id_token.into()),
            access_token: None,
        }
    }
}

/// Bearer token handed out by the provider
#[derive(Debug)]
pub struct IssuedToken {
    pub credential: Credential,
    /// The provider had to refresh the token to serve this request
    pub refreshed: bool,
}

/// External identity provider interface.
///
/// Implementations own token issuance and refresh; the session store only
/// consumes the results.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Identity of an already established session, if any
    async fn current_identity(&self) -> Result<Option<Identity>, AuthError>;

    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_in_with_federated(&self, credential: &FederatedCredential) -> Result<Identity, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    async fn update_profile(&self, display_name: Option<&str>, photo_url: Option<&str>)
        -> Result<Identity, AuthError>;

    /// Current bearer token, refreshed when it is about to expire
    async fn id_token(&self) -> Result<IssuedToken, AuthError>;
}

/// Registration password policy: minimum length, one uppercase and one lowercase letter
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    let long_enough = password.chars().count() >= PASSWORD_MIN_LENGTH;
    let has_upper = password.chars().any(char::is_uppercase);
    let has_lower = password.chars().any(char::is_lowercase);

    if long_enough && has_upper && has_lower {
        Ok(())
    } else {
        Err(AuthError::WeakPassword(ERROR_WEAK_PASSWORD.to_string()))
    }
}

/// Owner of the session state; drives the identity provider
pub struct SessionStore {
    provider: Arc<dyn IdentityProvider>,
    state: Arc<watch::Sender<SessionState>>,
    notifier: Notifier,
}

impl SessionStore {
    pub fn new(provider: Arc<dyn IdentityProvider>, notifier: Notifier) -> Self {
        let (state, _) = watch::channel(SessionState::Resolving);
        Self {
            provider,
            state: Arc::new(state),
            notifier,
        }
    }

    /// Read-only handle to inject into components
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            provider: Arc::clone(&self.provider),
            state: Arc::clone(&self.state),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Resolve the initial session from the provider.
    ///
    /// A provider failure resolves to signed out; the gate must never stay
    /// in its loading state forever.
    pub async fn restore(&self) -> SessionState {
        let resolved = match self.provider.current_identity().await {
            Ok(Some(identity)) => {
                info!("🔑 Restored session for {}", identity.email);
                SessionState::SignedIn(identity)
            }
            Ok(None) => SessionState::SignedOut,
            Err(e) => {
                warn!("⚠️  Could not restore session: {e}");
                SessionState::SignedOut
            }
        };
        self.state.send_replace(resolved.clone());
        resolved
    }

    pub async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        if let Err(e) = validate_password(password) {
            self.notifier.error(e.to_string());
            return Err(e);
        }
        let result = self.provider.create_account(email, password).await;
        self.apply_sign_in(result, SUCCESS_ACCOUNT_CREATED)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let result = self.provider.sign_in(email, password).await;
        self.apply_sign_in(result, SUCCESS_SIGNED_IN)
    }

    pub async fn sign_in_with_federated(&self, credential: &FederatedCredential) -> Result<Identity, AuthError> {
        let result = self.provider.sign_in_with_federated(credential).await;
        self.apply_sign_in(result, SUCCESS_SIGNED_IN)
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        match self.provider.sign_out().await {
            Ok(()) => {
                info!("🔒 Signed out");
                self.state.send_replace(SessionState::SignedOut);
                self.notifier.success(SUCCESS_SIGNED_OUT);
                Ok(())
            }
            Err(e) => {
                self.notifier.error(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn update_profile(&self, display_name: Option<&str>, photo_url: Option<&str>) -> Result<Identity, AuthError> {
        if self.state.borrow().identity().is_none() {
            return Err(AuthError::NotSignedIn);
        }

        match self.provider.update_profile(display_name, photo_url).await {
            Ok(identity) => {
                self.state.send_replace(SessionState::SignedIn(identity.clone()));
                self.notifier.success(SUCCESS_PROFILE_UPDATED);
                Ok(identity)
            }
            Err(e) => {
                self.notifier.error(e.to_string());
                Err(e)
            }
        }
    }

    fn apply_sign_in(&self, result: Result<Identity, AuthError>, message: &str) -> Result<Identity, AuthError> {
        match result {
            Ok(identity) => {
                info!("🔑 Signed in as {}", identity.email);
                self.state.send_replace(SessionState::SignedIn(identity.clone()));
                self.notifier.success(message);
                Ok(identity)
            }
            Err(e) => {
                warn!("⚠️  Sign-in failed: {e}");
                self.notifier.error(e.to_string());
                Err(e)
            }
        }
    }
}

/// Read-only view of the session plus on-demand credentials.
///
/// Dropping a receiver returned by [`SessionHandle::subscribe`] unsubscribes it.
#[derive(Clone)]
pub struct SessionHandle {
    provider: Arc<dyn IdentityProvider>,
    state: Arc<watch::Sender<SessionState>>,
}

impl SessionHandle {
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity().cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Fetch a bearer token for the current identity.
    ///
    /// Tokens are not cached here; every request asks the provider. A
    /// refresh notifies subscribers, and a rejected refresh signs out of
    /// the provider as well, so a later restore stays signed out.
    pub async fn credential(&self) -> Result<Credential, AuthError> {
        if self.state.borrow().identity().is_none() {
            return Err(AuthError::NotSignedIn);
        }

        match self.provider.id_token().await {
            Ok(issued) => {
                if issued.refreshed {
                    self.state.send_modify(|_| {});
                }
                Ok(issued.credential)
            }
            Err(AuthError::InvalidCredential) => {
                warn!("⚠️  Session token was rejected, signing out");
                if let Err(e) = self.provider.sign_out().await {
                    warn!("⚠️  Provider sign-out after rejected token failed: {e}");
                }
                self.state.send_replace(SessionState::SignedOut);
                Err(AuthError::InvalidCredential)
            }
            Err(e) => Err(e),
        }
    }
}
