use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// The signed-in user as mirrored from the identity provider
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl Identity {
    /// An identity can only be used for protected views when it carries a usable email
    pub fn has_valid_email(&self) -> bool {
        let email = self.email.trim();
        !email.is_empty() && email.contains('@')
    }

    /// Name to show in the navigation bar, falling back to the email
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

/// Short-lived bearer token proving the identity to the marketplace API
pub struct Credential(SecretString);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Raw token for the `Authorization` header
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}
