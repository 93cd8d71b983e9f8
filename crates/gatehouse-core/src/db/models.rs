// User records and the provider identities linked to them.
//
// A user may carry local credentials (email + password hash), any number
// of linked provider identities, or both. Uniqueness — one user per local
// email, one user per (provider, external id) — is enforced by the store.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The external providers a user identity can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Facebook,
    Twitter,
    Google,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
            Self::Google => "google",
        }
    }

    /// All supported providers.
    pub fn all() -> [ProviderKind; 3] {
        [Self::Facebook, Self::Twitter, Self::Google]
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "facebook" => Ok(Self::Facebook),
            "twitter" => Ok(Self::Twitter),
            "google" => Ok(Self::Google),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

/// Local email/password credentials. The hash is produced by scrypt in
/// the `gatehouse` crate; this type never sees a plaintext password.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalCredentials {
    /// Lowercased at construction.
    pub email: String,
    pub password_hash: String,
}

impl LocalCredentials {
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            email: email.into().to_lowercase(),
            password_hash: password_hash.into(),
        }
    }
}

/// A linked identity from an external provider, as delivered by the
/// provider's own (out-of-scope) OAuth handshake.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderIdentity {
    pub provider: ProviderKind,
    /// Provider-specific user identifier (e.g. Google sub, Facebook id).
    pub external_id: String,
    /// The access token the provider handed back at link time.
    pub access_token: String,
    pub display_name: String,
    /// Twitter keeps a separate handle alongside the display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A user record as persisted by the identity store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local: Option<LocalCredentials>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identities: Vec<ProviderIdentity>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a user with local credentials only.
    pub fn new_local(id: String, credentials: LocalCredentials) -> Self {
        let now = Utc::now();
        Self {
            id,
            local: Some(credentials),
            identities: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a user from a single provider identity.
    pub fn new_from_identity(id: String, identity: ProviderIdentity) -> Self {
        let now = Utc::now();
        Self {
            id,
            local: None,
            identities: vec![identity],
            created_at: now,
            updated_at: now,
        }
    }

    /// The user's local email, if local credentials are set.
    pub fn local_email(&self) -> Option<&str> {
        self.local.as_ref().map(|c| c.email.as_str())
    }

    /// The linked identity for a provider, if any.
    pub fn identity(&self, provider: ProviderKind) -> Option<&ProviderIdentity> {
        self.identities.iter().find(|i| i.provider == provider)
    }

    /// Whether this user carries the given (provider, external id) pair.
    pub fn has_identity(&self, provider: ProviderKind, external_id: &str) -> bool {
        self.identities
            .iter()
            .any(|i| i.provider == provider && i.external_id == external_id)
    }

    /// Attach a provider identity and bump `updated_at`. Replaces an
    /// existing identity for the same provider.
    pub fn attach_identity(&mut self, identity: ProviderIdentity) {
        self.identities.retain(|i| i.provider != identity.provider);
        self.identities.push(identity);
        self.updated_at = Utc::now();
    }
}
