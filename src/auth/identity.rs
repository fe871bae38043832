// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Caller identity and its resolution from a credential.
//!
//! ## Precedence
//!
//! - `ApiKey` is evaluated exclusively: it either matches the configured
//!   secret (`ApiTokenCaller`) or the request is rejected. A bearer token
//!   sent alongside is never looked at.
//! - `Bearer` is verified against the [`KeyRing`]. Members of the admin group
//!   become `Admin` only when the legacy elevation header carries the
//!   expected value; everyone else is a `RegisteredUser`.
//! - No credential resolves to `Anonymous`. Whether that is acceptable is up
//!   to the route.

use std::sync::Arc;

use axum::http::{HeaderMap, HeaderName};
use serde::Serialize;
use subtle::ConstantTimeEq;
use utoipa::ToSchema;

use super::credential::Credential;
use super::error::AuthError;
use super::keyring::KeyRing;

/// The single resolved classification of a caller.
///
/// Exactly one is attached per request and it is never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Identity {
    /// No credential was presented
    Anonymous,
    /// Caller presented the fixed API-key secret
    ApiTokenCaller,
    /// Verified bearer token holder
    RegisteredUser { subject: String, groups: Vec<String> },
    /// Verified admin-group member with legacy elevation
    Admin { subject: String, groups: Vec<String> },
}

impl Identity {
    pub fn is_api_token(&self) -> bool {
        matches!(self, Identity::ApiTokenCaller)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Identity::Admin { .. })
    }

    /// True for any verified token holder, elevated or not.
    pub fn is_registered_user(&self) -> bool {
        matches!(
            self,
            Identity::RegisteredUser { .. } | Identity::Admin { .. }
        )
    }

    /// True for every identity that presented a valid credential.
    pub fn is_authenticated(&self) -> bool {
        match self {
            Identity::Anonymous => false,
            Identity::ApiTokenCaller => true,
            Identity::RegisteredUser { subject, .. } | Identity::Admin { subject, .. } => {
                !subject.is_empty()
            }
        }
    }

    /// Token subject, for token-authenticated callers.
    pub fn subject(&self) -> Option<&str> {
        match self {
            Identity::RegisteredUser { subject, .. } | Identity::Admin { subject, .. } => {
                Some(subject)
            }
            Identity::Anonymous | Identity::ApiTokenCaller => None,
        }
    }

    pub fn groups(&self) -> &[String] {
        match self {
            Identity::RegisteredUser { groups, .. } | Identity::Admin { groups, .. } => groups,
            Identity::Anonymous | Identity::ApiTokenCaller => &[],
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Identity::Anonymous => "anonymous",
            Identity::ApiTokenCaller => "api_token_caller",
            Identity::RegisteredUser { .. } => "registered_user",
            Identity::Admin { .. } => "admin",
        }
    }
}

/// Settings that drive identity classification.
#[derive(Clone)]
pub struct AuthPolicy {
    /// Fixed API-key secret. `None` rejects every API key.
    pub api_key_secret: Option<String>,
    /// Group whose members may be elevated to admin.
    pub admin_group: String,
    /// Legacy elevation header name.
    pub elevation_header: HeaderName,
    /// Value the elevation header must carry.
    pub elevation_value: String,
}

impl std::fmt::Debug for AuthPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthPolicy")
            .field("api_key_secret", &self.api_key_secret.as_ref().map(|_| "<redacted>"))
            .field("admin_group", &self.admin_group)
            .field("elevation_header", &self.elevation_header)
            .field("elevation_value", &self.elevation_value)
            .finish()
    }
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self {
            api_key_secret: None,
            admin_group: "admin".to_string(),
            elevation_header: HeaderName::from_static("x-admin-request"),
            elevation_value: "available".to_string(),
        }
    }
}

/// Turns a credential into an [`Identity`].
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    keyring: Arc<KeyRing>,
    policy: AuthPolicy,
}

impl IdentityResolver {
    pub fn new(keyring: Arc<KeyRing>, policy: AuthPolicy) -> Self {
        Self { keyring, policy }
    }

    pub fn keyring(&self) -> &KeyRing {
        &self.keyring
    }

    /// Resolve the caller identity. `headers` is consulted only for the
    /// legacy elevation header.
    pub fn resolve(
        &self,
        credential: &Credential,
        headers: &HeaderMap,
    ) -> Result<Identity, AuthError> {
        match credential {
            Credential::ApiKey(presented) => self.resolve_api_key(presented),
            Credential::Bearer(raw) => {
                let claims = self.keyring.verify(raw)?;
                if claims.in_group(&self.policy.admin_group) && self.elevation_requested(headers) {
                    Ok(Identity::Admin {
                        subject: claims.sub,
                        groups: claims.groups,
                    })
                } else {
                    Ok(Identity::RegisteredUser {
                        subject: claims.sub,
                        groups: claims.groups,
                    })
                }
            }
            Credential::None => Ok(Identity::Anonymous),
        }
    }

    fn resolve_api_key(&self, presented: &str) -> Result<Identity, AuthError> {
        match &self.policy.api_key_secret {
            Some(secret) if secrets_match(presented, secret) => Ok(Identity::ApiTokenCaller),
            _ => Err(AuthError::InvalidApiKey),
        }
    }

    fn elevation_requested(&self, headers: &HeaderMap) -> bool {
        headers
            .get(&self.policy.elevation_header)
            .is_some_and(|value| value.as_bytes() == self.policy.elevation_value.as_bytes())
    }
}

/// Constant-time comparison of a presented secret against the expected one.
///
/// Both sides are padded to the longer length so the comparison does not
/// return early on a length mismatch.
fn secrets_match(presented: &str, expected: &str) -> bool {
    let max_len = presented.len().max(expected.len());

    // Distinct pad bytes keep padded inputs unequal when lengths differ
    let mut presented_padded = vec![0u8; max_len];
    let mut expected_padded = vec![0xFFu8; max_len];
    presented_padded[..presented.len()].copy_from_slice(presented.as_bytes());
    expected_padded[..expected.len()].copy_from_slice(expected.as_bytes());

    let lengths_equal = presented.len().ct_eq(&expected.len());
    let contents_equal = presented_padded.ct_eq(&expected_padded);

    (lengths_equal & contents_equal).into()
}
