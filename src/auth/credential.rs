// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential extraction.
//!
//! Pulls exactly one candidate credential out of the inbound headers, in
//! order of precedence:
//!
//! 1. API-key header (any non-empty value)
//! 2. `Authorization` header (any non-empty value)
//! 3. Configured cookie, wrapped as `Bearer <value>`
//!
//! Nothing here validates the credential; that happens in the resolver.

use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use axum_extra::extract::cookie::CookieJar;

/// Scheme prefix expected on bearer credentials.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Raw credential material taken from a request, before verification.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Value of the API-key header.
    ApiKey(String),
    /// Full bearer value, including the `Bearer ` scheme.
    Bearer(String),
    /// No credential of any kind.
    None,
}

// Credentials are secrets; keep them out of debug output.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::ApiKey(_) => f.write_str("ApiKey(..)"),
            Credential::Bearer(_) => f.write_str("Bearer(..)"),
            Credential::None => f.write_str("None"),
        }
    }
}

impl Credential {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Credential::ApiKey(_) => "api_key",
            Credential::Bearer(_) => "bearer",
            Credential::None => "none",
        }
    }
}

/// Where credentials are looked for.
#[derive(Debug, Clone)]
pub struct CredentialSources {
    /// Header carrying the fixed API key.
    pub api_key_header: HeaderName,
    /// Cookie carrying a bare bearer token. Empty disables the fallback.
    pub cookie_name: String,
}

impl Default for CredentialSources {
    fn default() -> Self {
        Self {
            api_key_header: HeaderName::from_static("x-api-key"),
            cookie_name: String::new(),
        }
    }
}

/// Extract the single credential carried by a request.
pub fn extract_credential(headers: &HeaderMap, sources: &CredentialSources) -> Credential {
    if let Some(key) = non_empty(headers.get(&sources.api_key_header)) {
        return Credential::ApiKey(key);
    }

    if let Some(bearer) = non_empty(headers.get(AUTHORIZATION)) {
        return Credential::Bearer(bearer);
    }

    if !sources.cookie_name.is_empty() {
        let jar = CookieJar::from_headers(headers);
        if let Some(cookie) = jar.get(&sources.cookie_name) {
            return Credential::Bearer(format!("{BEARER_PREFIX}{}", cookie.value()));
        }
    }

    Credential::None
}

// Non-UTF-8 values are kept (lossily) so they fail verification instead of
// silently downgrading the request to anonymous.
fn non_empty(value: Option<&HeaderValue>) -> Option<String> {
    let value = value?;
    if value.is_empty() {
        return None;
    }
    Some(String::from_utf8_lossy(value.as_bytes()).into_owned())
}
