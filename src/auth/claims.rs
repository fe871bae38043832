// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims decoded from a verified bearer token.

use serde::{Deserialize, Serialize};

/// Claims carried by a bearer token.
///
/// Only `sub` and `groups` drive authorization. Registered claims are kept
/// for logging and are validated by `jsonwebtoken` when present
/// (`exp`, `nbf`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (caller identifier). Missing decodes as empty and is rejected.
    #[serde(default)]
    pub sub: String,

    /// Group memberships, in token order.
    #[serde(default)]
    pub groups: Vec<String>,

    #[serde(flatten)]
    pub registered: RegisteredClaims,
}

/// Standard registered claims (RFC 7519 section 4.1).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisteredClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl Claims {
    /// Whether the token lists `group` among its memberships.
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}
