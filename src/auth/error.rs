// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::http::StatusCode;

use super::correlation::RequestId;
use crate::error::ApiError;

/// Request-time authentication and authorization failure.
///
/// Messages are deliberately coarse: callers never learn whether a token
/// failed on the key, the signature or the subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Route requires a credential and none was supplied
    MissingToken,
    /// Bearer value is not `Bearer <token>`
    MalformedToken,
    /// No configured key verified the token
    InvalidToken,
    /// Token verified but carries an empty subject
    EmptySubject,
    /// API key did not match the configured secret
    InvalidApiKey,
    /// Authenticated, but the route needs a stronger identity
    InsufficientPermissions,
    /// Route executed without the auth gate in front of it
    MissingContext,
}

impl AuthError {
    /// Short machine-readable reason, used in logs only.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidToken => "invalid_token",
            AuthError::EmptySubject => "empty_subject",
            AuthError::InvalidApiKey => "invalid_api_key",
            AuthError::InsufficientPermissions => "insufficient_permissions",
            AuthError::MissingContext => "missing_context",
        }
    }

    /// Get the HTTP status code for this error.
    ///
    /// A malformed bearer value is reported as 401 like every other
    /// authentication failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::MalformedToken
            | AuthError::InvalidToken
            | AuthError::EmptySubject
            | AuthError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AuthError::MissingContext => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render as the structured error body for `request_id`.
    pub fn into_api_error(self, request_id: RequestId) -> ApiError {
        ApiError::new(request_id, self.status_code(), self.to_string())
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Token is missing"),
            AuthError::MalformedToken => write!(f, "Token is malformed"),
            AuthError::InvalidToken | AuthError::EmptySubject => write!(f, "Token is invalid"),
            AuthError::InvalidApiKey => write!(f, "API key is invalid"),
            AuthError::InsufficientPermissions => {
                write!(f, "Insufficient permissions for this operation")
            }
            AuthError::MissingContext => write!(f, "Request was not authenticated"),
        }
    }
}

impl std::error::Error for AuthError {}
