// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the typed request context.
//!
//! The auth gate stores a [`RequestContext`] in request extensions. Handlers
//! state what they require through the extractor they take:
//!
//! ```rust,ignore
//! async fn list(Authenticated(ctx): Authenticated) -> impl IntoResponse {
//!     // ctx.identity is never Anonymous here
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, Identity, RequestId};
use crate::error::ApiError;

/// Per-request authentication result, created by the auth gate.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub identity: Identity,
}

impl RequestContext {
    pub fn new(request_id: RequestId, identity: Identity) -> Self {
        Self {
            request_id,
            identity,
        }
    }
}

/// Request id assigned by the gate, or a fresh one if the gate never ran.
fn request_id_of(parts: &Parts) -> RequestId {
    parts
        .extensions
        .get::<RequestId>()
        .cloned()
        .unwrap_or_else(RequestId::generate)
}

impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<RequestContext>() {
            Some(ctx) => Ok(ctx.clone()),
            None => {
                tracing::error!("route executed without the auth gate");
                Err(AuthError::MissingContext.into_api_error(request_id_of(parts)))
            }
        }
    }
}

/// Requires any authenticated identity (API token, user or admin).
pub struct Authenticated(pub RequestContext);

impl<S: Send + Sync> FromRequestParts<S> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ctx = RequestContext::from_request_parts(parts, state).await?;

        if !ctx.identity.is_authenticated() {
            return Err(AuthError::MissingToken.into_api_error(ctx.request_id));
        }

        Ok(Authenticated(ctx))
    }
}

/// Requires an elevated admin identity.
pub struct AdminOnly(pub RequestContext);

impl<S: Send + Sync> FromRequestParts<S> for AdminOnly {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Authenticated(ctx) = Authenticated::from_request_parts(parts, state).await?;

        if !ctx.identity.is_admin() {
            return Err(AuthError::InsufficientPermissions.into_api_error(ctx.request_id));
        }

        Ok(AdminOnly(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    fn parts_with(ctx: Option<RequestContext>) -> Parts {
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        if let Some(ctx) = ctx {
            parts.extensions.insert(ctx.request_id.clone());
            parts.extensions.insert(ctx);
        }
        parts
    }

    fn ctx(identity: Identity) -> RequestContext {
        RequestContext::new(RequestId::parse("1a2b3c4d").unwrap(), identity)
    }

    fn user() -> Identity {
        Identity::RegisteredUser {
            subject: "user_123".to_string(),
            groups: vec!["admin".to_string()],
        }
    }

    #[tokio::test]
    async fn context_missing_without_gate() {
        let mut parts = parts_with(None);
        let err = RequestContext::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn authenticated_rejects_anonymous_with_token_missing() {
        let mut parts = parts_with(Some(ctx(Identity::Anonymous)));
        let err = match Authenticated::from_request_parts(&mut parts, &()).await {
            Ok(_) => panic!("anonymous caller accepted"),
            Err(err) => err,
        };
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.message, "Token is missing");
        assert_eq!(err.request_id.as_str(), "1a2b3c4d");
    }

    #[tokio::test]
    async fn authenticated_accepts_api_token_caller() {
        let mut parts = parts_with(Some(ctx(Identity::ApiTokenCaller)));
        let Authenticated(ctx) = Authenticated::from_request_parts(&mut parts, &())
            .await
            .ok()
            .unwrap();
        assert!(ctx.identity.is_api_token());
    }

    #[tokio::test]
    async fn admin_only_rejects_non_admin() {
        let mut parts = parts_with(Some(ctx(user())));
        let err = match AdminOnly::from_request_parts(&mut parts, &()).await {
            Ok(_) => panic!("non-admin accepted"),
            Err(err) => err,
        };
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_only_rejects_api_token_caller() {
        let mut parts = parts_with(Some(ctx(Identity::ApiTokenCaller)));
        assert!(AdminOnly::from_request_parts(&mut parts, &()).await.is_err());
    }

    #[tokio::test]
    async fn admin_only_accepts_admin() {
        let admin = Identity::Admin {
            subject: "root".to_string(),
            groups: vec!["admin".to_string()],
        };
        let mut parts = parts_with(Some(ctx(admin)));
        assert!(AdminOnly::from_request_parts(&mut parts, &()).await.is_ok());
    }
}
