// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication gate for Axum.
//!
//! Runs in front of every route:
//!
//! 1. Assign the request correlation id (always succeeds)
//! 2. Extract the credential
//! 3. Verify and classify it into an [`Identity`](super::Identity)
//!
//! On success the [`RequestContext`] is attached and the handler runs. On
//! failure a structured error is written and the handler never runs; no
//! partial identity is ever attached. Either way the response carries
//! `x-request-id`.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/protected", get(handler))
//!     .layer(axum::middleware::from_fn_with_state(state.clone(), auth_gate))
//!     .with_state(state);
//! ```

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::Instrument;

use super::correlation::{RequestId, REQUEST_ID_HEADER};
use super::credential::extract_credential;
use super::extractor::RequestContext;
use crate::state::AppState;

/// Authentication middleware function.
pub async fn auth_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let request_id = RequestId::from_header(request.headers().get(REQUEST_ID_HEADER));
    request.extensions_mut().insert(request_id.clone());

    let span = tracing::info_span!("auth_gate", request_id = %request_id);

    async move {
        let credential = extract_credential(request.headers(), &state.credential_sources);

        let mut response = match state.resolver.resolve(&credential, request.headers()) {
            Ok(identity) => {
                tracing::debug!(
                    credential = credential.kind(),
                    identity = identity.kind(),
                    "request identity resolved"
                );
                request
                    .extensions_mut()
                    .insert(RequestContext::new(request_id.clone(), identity));
                next.run(request).await
            }
            Err(err) => {
                tracing::warn!(
                    credential = credential.kind(),
                    reason = err.reason(),
                    "request rejected"
                );
                err.into_api_error(request_id.clone()).into_response()
            }
        };

        if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}
