// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::Json;

use crate::auth::Authenticated;
use crate::models::WhoAmIResponse;

/// Describe the authenticated caller.
#[utoipa::path(
    get,
    path = "/v1/whoami",
    tag = "Identity",
    responses(
        (status = 200, description = "Resolved caller identity", body = WhoAmIResponse),
        (status = 401, description = "No valid credential")
    )
)]
pub async fn whoami(Authenticated(ctx): Authenticated) -> Json<WhoAmIResponse> {
    Json(WhoAmIResponse {
        request_id: ctx.request_id,
        identity: ctx.identity,
    })
}
