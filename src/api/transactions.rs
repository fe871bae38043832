// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction endpoints.
//!
//! Token holders always pay as the attendee registered under their subject.
//! API-token callers act for a payer named in the request body. Registered
//! users only see their own payments; admins and API-token callers see all.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::{AdminOnly, Authenticated, AuthError, Identity, RequestContext},
    downstream::{PaymentReceipt, PaymentRequest},
    error::ApiError,
    models::CreateTransactionRequest,
    state::AppState,
};

/// Create a payment for the caller.
#[utoipa::path(
    post,
    path = "/v1/transactions",
    tag = "Transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Payment created", body = PaymentReceipt),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "No valid credential"),
        (status = 502, description = "Payment provider unavailable")
    )
)]
pub async fn create_transaction(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
    payload: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PaymentReceipt>), ApiError> {
    let Json(body) =
        payload.map_err(|e| ApiError::bad_request(ctx.request_id.clone(), e.body_text()))?;

    if body.amount_minor == 0 {
        return Err(ApiError::bad_request(
            ctx.request_id,
            "amount_minor must be positive",
        ));
    }
    if !is_currency_code(&body.currency) {
        return Err(ApiError::bad_request(
            ctx.request_id,
            "currency must be a three-letter ISO 4217 code",
        ));
    }

    let payer = resolve_payer(&state, &ctx, body.payer).await?;

    let receipt = state
        .payments
        .create_payment(&PaymentRequest {
            payer,
            amount_minor: body.amount_minor,
            currency: body.currency,
            description: body.description,
        })
        .await
        .map_err(|e| ApiError::downstream(ctx.request_id.clone(), e))?;

    tracing::info!(
        request_id = %ctx.request_id,
        identity = ctx.identity.kind(),
        reference = %receipt.reference,
        "transaction created"
    );

    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Fetch the status of a payment.
#[utoipa::path(
    get,
    path = "/v1/transactions/{reference}",
    tag = "Transactions",
    params(("reference" = String, Path, description = "Provider payment reference")),
    responses(
        (status = 200, description = "Payment status", body = PaymentReceipt),
        (status = 401, description = "No valid credential"),
        (status = 404, description = "Unknown payment")
    )
)]
pub async fn get_transaction(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
    Path(reference): Path<String>,
) -> Result<Json<PaymentReceipt>, ApiError> {
    let receipt = state
        .payments
        .payment_status(&reference)
        .await
        .map_err(|e| ApiError::downstream(ctx.request_id.clone(), e))?;

    if let Identity::RegisteredUser { .. } = ctx.identity {
        let payer = resolve_payer(&state, &ctx, None).await?;
        if payer != receipt.payer {
            // Same answer as an unknown reference
            return Err(ApiError::not_found(
                ctx.request_id,
                format!("payment {reference} not found"),
            ));
        }
    }

    Ok(Json(receipt))
}

/// Refund a payment. Admin only.
#[utoipa::path(
    post,
    path = "/v1/transactions/{reference}/refund",
    tag = "Transactions",
    params(("reference" = String, Path, description = "Provider payment reference")),
    responses(
        (status = 200, description = "Payment refunded", body = PaymentReceipt),
        (status = 401, description = "No valid credential"),
        (status = 403, description = "Caller is not an admin"),
        (status = 501, description = "Refunds are not supported by the provider")
    )
)]
pub async fn refund_transaction(
    State(state): State<AppState>,
    AdminOnly(ctx): AdminOnly,
    Path(reference): Path<String>,
) -> Result<Json<PaymentReceipt>, ApiError> {
    let receipt = state
        .payments
        .refund_payment(&reference)
        .await
        .map_err(|e| ApiError::downstream(ctx.request_id.clone(), e))?;

    tracing::info!(
        request_id = %ctx.request_id,
        subject = ctx.identity.subject().unwrap_or_default(),
        reference = %receipt.reference,
        "transaction refunded"
    );

    Ok(Json(receipt))
}

/// Who pays: the attendee behind a token subject, or the payer an API-token
/// caller names explicitly.
async fn resolve_payer(
    state: &AppState,
    ctx: &RequestContext,
    requested: Option<String>,
) -> Result<String, ApiError> {
    if ctx.identity.is_api_token() {
        return requested.filter(|p| !p.is_empty()).ok_or_else(|| {
            ApiError::bad_request(
                ctx.request_id.clone(),
                "payer is required for API-token calls",
            )
        });
    }

    let Some(subject) = ctx.identity.subject() else {
        return Err(AuthError::MissingToken.into_api_error(ctx.request_id.clone()));
    };

    let attendee = state
        .attendees
        .lookup(subject)
        .await
        .map_err(|e| ApiError::downstream(ctx.request_id.clone(), e))?;

    Ok(attendee.id)
}

fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}
