// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{Identity, RequestId};

/// Request to create a transaction.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTransactionRequest {
    /// Amount in the currency's minor unit (e.g. cents). Must be positive.
    pub amount_minor: u64,
    /// ISO 4217 currency code (three uppercase letters).
    pub currency: String,
    /// Free-text description forwarded to the provider.
    #[serde(default)]
    pub description: Option<String>,
    /// Payer reference. Required for API-token calls, ignored otherwise
    /// (token holders always pay as themselves).
    #[serde(default)]
    pub payer: Option<String>,
}

/// The caller as resolved by the auth gate.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WhoAmIResponse {
    /// Correlation id of this request.
    #[schema(value_type = String, example = "1a2b3c4d")]
    pub request_id: RequestId,
    pub identity: Identity,
}

/// Liveness response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// Number of bearer verification keys loaded.
    pub keys: usize,
}
