// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Payment provider adapter.
//!
//! The live adapter supports creating payments and reading their status.
//! Refunds are not offered by the provider integration yet and report
//! [`DownstreamError::Unimplemented`].

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use url::Url;
use utoipa::ToSchema;

use super::{endpoint, DownstreamError};

const SERVICE: &str = "payment provider";

/// Payment to be created at the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentRequest {
    /// Payer reference (attendee id).
    pub payer: String,
    /// Amount in the currency's minor unit (e.g. cents).
    pub amount_minor: u64,
    /// ISO 4217 currency code.
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Provider-side payment state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

/// Provider acknowledgement for a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentReceipt {
    /// Provider payment reference.
    pub reference: String,
    pub status: PaymentStatus,
    pub payer: String,
    pub amount_minor: u64,
    pub currency: String,
}

/// Payment provider capability.
#[async_trait]
pub trait PaymentAdapter: Send + Sync {
    async fn create_payment(&self, request: &PaymentRequest)
        -> Result<PaymentReceipt, DownstreamError>;

    async fn payment_status(&self, reference: &str) -> Result<PaymentReceipt, DownstreamError>;

    async fn refund_payment(&self, reference: &str) -> Result<PaymentReceipt, DownstreamError>;
}

/// Live adapter over the provider's REST API.
pub struct HttpPaymentAdapter {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpPaymentAdapter {
    pub fn new(base_url: Url, client: reqwest::Client) -> Self {
        Self { base_url, client }
    }

    async fn read_receipt(
        response: reqwest::Response,
        reference: Option<&str>,
    ) -> Result<PaymentReceipt, DownstreamError> {
        match response.status() {
            StatusCode::NOT_FOUND => Err(DownstreamError::NotFound {
                service: SERVICE,
                what: format!("payment {}", reference.unwrap_or("<new>")),
            }),
            status if !status.is_success() => Err(DownstreamError::UnexpectedStatus {
                service: SERVICE,
                status: status.as_u16(),
            }),
            _ => response
                .json()
                .await
                .map_err(|source| DownstreamError::Transport {
                    service: SERVICE,
                    source,
                }),
        }
    }
}

#[async_trait]
impl PaymentAdapter for HttpPaymentAdapter {
    async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentReceipt, DownstreamError> {
        let url = endpoint(SERVICE, &self.base_url, &["payments"])?;
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|source| DownstreamError::Transport {
                service: SERVICE,
                source,
            })?;

        Self::read_receipt(response, None).await
    }

    async fn payment_status(&self, reference: &str) -> Result<PaymentReceipt, DownstreamError> {
        let url = endpoint(SERVICE, &self.base_url, &["payments", reference])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| DownstreamError::Transport {
                service: SERVICE,
                source,
            })?;

        Self::read_receipt(response, Some(reference)).await
    }

    async fn refund_payment(&self, _reference: &str) -> Result<PaymentReceipt, DownstreamError> {
        Err(DownstreamError::Unimplemented {
            service: SERVICE,
            operation: "refund",
        })
    }
}

/// In-memory double. Payments start `Pending`; refunds are honoured.
#[derive(Debug, Default)]
pub struct InMemoryPaymentAdapter {
    ledger: Mutex<Ledger>,
}

#[derive(Debug, Default)]
struct Ledger {
    payments: HashMap<String, PaymentReceipt>,
    last_sequence: u64,
}

impl Ledger {
    /// Next `pay_NNNNNN` reference not already taken by a seeded payment.
    fn next_reference(&mut self) -> String {
        loop {
            self.last_sequence += 1;
            let reference = format!("pay_{:06}", self.last_sequence);
            if !self.payments.contains_key(&reference) {
                return reference;
            }
        }
    }
}

impl InMemoryPaymentAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a payment, e.g. one owned by another payer.
    pub async fn insert(&self, receipt: PaymentReceipt) {
        self.ledger
            .lock()
            .await
            .payments
            .insert(receipt.reference.clone(), receipt);
    }

    fn not_found(reference: &str) -> DownstreamError {
        DownstreamError::NotFound {
            service: SERVICE,
            what: format!("payment {reference}"),
        }
    }
}

#[async_trait]
impl PaymentAdapter for InMemoryPaymentAdapter {
    async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentReceipt, DownstreamError> {
        let mut ledger = self.ledger.lock().await;
        let receipt = PaymentReceipt {
            reference: ledger.next_reference(),
            status: PaymentStatus::Pending,
            payer: request.payer.clone(),
            amount_minor: request.amount_minor,
            currency: request.currency.clone(),
        };
        ledger
            .payments
            .insert(receipt.reference.clone(), receipt.clone());
        Ok(receipt)
    }

    async fn payment_status(&self, reference: &str) -> Result<PaymentReceipt, DownstreamError> {
        self.ledger
            .lock()
            .await
            .payments
            .get(reference)
            .cloned()
            .ok_or_else(|| Self::not_found(reference))
    }

    async fn refund_payment(&self, reference: &str) -> Result<PaymentReceipt, DownstreamError> {
        let mut ledger = self.ledger.lock().await;
        let receipt = ledger
            .payments
            .get_mut(reference)
            .ok_or_else(|| Self::not_found(reference))?;
        receipt.status = PaymentStatus::Refunded;
        Ok(receipt.clone())
    }
}
