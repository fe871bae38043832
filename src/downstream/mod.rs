// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Downstream collaborators.
//!
//! Each external service is reached through a capability trait with a live
//! HTTP adapter and an in-memory double. Implementations are injected into
//! [`AppState`](crate::state::AppState) by the composition root.
//!
//! - `attendee` - registration service (who is paying)
//! - `payment` - payment provider (moving the money)

use std::time::Duration;

use url::Url;

pub mod attendee;
pub mod payment;

pub use attendee::{Attendee, AttendeeService, HttpAttendeeService, InMemoryAttendeeService};
pub use payment::{
    HttpPaymentAdapter, InMemoryPaymentAdapter, PaymentAdapter, PaymentReceipt, PaymentRequest,
    PaymentStatus,
};

/// Collaborator failure.
#[derive(Debug, thiserror::Error)]
pub enum DownstreamError {
    #[error("{service} does not implement {operation}")]
    Unimplemented {
        service: &'static str,
        operation: &'static str,
    },

    #[error("{service} has no record of {what}")]
    NotFound { service: &'static str, what: String },

    #[error("request to {service} failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} responded with HTTP {status}")]
    UnexpectedStatus { service: &'static str, status: u16 },

    #[error("invalid configuration for {service}: {reason}")]
    Configuration { service: &'static str, reason: String },
}

/// Shared HTTP client for collaborator adapters.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, DownstreamError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| DownstreamError::Configuration {
            service: "http client",
            reason: e.to_string(),
        })
}

/// Append percent-encoded path segments to a base URL.
pub(crate) fn endpoint(
    service: &'static str,
    base: &Url,
    segments: &[&str],
) -> Result<Url, DownstreamError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| DownstreamError::Configuration {
            service,
            reason: format!("{base} cannot be used as a base URL"),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
