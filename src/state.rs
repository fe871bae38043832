// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{CredentialSources, IdentityResolver};
use crate::downstream::{AttendeeService, PaymentAdapter};

/// Shared, read-only application state.
///
/// Everything here is built once by the composition root and never mutated
/// afterwards, so requests share it without locking.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<IdentityResolver>,
    pub credential_sources: Arc<CredentialSources>,
    pub payments: Arc<dyn PaymentAdapter>,
    pub attendees: Arc<dyn AttendeeService>,
}

impl AppState {
    pub fn new(
        resolver: IdentityResolver,
        credential_sources: CredentialSources,
        payments: Arc<dyn PaymentAdapter>,
        attendees: Arc<dyn AttendeeService>,
    ) -> Self {
        Self {
            resolver: Arc::new(resolver),
            credential_sources: Arc::new(credential_sources),
            payments,
            attendees,
        }
    }
}
