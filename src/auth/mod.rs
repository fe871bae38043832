// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Request authentication and role resolution for the payment gateway.
//!
//! ## Auth Flow
//!
//! 1. Assign a request correlation id (`X-Request-Id` or generated)
//! 2. Extract one credential: `X-Api-Key`, then `Authorization: Bearer`,
//!    then the configured cookie
//! 3. Resolve the caller:
//!    - API key → compared to the fixed secret, nothing else is consulted
//!    - Bearer → verified against the configured RSA keys in order
//!      (RS256/RS512), then classified by `groups` and the legacy
//!      elevation header
//!    - Nothing → anonymous; routes decide whether that is acceptable
//! 4. Attach a [`RequestContext`] for handlers, or reject with 401
//!
//! ## Security
//!
//! - Keys are loaded once at startup; a bad key prevents startup
//! - API key always dominates a bearer token sent alongside it
//! - Admin elevation requires both the admin group and the elevation header
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod correlation;
pub mod credential;
pub mod error;
pub mod extractor;
pub mod identity;
pub mod keyring;
pub mod middleware;

pub use claims::Claims;
pub use correlation::RequestId;
pub use credential::{extract_credential, Credential, CredentialSources};
pub use error::AuthError;
pub use extractor::{AdminOnly, Authenticated, RequestContext};
pub use identity::{AuthPolicy, Identity, IdentityResolver};
pub use keyring::{KeyRing, KeyRingError};
pub use middleware::auth_gate;
