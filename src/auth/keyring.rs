// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token verification against an ordered set of RSA public keys.
//!
//! ## Security
//!
//! - Keys are parsed once at startup; a malformed key aborts startup
//! - Only RS256 and RS512 signatures are accepted
//! - Keys are tried in configured order and the first success wins
//! - Callers never learn which key (if any) came close
//!
//! The ring is immutable after construction and shared read-only across
//! requests behind an `Arc`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use super::claims::Claims;
use super::credential::BEARER_PREFIX;
use super::error::AuthError;

/// Signature algorithms a bearer token may use.
pub const ALLOWED_ALGORITHMS: [Algorithm; 2] = [Algorithm::RS256, Algorithm::RS512];

/// Clock skew tolerance for `exp` / `nbf` (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Startup-time key loading failure. Always fatal.
#[derive(Debug, thiserror::Error)]
pub enum KeyRingError {
    #[error("failed to read key file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid PEM in {origin}: {reason}")]
    InvalidPem { origin: String, reason: String },

    #[error("PEM block #{index} in {origin} is not an RSA public key: {reason}")]
    InvalidKey {
        origin: String,
        index: usize,
        reason: String,
    },

    #[error("no public keys configured")]
    Empty,
}

/// Ordered, immutable set of verification keys.
pub struct KeyRing {
    keys: Vec<DecodingKey>,
    validation: Validation,
}

impl std::fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRing").field("keys", &self.keys.len()).finish()
    }
}

impl KeyRing {
    /// Build a ring from already-parsed keys. Order is preserved.
    pub fn new(keys: Vec<DecodingKey>) -> Result<Self, KeyRingError> {
        if keys.is_empty() {
            return Err(KeyRingError::Empty);
        }

        Ok(Self {
            keys,
            validation: bearer_validation(),
        })
    }

    /// Load keys from PEM files, in path order then in-file order.
    pub fn from_pem_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self, KeyRingError> {
        let mut keys = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let contents = std::fs::read(path).map_err(|source| KeyRingError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            keys.extend(parse_pem_bundle(&contents, &path.display().to_string())?);
        }

        Self::new(keys)
    }

    /// Load keys from in-memory PEM bundles, in order.
    pub fn from_pems<S: AsRef<[u8]>>(bundles: &[S]) -> Result<Self, KeyRingError> {
        let mut keys = Vec::new();
        for (position, bundle) in bundles.iter().enumerate() {
            keys.extend(parse_pem_bundle(
                bundle.as_ref(),
                &format!("inline bundle #{position}"),
            )?);
        }

        Self::new(keys)
    }

    /// Number of keys in the ring.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Pairs with [`len`](Self::len). Always false: [`KeyRing::new`] rejects
    /// an empty ring.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Verify a raw `Bearer <token>` value and decode its claims.
    pub fn verify(&self, bearer: &str) -> Result<Claims, AuthError> {
        let token = split_bearer(bearer)?;

        let claims = self
            .keys
            .iter()
            .enumerate()
            .find_map(|(index, key)| match decode::<Claims>(token, key, &self.validation) {
                Ok(data) => {
                    tracing::debug!(key_index = index, "bearer token verified");
                    Some(data.claims)
                }
                Err(err) => {
                    tracing::trace!(key_index = index, error = %err, "key did not verify token");
                    None
                }
            })
            .ok_or(AuthError::InvalidToken)?;

        if claims.sub.is_empty() {
            return Err(AuthError::EmptySubject);
        }

        Ok(claims)
    }
}

/// Split `Bearer <token>` into its token; anything else is malformed.
fn split_bearer(raw: &str) -> Result<&str, AuthError> {
    if !raw.starts_with(BEARER_PREFIX) {
        return Err(AuthError::MalformedToken);
    }

    match raw.split(' ').collect::<Vec<_>>().as_slice() {
        [_, token] => Ok(*token),
        _ => Err(AuthError::MalformedToken),
    }
}

fn bearer_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.algorithms = ALLOWED_ALGORITHMS.to_vec();
    validation.leeway = CLOCK_SKEW_LEEWAY;
    // exp/nbf are checked when present but not required
    validation.required_spec_claims = HashSet::new();
    validation.validate_aud = false;
    validation
}

fn parse_pem_bundle(contents: &[u8], origin: &str) -> Result<Vec<DecodingKey>, KeyRingError> {
    let blocks = pem::parse_many(contents).map_err(|e| KeyRingError::InvalidPem {
        origin: origin.to_string(),
        reason: e.to_string(),
    })?;

    if blocks.is_empty() {
        return Err(KeyRingError::InvalidPem {
            origin: origin.to_string(),
            reason: "no PEM blocks found".to_string(),
        });
    }

    blocks
        .iter()
        .enumerate()
        .map(|(index, block)| {
            DecodingKey::from_rsa_pem(pem::encode(block).as_bytes()).map_err(|e| {
                KeyRingError::InvalidKey {
                    origin: origin.to_string(),
                    index,
                    reason: e.to_string(),
                }
            })
        })
        .collect()
}
