//! Argon2id credential verifier for production admin login.
//!
//! Credentials are provisioned as PHC-format Argon2 hashes keyed by the
//! bound identity (wallet address or account id).

use std::collections::HashMap;

use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use async_trait::async_trait;
use roleward_application::CredentialVerifier;
use roleward_core::{AppError, AppResult};
use tracing::debug;

/// Verifies admin secrets against provisioned Argon2id hashes.
#[derive(Clone)]
pub struct Argon2CredentialVerifier {
    argon2: Argon2<'static>,
    hashes: HashMap<String, String>,
}

impl Argon2CredentialVerifier {
    /// Creates a verifier over identity to PHC hash pairs.
    #[must_use]
    pub fn new(hashes: HashMap<String, String>) -> Self {
        // m=19456 KiB, t=2, p=1.
        let params = Params::new(19456, 2, 1, None).unwrap_or_else(|_| Params::default());
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        Self { argon2, hashes }
    }

    /// Parses a JSON object mapping identities to PHC hashes.
    pub fn from_json(document: &str) -> AppResult<Self> {
        let hashes: HashMap<String, String> = serde_json::from_str(document).map_err(|error| {
            AppError::Validation(format!("invalid admin credentials document: {error}"))
        })?;

        for (identity, hash) in &hashes {
            PasswordHash::new(hash).map_err(|error| {
                AppError::Validation(format!(
                    "invalid credential hash for identity '{identity}': {error}"
                ))
            })?;
        }

        Ok(Self::new(hashes))
    }

    /// Hashes a secret with the verifier's parameters.
    pub fn hash_secret(&self, secret: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);

        let hash = self
            .argon2
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|error| AppError::Internal(format!("failed to hash secret: {error}")))?;

        Ok(hash.to_string())
    }
}

#[async_trait]
impl CredentialVerifier for Argon2CredentialVerifier {
    async fn verify(&self, identity: &str, secret: &str) -> AppResult<bool> {
        let Some(hash) = self.hashes.get(identity) else {
            debug!(identity, "no credentials provisioned for identity");
            return Ok(false);
        };

        let parsed_hash = PasswordHash::new(hash).map_err(|error| {
            AppError::Internal(format!("failed to parse credential hash: {error}"))
        })?;

        match self.argon2.verify_password(secret.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(error) => Err(AppError::Internal(format!(
                "credential verification failed: {error}"
            ))),
        }
    }
}
