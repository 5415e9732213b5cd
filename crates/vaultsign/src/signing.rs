/*
 *  Copyright 2025-2026 Colliery Software
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

//! Canonical ECDSA signing and verification.
//!
//! Every signature produced here is low-S: when `s > n/2` it is replaced by
//! `n - s` before DER encoding. Verification enforces the same rule and
//! rejects high-S signatures even when they are mathematically valid.

use crate::keys::EcdsaKey;
use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::elliptic_curve::scalar::IsHigh;
use p256::PublicKey;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors that can occur during signing operations.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("Failed unmarshalling signature: {0}")]
    MalformedSignature(String),

    #[error("Invalid S. Must be smaller than half the order")]
    NonCanonicalSignature,

    #[error("Key has no private component, cannot sign")]
    MissingPrivateKey,

    #[error("Failed to create signature: {0}")]
    SignatureFailed(String),
}

/// Sign and verify primitives shared by every identity in the process.
pub trait SigningManager: Send + Sync {
    /// Signs `digest` with the private half of `key`, returning a DER
    /// encoded low-S signature.
    fn sign(&self, digest: &[u8], key: &EcdsaKey) -> Result<Vec<u8>, SigningError>;

    /// Checks a DER signature over `digest`.
    ///
    /// `Ok(false)` means the signature is well formed and canonical but does
    /// not verify under `public`.
    fn verify(
        &self,
        digest: &[u8],
        signature: &[u8],
        public: &PublicKey,
    ) -> Result<bool, SigningError>;

    /// SHA-256 of `msg`.
    fn hash(&self, msg: &[u8]) -> Vec<u8> {
        hash(msg)
    }
}

/// SHA-256, the only digest used for signing.
pub fn hash(msg: &[u8]) -> Vec<u8> {
    Sha256::digest(msg).to_vec()
}

/// Rewrites `signature` to its low-S form.
pub fn normalize_low_s(signature: Signature) -> Signature {
    signature.normalize_s().unwrap_or(signature)
}

/// True when `s` lies in the lower half of the curve order.
pub fn is_low_s(signature: &Signature) -> bool {
    !bool::from(signature.s().is_high())
}

/// P-256 implementation of [`SigningManager`].
#[derive(Debug, Default, Clone, Copy)]
pub struct EcdsaSigningManager;

impl EcdsaSigningManager {
    pub fn new() -> Self {
        Self
    }
}

impl SigningManager for EcdsaSigningManager {
    fn sign(&self, digest: &[u8], key: &EcdsaKey) -> Result<Vec<u8>, SigningError> {
        let secret = key.secret().ok_or(SigningError::MissingPrivateKey)?;
        let signing_key = SigningKey::from(secret);

        let signature: Signature = signing_key
            .sign_prehash(digest)
            .map_err(|e| SigningError::SignatureFailed(e.to_string()))?;

        Ok(normalize_low_s(signature).to_der().as_bytes().to_vec())
    }

    fn verify(
        &self,
        digest: &[u8],
        signature: &[u8],
        public: &PublicKey,
    ) -> Result<bool, SigningError> {
        let signature = Signature::from_der(signature)
            .map_err(|e| SigningError::MalformedSignature(e.to_string()))?;

        if !is_low_s(&signature) {
            return Err(SigningError::NonCanonicalSignature);
        }

        let verifying_key = VerifyingKey::from(public);
        Ok(verifying_key.verify_prehash(digest, &signature).is_ok())
    }
}
