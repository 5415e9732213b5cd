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

//! ECDSA P-256 keys, their identifiers and their encodings.
//!
//! This module provides:
//! - [`Key`] capability trait consumed by the crypto suite
//! - [`EcdsaKey`] the only concrete key type (public point, optional scalar)
//! - [`compute_ski`] the SHA-256 subject key identifier
//! - Certificate and private-key PEM decoding
//! - [`KeyStore`] the SKI-indexed registry of imported keys

mod certificate;
mod legacy;
mod private;
mod store;

pub use certificate::{certificate_public_key, parse_certificate};
pub use private::parse_private_key_pem;
pub use store::KeyStore;

use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::EncodePublicKey;
use p256::{PublicKey, SecretKey};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

/// Suffix appended to the hex SKI to name a private key in the cache.
pub const PRIVATE_KEY_SUFFIX: &str = "_sk";

/// Errors that can occur while decoding or handling keys.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Invalid key type: {0}")]
    InvalidKeyType(String),

    #[error("Found unknown private key type in PKCS#8 wrapping")]
    UnsupportedKeyWrapping,

    #[error("Invalid private key encoding: the DER must contain an ECDSA private key")]
    InvalidPrivateKeyEncoding,

    #[error("Encrypted key, a password is required")]
    PasswordRequired,

    #[error("Failed PEM decryption: {0}")]
    DecryptionFailed(String),

    #[error("Malformed PEM: {0}")]
    MalformedPem(String),

    #[error("Malformed certificate: {0}")]
    MalformedCertificate(String),

    #[error("Failed to encode key: {0}")]
    Encoding(String),

    #[error("Key has no private component")]
    MissingPrivateKey,
}

/// Capability surface of a key as seen by the crypto suite.
///
/// Keys are always asymmetric and report `private() == false`: the private
/// scalar is only ever touched by the signing path.
pub trait Key: fmt::Debug + Send + Sync {
    /// PKIX (SubjectPublicKeyInfo) DER encoding of the public key.
    fn bytes(&self) -> Result<Vec<u8>, KeyError>;

    /// Subject key identifier, see [`compute_ski`].
    fn ski(&self) -> Vec<u8>;

    fn symmetric(&self) -> bool {
        false
    }

    fn private(&self) -> bool {
        false
    }

    /// Verification-only view of this key.
    fn public_key(&self) -> Box<dyn Key>;

    /// Downcast hook used by sign and verify dispatch.
    fn as_ecdsa(&self) -> Option<&EcdsaKey> {
        None
    }
}

/// SHA-256 over the uncompressed SEC1 point encoding of `public`.
///
/// Returns an empty identifier when no public key is available.
pub fn compute_ski(public: Option<&PublicKey>) -> Vec<u8> {
    match public {
        Some(public) => {
            let point = public.to_encoded_point(false);
            Sha256::digest(point.as_bytes()).to_vec()
        }
        None => Vec::new(),
    }
}

/// Cache name under which the private key paired with `ski` is stored.
pub fn private_key_name(ski: &[u8]) -> String {
    format!("{}{}", hex::encode(ski), PRIVATE_KEY_SUFFIX)
}

/// A P-256 ECDSA key pair, or a public key on its own.
#[derive(Clone)]
pub struct EcdsaKey {
    public: PublicKey,
    private: Option<SecretKey>,
}

impl EcdsaKey {
    /// Generates a fresh key pair from the OS random source.
    pub fn generate() -> Self {
        let secret = SecretKey::random(&mut rand::rngs::OsRng);
        Self::from_secret(secret)
    }

    /// Verification-only key.
    pub fn from_public(public: PublicKey) -> Self {
        Self {
            public,
            private: None,
        }
    }

    /// Key pair derived from a private scalar.
    pub fn from_secret(secret: SecretKey) -> Self {
        Self {
            public: secret.public_key(),
            private: Some(secret),
        }
    }

    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    pub fn has_private(&self) -> bool {
        self.private.is_some()
    }

    pub(crate) fn secret(&self) -> Option<&SecretKey> {
        self.private.as_ref()
    }

    /// Hex form of [`Key::ski`], the KeyStore index.
    pub fn ski_hex(&self) -> String {
        hex::encode(self.ski())
    }

    /// Cache name of this key's private half, `"<ski-hex>_sk"`.
    pub fn private_key_name(&self) -> String {
        private_key_name(&self.ski())
    }
}

impl Key for EcdsaKey {
    fn bytes(&self) -> Result<Vec<u8>, KeyError> {
        self.public
            .to_public_key_der()
            .map(|doc| doc.as_bytes().to_vec())
            .map_err(|e| KeyError::Encoding(e.to_string()))
    }

    fn ski(&self) -> Vec<u8> {
        compute_ski(Some(&self.public))
    }

    fn public_key(&self) -> Box<dyn Key> {
        Box::new(Self::from_public(self.public))
    }

    fn as_ecdsa(&self) -> Option<&EcdsaKey> {
        Some(self)
    }
}

impl PartialEq for EcdsaKey {
    fn eq(&self, other: &Self) -> bool {
        self.public == other.public && self.has_private() == other.has_private()
    }
}

impl fmt::Debug for EcdsaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcdsaKey")
            .field("ski", &self.ski_hex())
            .field("private", &self.has_private())
            .finish()
    }
}
