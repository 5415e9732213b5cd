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

//! Crypto suite capability surface.
//!
//! [`CryptoSuite`] maps the provider primitives (key generation, import and
//! lookup, hashing, sign and verify) onto [`KeyStore`] and the shared
//! [`SigningManager`].

use crate::keys::{certificate_public_key, EcdsaKey, Key, KeyStore};
use crate::signing::{SigningError, SigningManager};
use p256::PublicKey;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;
use x509_cert::Certificate;

/// Errors returned by the crypto suite.
#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("No key found for SKI {0}")]
    KeyNotFound(String),

    #[error("Invalid key type: {0}")]
    InvalidKeyType(String),

    #[error("Unsupported key type, expected an ECDSA key from this suite")]
    UnsupportedKeyType,

    #[error(transparent)]
    Signing(#[from] SigningError),
}

/// Material accepted by [`CryptoSuite::key_import`].
#[derive(Debug, Clone)]
pub enum KeyMaterial {
    /// A parsed X.509 certificate; only its public key is imported.
    Certificate(Box<Certificate>),
    /// A raw P-256 public key.
    PublicKey(PublicKey),
    /// A key that is already in the suite's own representation.
    Key(EcdsaKey),
}

impl From<Certificate> for KeyMaterial {
    fn from(cert: Certificate) -> Self {
        KeyMaterial::Certificate(Box::new(cert))
    }
}

impl From<PublicKey> for KeyMaterial {
    fn from(public: PublicKey) -> Self {
        KeyMaterial::PublicKey(public)
    }
}

pub struct CryptoSuite {
    keystore: KeyStore,
    manager: Arc<dyn SigningManager>,
}

impl CryptoSuite {
    pub fn new(manager: Arc<dyn SigningManager>) -> Self {
        Self {
            keystore: KeyStore::new(),
            manager,
        }
    }

    /// Generates a P-256 key pair and registers it under its SKI.
    pub fn key_gen(&self) -> Result<EcdsaKey, SuiteError> {
        let key = EcdsaKey::generate();
        self.keystore.store(key.clone());
        tracing::debug!(ski = %key.ski_hex(), "Generated key");
        Ok(key)
    }

    /// Imports the public key carried by `material` and registers it.
    pub fn key_import(&self, material: impl Into<KeyMaterial>) -> Result<EcdsaKey, SuiteError> {
        let public = match material.into() {
            KeyMaterial::Certificate(cert) => certificate_public_key(&cert).map_err(|_| {
                SuiteError::InvalidKeyType("it must be an ECDSA public key".to_string())
            })?,
            KeyMaterial::PublicKey(public) => public,
            KeyMaterial::Key(_) => {
                return Err(SuiteError::InvalidKeyType("unknown key type".to_string()))
            }
        };

        let key = EcdsaKey::from_public(public);
        self.keystore.store(key.clone());
        Ok(key)
    }

    pub fn get_key(&self, ski: &[u8]) -> Result<EcdsaKey, SuiteError> {
        self.keystore
            .get(ski)
            .ok_or_else(|| SuiteError::KeyNotFound(hex::encode(ski)))
    }

    pub fn hash(&self, msg: &[u8]) -> Vec<u8> {
        self.manager.hash(msg)
    }

    /// A fresh instance of the suite's hash function.
    pub fn get_hash(&self) -> Sha256 {
        Sha256::new()
    }

    pub fn sign(&self, key: &dyn Key, digest: &[u8]) -> Result<Vec<u8>, SuiteError> {
        let key = key.as_ecdsa().ok_or(SuiteError::UnsupportedKeyType)?;
        Ok(self.manager.sign(digest, key)?)
    }

    pub fn verify(&self, key: &dyn Key, signature: &[u8], digest: &[u8]) -> Result<bool, SuiteError> {
        let key = key.as_ecdsa().ok_or(SuiteError::UnsupportedKeyType)?;
        Ok(self.manager.verify(digest, signature, key.public())?)
    }

    pub fn keystore(&self) -> &KeyStore {
        &self.keystore
    }
}
