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

//! Signing identities.
//!
//! A [`SigningIdentity`] binds an MSP id, an enrollment certificate and the
//! matching P-256 key pair to a shared [`SigningManager`]. It is resolved
//! once from the [`CryptoCache`]:
//!
//! 1. the certificate is read under its configured name
//! 2. the SKI of its public key names the private key, `"<ski-hex>_sk"`
//! 3. the private key PEM is decoded, decrypting it when a password is set
//!
//! Construction either yields a ready identity or an error; there is no
//! partially initialized state.

use crate::audit;
use crate::cache::CryptoCache;
use crate::keys::{
    certificate_public_key, compute_ski, parse_certificate, parse_private_key_pem,
    private_key_name, EcdsaKey, Key, KeyError,
};
use crate::signing::{SigningError, SigningManager};
use prost::Message;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while building or using an identity.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Failed to find certificate in cache: {0}")]
    CertificateNotFound(String),

    #[error("Malformed certificate: {0}")]
    MalformedCertificate(String),

    #[error("Failed to find private key in cache: {0}")]
    PrivateKeyNotFound(String),

    #[error("Private key does not match the certificate public key")]
    KeyMismatch,

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error("Signature verification failed")]
    InvalidSignature,

    #[error("Failed to decode serialized identity: {0}")]
    Deserialization(String),
}

/// Identity identifier exposed to the protocol layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityIdentifier {
    pub id: String,
    pub msp_id: String,
}

/// Wire form of an identity: `{ string mspid = 1; bytes id_bytes = 2; }`.
#[derive(Clone, PartialEq, Message)]
pub struct SerializedIdentity {
    #[prost(string, tag = "1")]
    pub mspid: String,
    #[prost(bytes = "vec", tag = "2")]
    pub id_bytes: Vec<u8>,
}

impl SerializedIdentity {
    /// Decodes the output of [`Identity::serialize`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IdentityError> {
        Self::decode(bytes).map_err(|e| IdentityError::Deserialization(e.to_string()))
    }
}

/// Verification-only identity.
pub trait Identity: Send + Sync {
    fn identifier(&self) -> IdentityIdentifier;

    /// Verifies `sig` over the SHA-256 of `msg` against this identity.
    fn verify(&self, msg: &[u8], sig: &[u8]) -> Result<(), IdentityError>;

    fn serialize(&self) -> Result<Vec<u8>, IdentityError>;

    /// The enrollment certificate exactly as it was read from the cache.
    fn enrollment_certificate(&self) -> &[u8];
}

/// Identity that can also sign.
pub trait SignerIdentity: Identity {
    /// Signs the SHA-256 of `msg`, returning a DER low-S signature.
    fn sign(&self, msg: &[u8]) -> Result<Vec<u8>, IdentityError>;

    fn public_version(&self) -> Box<dyn Identity>;

    fn private_key(&self) -> &dyn Key;
}

/// Public half of an identity, shared by [`SigningIdentity`] and
/// [`PublicIdentity`].
#[derive(Clone)]
struct IdentityCore {
    msp_id: String,
    certificate: Vec<u8>,
    key: EcdsaKey,
    manager: Arc<dyn SigningManager>,
}

impl IdentityCore {
    fn identifier(&self) -> IdentityIdentifier {
        IdentityIdentifier {
            id: self.msp_id.clone(),
            msp_id: self.msp_id.clone(),
        }
    }

    fn verify(&self, msg: &[u8], sig: &[u8]) -> Result<(), IdentityError> {
        let digest = self.manager.hash(msg);
        match self.manager.verify(&digest, sig, self.key.public()) {
            Ok(true) => Ok(()),
            Ok(false) => Err(IdentityError::InvalidSignature),
            Err(e) => {
                audit::log_signature_rejected(&self.msp_id, &e.to_string());
                Err(e.into())
            }
        }
    }

    fn serialize(&self) -> Vec<u8> {
        SerializedIdentity {
            mspid: self.msp_id.clone(),
            id_bytes: self.certificate.clone(),
        }
        .encode_to_vec()
    }
}

/// A ready signing identity.
#[derive(Clone)]
pub struct SigningIdentity {
    core: IdentityCore,
}

impl SigningIdentity {
    /// Resolves an identity whose private key is stored unencrypted.
    pub fn new(
        msp_id: &str,
        cert_name: &str,
        cache: &dyn CryptoCache,
        manager: Arc<dyn SigningManager>,
    ) -> Result<Self, IdentityError> {
        Self::with_password(msp_id, cert_name, cache, manager, None)
    }

    /// Resolves an identity, decrypting the private key with `password`
    /// when its PEM block is encrypted.
    pub fn with_password(
        msp_id: &str,
        cert_name: &str,
        cache: &dyn CryptoCache,
        manager: Arc<dyn SigningManager>,
        password: Option<&[u8]>,
    ) -> Result<Self, IdentityError> {
        match resolve(cert_name, cache, password) {
            Ok((certificate, key)) => {
                audit::log_identity_created(msp_id, cert_name, &key.ski_hex());
                Ok(Self {
                    core: IdentityCore {
                        msp_id: msp_id.to_string(),
                        certificate,
                        key,
                        manager,
                    },
                })
            }
            Err(e) => {
                audit::log_identity_failed(msp_id, cert_name, &e.to_string());
                Err(e)
            }
        }
    }

    pub fn msp_id(&self) -> &str {
        &self.core.msp_id
    }

    /// The identity's key pair, owned by value.
    pub fn key(&self) -> &EcdsaKey {
        &self.core.key
    }
}

fn resolve(
    cert_name: &str,
    cache: &dyn CryptoCache,
    password: Option<&[u8]>,
) -> Result<(Vec<u8>, EcdsaKey), IdentityError> {
    let certificate = cache
        .get_crypto(cert_name)
        .map_err(|_| IdentityError::CertificateNotFound(cert_name.to_string()))?;

    let public = parse_certificate(&certificate)
        .and_then(|cert| certificate_public_key(&cert))
        .map_err(|e| match e {
            KeyError::MalformedCertificate(msg) => IdentityError::MalformedCertificate(msg),
            other => IdentityError::MalformedCertificate(other.to_string()),
        })?;

    let sk_name = private_key_name(&compute_ski(Some(&public)));
    let private_pem = zeroize::Zeroizing::new(
        cache
            .get_crypto(&sk_name)
            .map_err(|_| IdentityError::PrivateKeyNotFound(sk_name.clone()))?,
    );

    let secret = parse_private_key_pem(&private_pem, password)?;
    if secret.public_key() != public {
        return Err(IdentityError::KeyMismatch);
    }

    Ok((certificate, EcdsaKey::from_secret(secret)))
}

impl Identity for SigningIdentity {
    fn identifier(&self) -> IdentityIdentifier {
        self.core.identifier()
    }

    fn verify(&self, msg: &[u8], sig: &[u8]) -> Result<(), IdentityError> {
        self.core.verify(msg, sig)
    }

    fn serialize(&self) -> Result<Vec<u8>, IdentityError> {
        Ok(self.core.serialize())
    }

    fn enrollment_certificate(&self) -> &[u8] {
        &self.core.certificate
    }
}

impl SignerIdentity for SigningIdentity {
    fn sign(&self, msg: &[u8]) -> Result<Vec<u8>, IdentityError> {
        let digest = self.core.manager.hash(msg);
        Ok(self.core.manager.sign(&digest, &self.core.key)?)
    }

    fn public_version(&self) -> Box<dyn Identity> {
        Box::new(PublicIdentity {
            core: IdentityCore {
                key: EcdsaKey::from_public(*self.core.key.public()),
                ..self.core.clone()
            },
        })
    }

    fn private_key(&self) -> &dyn Key {
        &self.core.key
    }
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("msp_id", &self.core.msp_id)
            .field("key", &self.core.key)
            .finish()
    }
}

/// Verification-only view of a [`SigningIdentity`].
#[derive(Clone)]
pub struct PublicIdentity {
    core: IdentityCore,
}

impl Identity for PublicIdentity {
    fn identifier(&self) -> IdentityIdentifier {
        self.core.identifier()
    }

    fn verify(&self, msg: &[u8], sig: &[u8]) -> Result<(), IdentityError> {
        self.core.verify(msg, sig)
    }

    fn serialize(&self) -> Result<Vec<u8>, IdentityError> {
        Ok(self.core.serialize())
    }

    fn enrollment_certificate(&self) -> &[u8] {
        &self.core.certificate
    }
}
