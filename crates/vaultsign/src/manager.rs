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

//! Composition root.
//!
//! A [`Manager`] owns the cache, the crypto suite and the process signing
//! identity. Building one runs the whole startup sequence: ingest the
//! secret store, resolve the identity from the cache, then register the
//! identity's public key with the suite.

use crate::cache::{CryptoCache, MemCache};
use crate::config::IdentityConfig;
use crate::error::Result;
use crate::identity::SigningIdentity;
use crate::ingest::{ingest, IngestReport};
use crate::keys::EcdsaKey;
use crate::signing::{EcdsaSigningManager, SigningError, SigningManager};
use crate::store::SecretStore;
use crate::suite::CryptoSuite;
use p256::PublicKey;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "secret-manager")]
use crate::config::SecretManagerConfig;
#[cfg(feature = "vault")]
use crate::config::VaultConfig;

pub struct Manager {
    cache: Arc<MemCache>,
    signing_manager: Arc<EcdsaSigningManager>,
    suite: CryptoSuite,
    identity: SigningIdentity,
    report: IngestReport,
}

impl Manager {
    /// Ingests `store` below `root` and resolves the configured identity.
    pub fn bootstrap<S: SecretStore + ?Sized>(
        store: &S,
        root: &str,
        identity: &IdentityConfig,
    ) -> Result<Self> {
        let cache = Arc::new(MemCache::new());
        let report = ingest(store, cache.as_ref(), root)?;

        let signing_manager = Arc::new(EcdsaSigningManager::new());
        let shared: Arc<dyn SigningManager> = signing_manager.clone();

        let signing_identity = SigningIdentity::with_password(
            identity.msp_id(),
            identity.cert_name(),
            cache.as_ref(),
            Arc::clone(&shared),
            identity.key_password(),
        )?;

        let suite = CryptoSuite::new(shared);
        suite.key_import(*signing_identity.key().public())?;

        Ok(Self {
            cache,
            signing_manager,
            suite,
            identity: signing_identity,
            report,
        })
    }

    /// Bootstraps from a Vault KV tree rooted at [`VaultConfig::root`].
    #[cfg(feature = "vault")]
    pub fn from_vault(vault: &VaultConfig, identity: &IdentityConfig) -> Result<Self> {
        let store = crate::store::VaultStore::new(vault)?;
        Self::bootstrap(&store, vault.root(), identity)
    }

    /// Bootstraps from every secret of a secret-manager project.
    #[cfg(feature = "secret-manager")]
    pub fn from_secret_manager(
        config: &SecretManagerConfig,
        identity: &IdentityConfig,
    ) -> Result<Self> {
        let api = crate::store::RestSecretManagerApi::new(config)?;
        let store = crate::store::FlatSecretStore::new(api, config.project());
        Self::bootstrap(&store, config.project(), identity)
    }

    /// Signs a precomputed digest with `key`, returning a DER low-S
    /// signature.
    ///
    /// This is the manager's own sign surface for callers that hold a key
    /// other than the process identity, such as one from
    /// [`CryptoSuite::key_gen`]. Message signing for the identity goes
    /// through [`SigningIdentity`].
    pub fn sign(&self, digest: &[u8], key: &EcdsaKey) -> std::result::Result<Vec<u8>, SigningError> {
        self.signing_manager.sign(digest, key)
    }

    /// Verifies a DER signature over a precomputed digest.
    ///
    /// High-S signatures fail with [`SigningError::NonCanonicalSignature`];
    /// `Ok(false)` means a well formed signature that does not verify.
    pub fn verify(
        &self,
        digest: &[u8],
        signature: &[u8],
        public: &PublicKey,
    ) -> std::result::Result<bool, SigningError> {
        self.signing_manager.verify(digest, signature, public)
    }

    pub fn signing_identity(&self) -> &SigningIdentity {
        &self.identity
    }

    pub fn signing_manager(&self) -> Arc<dyn SigningManager> {
        self.signing_manager.clone()
    }

    pub fn cache(&self) -> Arc<dyn CryptoCache> {
        self.cache.clone()
    }

    pub fn crypto_suite(&self) -> &CryptoSuite {
        &self.suite
    }

    pub fn ingest_report(&self) -> &IngestReport {
        &self.report
    }
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("identity", &self.identity)
            .field("cached", &self.cache.len())
            .field("keys", &self.suite.keystore().len())
            .finish()
    }
}
