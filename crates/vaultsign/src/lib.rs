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

//! # vaultsign
//!
//! ECDSA signing identities for permissioned-ledger clients whose keys and
//! certificates live in a remote secret store rather than on disk.
//!
//! At startup a [`Manager`] walks the secret store (HashiCorp Vault or a
//! flat secret-manager project), copies every secret into a volatile
//! [`MemCache`], and resolves the process [`SigningIdentity`]: the
//! enrollment certificate named in [`IdentityConfig`] plus the private key
//! stored under `"<ski-hex>_sk"`. All signatures are canonical low-S P-256
//! ECDSA, and verification rejects high-S signatures.
//!
//! ```rust,ignore
//! use vaultsign::{IdentityConfig, Manager, SignerIdentity, VaultConfig};
//!
//! let vault = VaultConfig::builder()
//!     .address("https://vault.example.com:8200")
//!     .token(std::env::var("VAULT_TOKEN")?)
//!     .root("kv/atomyze")
//!     .build()?;
//! let identity = IdentityConfig::builder()
//!     .msp_id("Org1MSP")
//!     .cert_name("User1@org1.example.com-cert.pem")
//!     .build()?;
//!
//! let manager = Manager::from_vault(&vault, &identity)?;
//! let signature = manager.signing_identity().sign(b"proposal bytes")?;
//! ```

pub mod audit;
pub mod cache;
pub mod config;
pub mod error;
pub mod identity;
pub mod ingest;
pub mod keys;
pub mod manager;
pub mod signing;
pub mod store;
pub mod suite;

pub use cache::{CacheError, CryptoCache, MemCache};
pub use config::{ConfigError, IdentityConfig, SecretManagerConfig, VaultConfig};
pub use error::{Error, Result};
pub use identity::{
    Identity, IdentityError, IdentityIdentifier, PublicIdentity, SerializedIdentity,
    SignerIdentity, SigningIdentity,
};
pub use ingest::{ingest, IngestError, IngestReport, SecretIngester, SkippedSecret};
pub use keys::{EcdsaKey, Key, KeyError, KeyStore};
pub use manager::Manager;
pub use signing::{EcdsaSigningManager, SigningError, SigningManager};
pub use store::{MemoryStore, SecretStore, StoreError};
pub use suite::{CryptoSuite, KeyMaterial, SuiteError};
