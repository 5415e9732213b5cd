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

//! Secret-store backends.
//!
//! Every backend is reduced to two primitives, [`SecretStore::list`] and
//! [`SecretStore::read`], so the ingestion walk in [`crate::ingest`] does
//! not care whether the store is a tree or a flat list of secrets.

mod memory;
#[cfg(feature = "secret-manager")]
mod secret_manager;
#[cfg(feature = "vault")]
mod vault;

pub use memory::MemoryStore;
#[cfg(feature = "secret-manager")]
pub use secret_manager::{
    decode_secret_name, encode_secret_name, FlatSecretStore, RestSecretManagerApi,
    SecretManagerApi,
};
#[cfg(feature = "vault")]
pub use vault::VaultStore;

use thiserror::Error;

/// Errors reported by a secret store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Secret not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unexpected status {status} for {path}")]
    Status { status: u16, path: String },
}

impl StoreError {
    /// Missing secrets and denied reads are skipped during ingestion;
    /// everything else aborts it.
    pub fn is_skippable(&self) -> bool {
        matches!(self, StoreError::NotFound(_) | StoreError::PermissionDenied(_))
    }
}

/// Minimal read access to a hierarchical secret namespace.
pub trait SecretStore: Send + Sync {
    /// Children of `path`, or `None` when `path` is a leaf.
    ///
    /// Directory children may carry a trailing `/`.
    fn list(&self, path: &str) -> Result<Option<Vec<String>>, StoreError>;

    /// Payload of the leaf secret at `path`.
    fn read(&self, path: &str) -> Result<Vec<u8>, StoreError>;

    /// Short backend name used in logs.
    fn backend(&self) -> &'static str;
}

impl<S: SecretStore + ?Sized> SecretStore for &S {
    fn list(&self, path: &str) -> Result<Option<Vec<String>>, StoreError> {
        (**self).list(path)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        (**self).read(path)
    }

    fn backend(&self) -> &'static str {
        (**self).backend()
    }
}

impl<S: SecretStore + ?Sized> SecretStore for Box<S> {
    fn list(&self, path: &str) -> Result<Option<Vec<String>>, StoreError> {
        (**self).list(path)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        (**self).read(path)
    }

    fn backend(&self) -> &'static str {
        (**self).backend()
    }
}

/// Maps an HTTP status onto a [`StoreError`] for `path`.
#[cfg(any(feature = "vault", feature = "secret-manager"))]
pub(crate) fn status_error(status: reqwest::StatusCode, path: &str) -> StoreError {
    match status {
        reqwest::StatusCode::NOT_FOUND => StoreError::NotFound(path.to_string()),
        reqwest::StatusCode::FORBIDDEN => StoreError::PermissionDenied(path.to_string()),
        other => StoreError::Status {
            status: other.as_u16(),
            path: path.to_string(),
        },
    }
}
