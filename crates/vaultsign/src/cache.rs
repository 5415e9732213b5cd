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

//! In-memory credential cache.
//!
//! [`CryptoCache`] is the capability handed to collaborators: a flat map from
//! logical names (`"org1/tls/ca.pem"`, `"<ski-hex>_sk"`) to opaque bytes.
//! [`MemCache`] is the volatile implementation populated at startup by
//! [`crate::ingest`].

use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

/// Errors returned by a [`CryptoCache`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Crypto material not found in cache: {0}")]
    NotFound(String),
}

/// Name-addressed store of certificates, keys and raw secret bytes.
pub trait CryptoCache: Send + Sync {
    /// Returns a copy of the bytes stored under `name`.
    fn get_crypto(&self, name: &str) -> Result<Vec<u8>, CacheError>;

    /// Stores `value` under `name`, replacing any previous value.
    fn set_crypto(&self, name: &str, value: Vec<u8>) -> Result<(), CacheError>;
}

/// Readers-writer locked map. Last write wins, entries never expire.
#[derive(Debug, Default)]
pub struct MemCache {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Sorted list of every name in the cache.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Copy of the full contents, used to compare two ingestion runs.
    pub fn snapshot(&self) -> HashMap<String, Vec<u8>> {
        self.entries.read().clone()
    }
}

impl CryptoCache for MemCache {
    fn get_crypto(&self, name: &str) -> Result<Vec<u8>, CacheError> {
        self.entries
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| CacheError::NotFound(name.to_string()))
    }

    fn set_crypto(&self, name: &str, value: Vec<u8>) -> Result<(), CacheError> {
        self.entries.write().insert(name.to_string(), value);
        Ok(())
    }
}
