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

//! SKI-indexed registry of keys.

use super::{EcdsaKey, Key};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Maps hex SKIs to keys. Entries are added by key generation and import
/// and are never removed; a later import of the same point replaces the
/// earlier entry.
#[derive(Debug, Default)]
pub struct KeyStore {
    keys: RwLock<HashMap<String, EcdsaKey>>,
}

impl KeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `key` under its SKI and returns that SKI.
    pub fn store(&self, key: EcdsaKey) -> Vec<u8> {
        let ski = key.ski();
        self.keys.write().insert(hex::encode(&ski), key);
        ski
    }

    /// Looks up a key by raw SKI bytes.
    pub fn get(&self, ski: &[u8]) -> Option<EcdsaKey> {
        self.keys.read().get(&hex::encode(ski)).cloned()
    }

    pub fn len(&self) -> usize {
        self.keys.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.read().is_empty()
    }
}
