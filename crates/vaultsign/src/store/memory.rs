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

//! In-process secret tree.

use super::{SecretStore, StoreError};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};

/// A tree of secrets held in memory.
///
/// Directories are implied by the paths of the secrets beneath them.
/// Individual paths can be made to fail, which lets callers rehearse how an
/// ingestion run treats missing, forbidden and broken secrets.
#[derive(Debug, Default)]
pub struct MemoryStore {
    secrets: RwLock<BTreeMap<String, Vec<u8>>>,
    failures: RwLock<BTreeMap<String, StoreError>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_secret(self, path: &str, payload: impl Into<Vec<u8>>) -> Self {
        self.insert(path, payload);
        self
    }

    /// Adds or replaces the secret at `path`.
    pub fn insert(&self, path: &str, payload: impl Into<Vec<u8>>) {
        self.secrets
            .write()
            .insert(normalize(path), payload.into());
    }

    /// Makes every list or read of `path` fail with `error`.
    pub fn fail(&self, path: &str, error: StoreError) {
        self.failures.write().insert(normalize(path), error);
    }

    fn failure(&self, path: &str) -> Result<(), StoreError> {
        match self.failures.read().get(path) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

fn normalize(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

impl SecretStore for MemoryStore {
    fn list(&self, path: &str) -> Result<Option<Vec<String>>, StoreError> {
        let path = normalize(path);
        self.failure(&path)?;

        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{path}/")
        };

        let mut children = BTreeSet::new();
        for name in self.secrets.read().keys() {
            if let Some(rest) = name.strip_prefix(&prefix) {
                match rest.split_once('/') {
                    Some((dir, _)) => children.insert(format!("{dir}/")),
                    None => children.insert(rest.to_string()),
                };
            }
        }

        if children.is_empty() {
            Ok(None)
        } else {
            Ok(Some(children.into_iter().collect()))
        }
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        let path = normalize(path);
        self.failure(&path)?;

        self.secrets
            .read()
            .get(&path)
            .cloned()
            .ok_or(StoreError::NotFound(path))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
