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

//! Secret ingestion.
//!
//! [`SecretIngester`] walks a [`SecretStore`] from a root path and copies
//! every leaf secret into a [`CryptoCache`]. It runs once, synchronously,
//! before any identity is built.
//!
//! Leaves are named in the cache by their path:
//! - below a `tls` directory: `"<dir before tls>/tls/<rest>"`
//! - anywhere else: the final path segment
//!
//! Payloads are base64-decoded when they decode cleanly and stored raw
//! otherwise. Missing or forbidden secrets are skipped; any other store
//! error aborts the run.

use crate::audit;
use crate::cache::{CacheError, CryptoCache};
use crate::store::{SecretStore, StoreError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::time::{Duration, Instant};
use thiserror::Error;

const TLS_SEGMENT: &str = "tls";

/// Errors that abort an ingestion run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Secret store error at {path}: {source}")]
    Store {
        path: String,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// A secret left out of the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSecret {
    pub path: String,
    pub reason: String,
}

/// Outcome of a successful ingestion run.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Cache keys written, in walk order. A key appears once per write.
    pub stored: Vec<String>,
    pub skipped: Vec<SkippedSecret>,
    pub elapsed: Duration,
}

/// Cache key for the leaf secret at `path`.
pub fn cache_key_for(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let len = segments.len();

    let tls = (1..len.saturating_sub(1))
        .rev()
        .find(|&i| segments[i] == TLS_SEGMENT);

    match tls {
        Some(i) => format!(
            "{}/{}/{}",
            segments[i - 1],
            TLS_SEGMENT,
            segments[i + 1..].join("/")
        ),
        None => segments.last().map(|s| s.to_string()).unwrap_or_default(),
    }
}

/// Base64-decodes `payload` when possible, otherwise returns it unchanged.
///
/// Line breaks inside the payload are ignored, so output wrapped by
/// `base64` or `openssl base64` decodes like a single line.
pub fn decode_payload(payload: &[u8]) -> Vec<u8> {
    let compact: Vec<u8> = trim_ascii_whitespace(payload)
        .iter()
        .copied()
        .filter(|b| !matches!(b, b'\r' | b'\n'))
        .collect();

    BASE64
        .decode(&compact)
        .unwrap_or_else(|_| payload.to_vec())
}

fn trim_ascii_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

fn join(parent: &str, child: &str) -> String {
    let parent = parent.trim_end_matches('/');
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}/{child}")
    }
}

/// Copies a secret-store subtree into a cache.
pub struct SecretIngester<'a, S: SecretStore + ?Sized> {
    store: &'a S,
    cache: &'a dyn CryptoCache,
}

impl<'a, S: SecretStore + ?Sized> SecretIngester<'a, S> {
    pub fn new(store: &'a S, cache: &'a dyn CryptoCache) -> Self {
        Self { store, cache }
    }

    /// Ingests everything below `root`.
    pub fn run(&self, root: &str) -> Result<IngestReport, IngestError> {
        let backend = self.store.backend();
        audit::log_ingest_started(backend, root);

        let started = Instant::now();
        let mut report = IngestReport::default();

        if let Err(e) = self.walk(root, true, &mut report) {
            let path = match &e {
                IngestError::Store { path, .. } => path.as_str(),
                IngestError::Cache(_) => root,
            };
            audit::log_ingest_failed(backend, path, &e.to_string());
            return Err(e);
        }

        report.elapsed = started.elapsed();
        audit::log_ingest_completed(
            backend,
            root,
            report.stored.len(),
            report.skipped.len(),
            report.elapsed,
        );
        Ok(report)
    }

    fn walk(&self, path: &str, is_root: bool, report: &mut IngestReport) -> Result<(), IngestError> {
        let children = match self.store.list(path) {
            Ok(children) => children,
            Err(e) if e.is_skippable() && !is_root => {
                skip(report, path, &e);
                return Ok(());
            }
            Err(source) => {
                return Err(IngestError::Store {
                    path: path.to_string(),
                    source,
                })
            }
        };

        match children {
            Some(children) if !children.is_empty() => {
                for child in &children {
                    let child = child.trim_matches('/');
                    if child.is_empty() {
                        continue;
                    }
                    self.walk(&join(path, child), false, report)?;
                }
                Ok(())
            }
            _ => self.pull(path, report),
        }
    }

    fn pull(&self, path: &str, report: &mut IngestReport) -> Result<(), IngestError> {
        let payload = match self.store.read(path) {
            Ok(payload) => payload,
            Err(e) if e.is_skippable() => {
                skip(report, path, &e);
                return Ok(());
            }
            Err(source) => {
                return Err(IngestError::Store {
                    path: path.to_string(),
                    source,
                })
            }
        };

        let key = cache_key_for(path);
        let value = decode_payload(&payload);
        audit::log_secret_stored(path, &key, value.len());
        self.cache.set_crypto(&key, value)?;
        report.stored.push(key);
        Ok(())
    }
}

fn skip(report: &mut IngestReport, path: &str, error: &StoreError) {
    let reason = error.to_string();
    audit::log_secret_skipped(path, &reason);
    report.skipped.push(SkippedSecret {
        path: path.to_string(),
        reason,
    });
}

/// Runs a [`SecretIngester`] over `store` from `root`.
pub fn ingest<S: SecretStore + ?Sized>(
    store: &S,
    cache: &dyn CryptoCache,
    root: &str,
) -> Result<IngestReport, IngestError> {
    SecretIngester::new(store, cache).run(root)
}
