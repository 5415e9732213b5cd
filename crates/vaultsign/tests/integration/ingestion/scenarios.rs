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

//! Ingestion scenarios over an in-memory secret tree.

use assert_matches::assert_matches;
use vaultsign::{ingest, CacheError, CryptoCache, IngestError, MemCache, MemoryStore, StoreError};

#[test]
fn test_tls_leaf_keeps_org_prefix() {
    let store = MemoryStore::new().with_secret("orgA/tls/ca.pem", "X");
    let cache = MemCache::new();

    ingest(&store, &cache, "").unwrap();

    assert_eq!(cache.get_crypto("orgA/tls/ca.pem").unwrap(), b"X");
}

#[test]
fn test_non_tls_leaf_is_flattened() {
    let store = MemoryStore::new().with_secret("user1/cert.pem", "-----BEGIN CERTIFICATE-----");
    let cache = MemCache::new();

    ingest(&store, &cache, "").unwrap();

    assert_eq!(
        cache.get_crypto("cert.pem").unwrap(),
        b"-----BEGIN CERTIFICATE-----"
    );
    assert_matches!(
        cache.get_crypto("user1/cert.pem"),
        Err(CacheError::NotFound(_))
    );
}

#[test]
fn test_deeply_nested_tls_material() {
    let store = MemoryStore::new()
        .with_secret("kv/atomyze/dev0/peers/peer0@org1/tls/server.crt", "Y3J0")
        .with_secret("kv/atomyze/dev0/peers/peer0@org1/tls/server.key", "a2V5");
    let cache = MemCache::new();

    ingest(&store, &cache, "kv/atomyze").unwrap();

    assert_eq!(cache.get_crypto("peer0@org1/tls/server.crt").unwrap(), b"crt");
    assert_eq!(cache.get_crypto("peer0@org1/tls/server.key").unwrap(), b"key");
}

#[test]
fn test_ingestion_is_idempotent() {
    let store = MemoryStore::new()
        .with_secret("kv/org1/tls/ca.pem", "Y2E=")
        .with_secret("kv/users/user1/cert.pem", "Y2VydA==")
        .with_secret("kv/users/user1/abc_sk", "raw key bytes");
    let cache = MemCache::new();

    ingest(&store, &cache, "kv").unwrap();
    let first = cache.snapshot();
    ingest(&store, &cache, "kv").unwrap();

    assert_eq!(cache.snapshot(), first);
    assert_eq!(cache.len(), 3);
}

#[test]
fn test_same_leaf_name_last_write_wins() {
    let store = MemoryStore::new()
        .with_secret("kv/a/cert.pem", "first")
        .with_secret("kv/b/cert.pem", "second");
    let cache = MemCache::new();

    let report = ingest(&store, &cache, "kv").unwrap();

    assert_eq!(report.stored, vec!["cert.pem", "cert.pem"]);
    assert_eq!(cache.get_crypto("cert.pem").unwrap(), b"second");
}

#[test]
fn test_skipped_and_fatal_errors() {
    let store = MemoryStore::new()
        .with_secret("kv/denied", "x")
        .with_secret("kv/ok", "b2s=");
    store.fail("kv/denied", StoreError::PermissionDenied("kv/denied".into()));
    let cache = MemCache::new();

    let report = ingest(&store, &cache, "kv").unwrap();
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(cache.get_crypto("ok").unwrap(), b"ok");

    store.fail(
        "kv/ok",
        StoreError::Status {
            status: 503,
            path: "kv/ok".into(),
        },
    );
    assert_matches!(
        ingest(&store, &MemCache::new(), "kv"),
        Err(IngestError::Store { source: StoreError::Status { status: 503, .. }, .. })
    );
}
