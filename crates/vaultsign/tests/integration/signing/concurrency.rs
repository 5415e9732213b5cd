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

//! One identity shared across threads.

use std::sync::Arc;
use std::thread;
use vaultsign::{CryptoCache, Identity, IdentityConfig, Manager, MemoryStore, SignerIdentity};
use vaultsign_testing::TestIdentity;

const THREADS: usize = 8;
const ROUNDS: usize = 16;

#[test]
fn test_concurrent_sign_and_verify() {
    let user = TestIdentity::generate("user1@org1.example.com");
    let store = MemoryStore::new()
        .with_secret("kv/user1/cert.pem", user.cert_pem.clone())
        .with_secret(
            &format!("kv/user1/{}", user.private_key_cache_name()),
            user.sec1_pem(),
        );
    let config = IdentityConfig::builder()
        .msp_id("Org1MSP")
        .cert_name("cert.pem")
        .build()
        .unwrap();
    let manager = Arc::new(Manager::bootstrap(&store, "kv", &config).unwrap());

    let handles: Vec<_> = (0..THREADS)
        .map(|worker| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                let identity = manager.signing_identity();
                let verifier = identity.public_version();
                for round in 0..ROUNDS {
                    let msg = format!("worker {worker} round {round}");
                    let sig = identity.sign(msg.as_bytes()).unwrap();
                    verifier.verify(msg.as_bytes(), &sig).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_readers_share_cache() {
    let user = TestIdentity::generate("user1@org1.example.com");
    let store = MemoryStore::new()
        .with_secret("kv/org1/tls/ca.pem", user.cert_pem.clone())
        .with_secret("kv/user1/cert.pem", user.cert_pem.clone())
        .with_secret(
            &format!("kv/user1/{}", user.private_key_cache_name()),
            user.pkcs8_pem(),
        );
    let config = IdentityConfig::builder()
        .msp_id("Org1MSP")
        .cert_name("cert.pem")
        .build()
        .unwrap();
    let manager = Manager::bootstrap(&store, "kv", &config).unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let cache = manager.cache();
            let expected = user.cert_pem.clone();
            thread::spawn(move || {
                for _ in 0..ROUNDS {
                    assert_eq!(
                        cache.get_crypto("org1/tls/ca.pem").unwrap(),
                        expected.as_bytes()
                    );
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
