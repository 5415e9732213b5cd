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

//! End-to-end bootstrap against a mocked Vault server.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use mockito::{Matcher, Mock, Server, ServerGuard};
use vaultsign::{CryptoCache, Identity, IdentityConfig, Manager, SignerIdentity, VaultConfig};
use vaultsign_testing::TestIdentity;

fn list(server: &mut ServerGuard, path: &str, keys: &[&str]) -> Mock {
    let body = serde_json::json!({ "data": { "keys": keys } }).to_string();
    server
        .mock("LIST", path)
        .match_header("x-vault-token", "s.test")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create()
}

fn leaf(server: &mut ServerGuard, path: &str, value: &str) -> Mock {
    server.mock("LIST", path).with_status(404).create();
    let body = serde_json::json!({ "data": { "data": value } }).to_string();
    server
        .mock("GET", path)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create()
}

fn vault_config(server: &Server) -> VaultConfig {
    VaultConfig::builder()
        .address(server.url())
        .token("s.test")
        .root("kv/atomyze")
        .build()
        .unwrap()
}

#[test]
fn test_bootstrap_from_vault_tree() {
    let user = TestIdentity::generate("user1@org1.example.com");
    let ca = TestIdentity::generate("ca.org1.example.com");
    let sk_name = user.private_key_cache_name();

    let mut server = Server::new();
    list(&mut server, "/v1/kv/atomyze", &["org1/", "user1@org1/"]);
    list(&mut server, "/v1/kv/atomyze/org1", &["tls/"]);
    list(&mut server, "/v1/kv/atomyze/org1/tls", &["ca.pem"]);
    let ca_read = leaf(
        &mut server,
        "/v1/kv/atomyze/org1/tls/ca.pem",
        &BASE64.encode(&ca.cert_pem),
    );
    list(
        &mut server,
        "/v1/kv/atomyze/user1@org1",
        &["cert.pem", sk_name.as_str()],
    );
    leaf(
        &mut server,
        "/v1/kv/atomyze/user1@org1/cert.pem",
        &BASE64.encode(&user.cert_pem),
    );
    leaf(
        &mut server,
        &format!("/v1/kv/atomyze/user1@org1/{sk_name}"),
        &user.pkcs8_pem(),
    );

    let identity_config = IdentityConfig::builder()
        .msp_id("Org1MSP")
        .cert_name("cert.pem")
        .build()
        .unwrap();
    let manager = Manager::from_vault(&vault_config(&server), &identity_config).unwrap();

    ca_read.assert();
    let cache = manager.cache();
    assert_eq!(
        cache.get_crypto("org1/tls/ca.pem").unwrap(),
        ca.cert_pem.as_bytes()
    );

    let identity = manager.signing_identity();
    assert_eq!(identity.identifier().msp_id, "Org1MSP");
    assert_eq!(identity.enrollment_certificate(), user.cert_pem.as_bytes());

    let sig = identity.sign(b"endorsement").unwrap();
    identity.verify(b"endorsement", &sig).unwrap();
}

#[test]
fn test_forbidden_leaf_is_skipped() {
    let mut server = Server::new();
    list(&mut server, "/v1/kv/atomyze", &["cert.pem", "secret"]);
    leaf(&mut server, "/v1/kv/atomyze/cert.pem", "Y2VydA==");
    server
        .mock("LIST", "/v1/kv/atomyze/secret")
        .with_status(404)
        .create();
    server
        .mock("GET", "/v1/kv/atomyze/secret")
        .match_query(Matcher::Any)
        .with_status(403)
        .create();

    let store = vaultsign::store::VaultStore::new(&vault_config(&server)).unwrap();
    let cache = vaultsign::MemCache::new();
    let report = vaultsign::ingest(&store, &cache, "kv/atomyze").unwrap();

    assert_eq!(report.stored, vec!["cert.pem"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].path, "kv/atomyze/secret");
}

#[test]
fn test_server_error_aborts_bootstrap() {
    let mut server = Server::new();
    server
        .mock("LIST", "/v1/kv/atomyze")
        .with_status(500)
        .create();

    let identity_config = IdentityConfig::builder()
        .msp_id("Org1MSP")
        .cert_name("cert.pem")
        .build()
        .unwrap();

    assert!(matches!(
        Manager::from_vault(&vault_config(&server), &identity_config),
        Err(vaultsign::Error::Ingest(_))
    ));
}
