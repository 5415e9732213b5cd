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

//! End-to-end bootstrap against a mocked secret-manager REST endpoint.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use mockito::{Matcher, Server, ServerGuard};
use vaultsign::store::encode_secret_name;
use vaultsign::{
    CryptoCache, Identity, IdentityConfig, Manager, SecretManagerConfig, SignerIdentity,
};
use vaultsign_testing::TestIdentity;

const PROJECT: &str = "atomyze-prod";

fn config(server: &Server) -> SecretManagerConfig {
    SecretManagerConfig::builder()
        .project(PROJECT)
        .access_token("ya29.test")
        .endpoint(format!("{}/v1", server.url()))
        .build()
        .unwrap()
}

fn serve_secret(server: &mut ServerGuard, name: &str, value: &[u8]) {
    let path = format!(
        "/v1/projects/{PROJECT}/secrets/{}/versions/latest:access",
        encode_secret_name(name)
    );
    let body = serde_json::json!({
        "name": format!("projects/{PROJECT}/secrets/{}/versions/3", encode_secret_name(name)),
        "payload": { "data": BASE64.encode(value) },
    })
    .to_string();
    server
        .mock("GET", path.as_str())
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer ya29.test")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create();
}

fn serve_listing(server: &mut ServerGuard, names: &[&str]) {
    let secrets: Vec<_> = names
        .iter()
        .map(|name| {
            serde_json::json!({
                "name": format!("projects/{PROJECT}/secrets/{}", encode_secret_name(name)),
            })
        })
        .collect();
    server
        .mock("GET", format!("/v1/projects/{PROJECT}/secrets").as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::json!({ "secrets": secrets }).to_string())
        .create();
}

#[test]
fn test_bootstrap_from_secret_manager() {
    let user = TestIdentity::generate("user1@org1.example.com");
    let sk_name = format!("user1@org1/{}", user.private_key_cache_name());
    let ca_name = "org1/tls/ca.pem";
    let ca = TestIdentity::generate("tlsca.org1.example.com");

    let mut server = Server::new();
    serve_listing(&mut server, &["user1@org1/cert.pem", &sk_name, ca_name]);
    serve_secret(&mut server, "user1@org1/cert.pem", user.cert_pem.as_bytes());
    serve_secret(&mut server, &sk_name, user.pkcs8_pem().as_bytes());
    serve_secret(&mut server, ca_name, ca.cert_pem.as_bytes());

    let identity_config = IdentityConfig::builder()
        .msp_id("Org1MSP")
        .cert_name("cert.pem")
        .build()
        .unwrap();
    let manager = Manager::from_secret_manager(&config(&server), &identity_config).unwrap();

    assert_eq!(manager.ingest_report().stored.len(), 3);
    assert!(manager.ingest_report().skipped.is_empty());

    let cache = manager.cache();
    assert_eq!(cache.get_crypto(ca_name).unwrap(), ca.cert_pem.as_bytes());
    assert_eq!(
        cache.get_crypto(&user.private_key_cache_name()).unwrap(),
        user.pkcs8_pem().as_bytes()
    );

    let identity = manager.signing_identity();
    let sig = identity.sign(b"proposal").unwrap();
    identity.public_version().verify(b"proposal", &sig).unwrap();
}

#[test]
fn test_secret_without_payload_is_skipped() {
    let mut server = Server::new();
    serve_listing(&mut server, &["app/cert.pem", "app/revoked.pem"]);
    serve_secret(&mut server, "app/cert.pem", b"Y2VydA==");
    server
        .mock(
            "GET",
            format!(
                "/v1/projects/{PROJECT}/secrets/{}/versions/latest:access",
                encode_secret_name("app/revoked.pem")
            )
            .as_str(),
        )
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"name":"projects/atomyze-prod/secrets/x/versions/1"}"#)
        .create();

    let api = vaultsign::store::RestSecretManagerApi::new(&config(&server)).unwrap();
    let store = vaultsign::store::FlatSecretStore::new(api, PROJECT);
    let cache = vaultsign::MemCache::new();
    let report = vaultsign::ingest(&store, &cache, store.project()).unwrap();

    assert_eq!(report.stored, vec!["cert.pem"]);
    assert_eq!(cache.get_crypto("cert.pem").unwrap(), b"cert");
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].path, "atomyze-prod/app/revoked.pem");
}

#[test]
fn test_unauthorized_listing_is_fatal() {
    let mut server = Server::new();
    server
        .mock("GET", format!("/v1/projects/{PROJECT}/secrets").as_str())
        .match_query(Matcher::Any)
        .with_status(401)
        .create();

    let identity_config = IdentityConfig::builder()
        .msp_id("Org1MSP")
        .cert_name("cert.pem")
        .build()
        .unwrap();

    assert!(matches!(
        Manager::from_secret_manager(&config(&server), &identity_config),
        Err(vaultsign::Error::Ingest(_))
    ));
}
