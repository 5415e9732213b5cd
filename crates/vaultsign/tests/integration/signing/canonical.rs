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

//! Low-S enforcement across the identity and suite surfaces.

use assert_matches::assert_matches;
use p256::ecdsa::Signature;
use p256::elliptic_curve::ff::PrimeField;
use std::sync::Arc;
use vaultsign::{
    CryptoSuite, EcdsaSigningManager, Identity, IdentityError, Manager, MemoryStore,
    SignerIdentity, SigningError, SigningManager, SuiteError,
};
use vaultsign_testing::TestIdentity;

fn malleate(der: &[u8]) -> Vec<u8> {
    let sig = Signature::from_der(der).unwrap();
    let (r, s) = sig.split_scalars();
    Signature::from_scalars(r.to_repr(), (-*s).to_repr())
        .unwrap()
        .to_der()
        .as_bytes()
        .to_vec()
}

fn manager_for(user: &TestIdentity) -> Manager {
    let store = MemoryStore::new()
        .with_secret("users/user1/cert.pem", user.cert_pem.clone())
        .with_secret(
            &format!("users/user1/{}", user.private_key_cache_name()),
            user.pkcs8_pem(),
        );
    let config = vaultsign::IdentityConfig::builder()
        .msp_id("Org1MSP")
        .cert_name("cert.pem")
        .build()
        .unwrap();
    Manager::bootstrap(&store, "users", &config).unwrap()
}

#[test]
fn test_identity_rejects_high_s_copy() {
    let user = TestIdentity::generate("user1@org1.example.com");
    let manager = manager_for(&user);
    let identity = manager.signing_identity();

    let sig = identity.sign(b"block 42").unwrap();
    identity.verify(b"block 42", &sig).unwrap();

    let malleated = malleate(&sig);
    assert_matches!(
        identity.public_version().verify(b"block 42", &malleated),
        Err(IdentityError::Signing(SigningError::NonCanonicalSignature))
    );
}

#[test]
fn test_identity_rejects_garbage_signature() {
    let user = TestIdentity::generate("user1@org1.example.com");
    let manager = manager_for(&user);

    assert_matches!(
        manager.signing_identity().verify(b"msg", b"not a signature"),
        Err(IdentityError::Signing(SigningError::MalformedSignature(_)))
    );
}

#[test]
fn test_suite_rejects_high_s_copy() {
    let suite = CryptoSuite::new(Arc::new(EcdsaSigningManager::new()));
    let key = suite.key_gen().unwrap();
    let digest = suite.hash(b"chaincode invocation");

    let sig = suite.sign(&key, &digest).unwrap();
    assert!(suite.verify(&key, &sig, &digest).unwrap());

    assert_matches!(
        suite.verify(&key, &malleate(&sig), &digest),
        Err(SuiteError::Signing(SigningError::NonCanonicalSignature))
    );
}

#[test]
fn test_suite_signing_needs_private_half() {
    let suite = CryptoSuite::new(Arc::new(EcdsaSigningManager::new()));
    let user = TestIdentity::generate("user1@org1.example.com");
    let public = suite.key_import(user.secret_key.public_key()).unwrap();

    assert_matches!(
        suite.sign(&public, &suite.hash(b"msg")),
        Err(SuiteError::Signing(SigningError::MissingPrivateKey))
    );
}

#[test]
fn test_manager_signatures_verify_under_suite_key() {
    let user = TestIdentity::generate("user1@org1.example.com");
    let manager = manager_for(&user);
    let digest = manager.crypto_suite().hash(b"payload");

    let sig = manager
        .sign(&digest, manager.signing_identity().key())
        .unwrap();
    let registered = manager.crypto_suite().get_key(&user.ski()).unwrap();

    assert!(manager
        .crypto_suite()
        .verify(&registered, &sig, &digest)
        .unwrap());
    assert!(manager
        .signing_manager()
        .verify(&digest, &sig, registered.public())
        .unwrap());
}
