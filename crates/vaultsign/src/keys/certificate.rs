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

//! X.509 certificate decoding.

use super::KeyError;
use der::{Decode, Encode};
use p256::pkcs8::DecodePublicKey;
use p256::PublicKey;
use x509_cert::Certificate;

const CERTIFICATE_TAG: &str = "CERTIFICATE";

/// Parses a certificate from PEM, falling back to raw DER.
pub fn parse_certificate(raw: &[u8]) -> Result<Certificate, KeyError> {
    let der = match pem::parse(raw) {
        Ok(block) => {
            if block.tag() != CERTIFICATE_TAG {
                return Err(KeyError::MalformedCertificate(format!(
                    "unexpected PEM block type {}",
                    block.tag()
                )));
            }
            block.into_contents()
        }
        Err(_) => raw.to_vec(),
    };

    Certificate::from_der(&der).map_err(|e| KeyError::MalformedCertificate(e.to_string()))
}

/// Extracts the P-256 public key from `cert`.
///
/// Any other algorithm or curve is reported as a malformed certificate since
/// it cannot anchor a signing identity.
pub fn certificate_public_key(cert: &Certificate) -> Result<PublicKey, KeyError> {
    let spki = cert
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| KeyError::MalformedCertificate(e.to_string()))?;

    PublicKey::from_public_key_der(&spki).map_err(|_| {
        KeyError::MalformedCertificate(format!(
            "public key is not a P-256 ECDSA key (algorithm {})",
            cert.tbs_certificate.subject_public_key_info.algorithm.oid
        ))
    })
}
