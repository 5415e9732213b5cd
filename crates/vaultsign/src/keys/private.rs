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

//! Private key decoding.
//!
//! PEM bodies are tried as PKCS#1, PKCS#8 and SEC1 in that order. PKCS#1
//! is recognized only to reject RSA keys with a clear error.

use super::legacy;
use super::KeyError;
use p256::SecretKey;
use pkcs8::{EncryptedPrivateKeyInfo, ObjectIdentifier, PrivateKeyInfo};

/// `id-ecPublicKey`, the PKCS#8 algorithm for every EC curve.
const EC_PUBLIC_KEY_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

const ENCRYPTED_PKCS8_TAG: &str = "ENCRYPTED PRIVATE KEY";

/// Decodes a PEM private key, decrypting it first when needed.
///
/// `password` is only consulted for encrypted blocks; an encrypted block
/// without a password fails with [`KeyError::PasswordRequired`].
pub fn parse_private_key_pem(raw: &[u8], password: Option<&[u8]>) -> Result<SecretKey, KeyError> {
    let block = pem::parse(raw).map_err(|e| KeyError::MalformedPem(e.to_string()))?;
    let password = password.filter(|p| !p.is_empty());

    if legacy::is_encrypted(&block) {
        let password = password.ok_or(KeyError::PasswordRequired)?;
        let der = zeroize::Zeroizing::new(legacy::decrypt_block(&block, password)?);
        return der_to_private_key(&der);
    }

    if block.tag() == ENCRYPTED_PKCS8_TAG {
        let password = password.ok_or(KeyError::PasswordRequired)?;
        let info = EncryptedPrivateKeyInfo::try_from(block.contents())
            .map_err(|e| KeyError::MalformedPem(e.to_string()))?;
        let document = info
            .decrypt(password)
            .map_err(|e| KeyError::DecryptionFailed(e.to_string()))?;
        return der_to_private_key(document.as_bytes());
    }

    der_to_private_key(block.contents())
}

fn der_to_private_key(der: &[u8]) -> Result<SecretKey, KeyError> {
    if rsa::pkcs1::RsaPrivateKey::try_from(der).is_ok() {
        return Err(KeyError::InvalidKeyType(
            "PKCS#1 RSA key, expected an ECDSA private key".to_string(),
        ));
    }

    if let Ok(info) = PrivateKeyInfo::try_from(der) {
        if info.algorithm.oid != EC_PUBLIC_KEY_OID {
            return Err(KeyError::UnsupportedKeyWrapping);
        }
        return SecretKey::try_from(info)
            .map_err(|e| KeyError::InvalidKeyType(format!("unsupported EC curve: {e}")));
    }

    SecretKey::from_sec1_der(der).map_err(|_| KeyError::InvalidPrivateKeyEncoding)
}
