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

//! Legacy OpenSSL PEM encryption (`Proc-Type: 4,ENCRYPTED` + `DEK-Info`).
//!
//! The body is CBC-encrypted under a key derived with the MD5 variant of
//! `EVP_BytesToKey`, salted with the first 8 bytes of the IV.

use super::KeyError;
use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};
use des::{Des, TdesEde3};
use md5::{Digest, Md5};
use zeroize::Zeroizing;

const PROC_TYPE: &str = "Proc-Type";
const DEK_INFO: &str = "DEK-Info";
const ENCRYPTED: &str = "4,ENCRYPTED";
const SALT_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cipher {
    Aes128Cbc,
    Aes192Cbc,
    Aes256Cbc,
    DesCbc,
    DesEde3Cbc,
}

impl Cipher {
    fn from_name(name: &str) -> Result<Self, KeyError> {
        match name {
            "AES-128-CBC" => Ok(Cipher::Aes128Cbc),
            "AES-192-CBC" => Ok(Cipher::Aes192Cbc),
            "AES-256-CBC" => Ok(Cipher::Aes256Cbc),
            "DES-CBC" => Ok(Cipher::DesCbc),
            "DES-EDE3-CBC" => Ok(Cipher::DesEde3Cbc),
            other => Err(KeyError::DecryptionFailed(format!(
                "unknown encryption mode {other}"
            ))),
        }
    }

    fn key_len(self) -> usize {
        match self {
            Cipher::Aes128Cbc => 16,
            Cipher::Aes192Cbc => 24,
            Cipher::Aes256Cbc => 32,
            Cipher::DesCbc => 8,
            Cipher::DesEde3Cbc => 24,
        }
    }

    fn iv_len(self) -> usize {
        match self {
            Cipher::DesCbc | Cipher::DesEde3Cbc => 8,
            _ => 16,
        }
    }

    fn decrypt(self, key: &[u8], iv: &[u8], body: &[u8]) -> Result<Vec<u8>, KeyError> {
        fn run<C>(key: &[u8], iv: &[u8], body: &[u8]) -> Result<Vec<u8>, KeyError>
        where
            C: KeyIvInit + BlockDecryptMut,
        {
            C::new_from_slices(key, iv)
                .map_err(|e| KeyError::DecryptionFailed(e.to_string()))?
                .decrypt_padded_vec_mut::<Pkcs7>(body)
                .map_err(|_| KeyError::DecryptionFailed("incorrect password".to_string()))
        }

        match self {
            Cipher::Aes128Cbc => run::<cbc::Decryptor<Aes128>>(key, iv, body),
            Cipher::Aes192Cbc => run::<cbc::Decryptor<Aes192>>(key, iv, body),
            Cipher::Aes256Cbc => run::<cbc::Decryptor<Aes256>>(key, iv, body),
            Cipher::DesCbc => run::<cbc::Decryptor<Des>>(key, iv, body),
            Cipher::DesEde3Cbc => run::<cbc::Decryptor<TdesEde3>>(key, iv, body),
        }
    }
}

/// True when the block carries the legacy encryption headers.
pub(crate) fn is_encrypted(block: &pem::Pem) -> bool {
    block
        .headers()
        .get(PROC_TYPE)
        .map(|value| value.trim() == ENCRYPTED)
        .unwrap_or(false)
}

/// Decrypts the body of a legacy encrypted PEM block.
pub(crate) fn decrypt_block(block: &pem::Pem, password: &[u8]) -> Result<Vec<u8>, KeyError> {
    let dek_info = block
        .headers()
        .get(DEK_INFO)
        .ok_or_else(|| KeyError::DecryptionFailed("missing DEK-Info header".to_string()))?;

    let (mode, iv_hex) = dek_info
        .split_once(',')
        .ok_or_else(|| KeyError::DecryptionFailed(format!("malformed DEK-Info: {dek_info}")))?;
    let cipher = Cipher::from_name(mode.trim())?;

    let iv = hex::decode(iv_hex.trim())
        .map_err(|e| KeyError::DecryptionFailed(format!("malformed IV: {e}")))?;
    if iv.len() != cipher.iv_len() {
        return Err(KeyError::DecryptionFailed(format!(
            "IV length {} does not match {:?}",
            iv.len(),
            cipher
        )));
    }

    let key = derive_key(password, &iv[..SALT_LEN], cipher.key_len());
    cipher.decrypt(&key, &iv, block.contents())
}

/// `EVP_BytesToKey` with MD5 and a single iteration.
pub(crate) fn derive_key(password: &[u8], salt: &[u8], len: usize) -> Zeroizing<Vec<u8>> {
    let mut key = Zeroizing::new(Vec::with_capacity(len + 16));
    let mut previous: Vec<u8> = Vec::new();
    while key.len() < len {
        let mut hasher = Md5::new();
        hasher.update(&previous);
        hasher.update(password);
        hasher.update(salt);
        previous = hasher.finalize().to_vec();
        key.extend_from_slice(&previous);
    }
    key.truncate(len);
    key
}
