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

//! HashiCorp Vault KV backend.
//!
//! Directories are listed with the `LIST` verb; leaves are read with `GET`
//! and must hold their payload as a string under `data.data`.

use super::{status_error, SecretStore, StoreError};
use crate::config::VaultConfig;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{Method, StatusCode};
use serde::Deserialize;

const TOKEN_HEADER: &str = "X-Vault-Token";
const NAMESPACE_HEADER: &str = "X-Vault-Namespace";

#[derive(Debug, Deserialize)]
struct ListResponse {
    data: ListData,
}

#[derive(Debug, Deserialize)]
struct ListData {
    #[serde(default)]
    keys: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ReadResponse {
    #[serde(default)]
    data: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Blocking client for one Vault server.
pub struct VaultStore {
    client: Client,
    address: String,
    token: String,
    namespace: Option<String>,
    list_method: Method,
}

impl VaultStore {
    pub fn new(config: &VaultConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let list_method =
            Method::from_bytes(b"LIST").map_err(|e| StoreError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            address: config.address().trim_end_matches('/').to_string(),
            token: config.token().to_string(),
            namespace: config.namespace().map(str::to_string),
            list_method,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.address, path.trim_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self
            .client
            .request(method, self.url(path))
            .header(TOKEN_HEADER, &self.token);
        if let Some(namespace) = &self.namespace {
            request = request.header(NAMESPACE_HEADER, namespace);
        }
        request
    }
}

impl SecretStore for VaultStore {
    fn list(&self, path: &str) -> Result<Option<Vec<String>>, StoreError> {
        let response = self
            .request(self.list_method.clone(), path)
            .send()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body: ListResponse = response
                    .json()
                    .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
                Ok(Some(body.data.keys))
            }
            status => Err(status_error(status, path)),
        }
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        let response = self
            .request(Method::GET, path)
            .send()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, path));
        }

        let body: ReadResponse = response
            .json()
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;

        match body.data.as_ref().and_then(|data| data.get("data")) {
            None | Some(serde_json::Value::Null) => Err(StoreError::NotFound(path.to_string())),
            Some(serde_json::Value::String(value)) => Ok(value.clone().into_bytes()),
            Some(_) => Err(StoreError::InvalidResponse(format!(
                "value of {path} is not a string"
            ))),
        }
    }

    fn backend(&self) -> &'static str {
        "vault"
    }
}
