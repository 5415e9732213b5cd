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

//! Flat secret-manager backend.
//!
//! A secret manager project is a flat list of secrets whose ids may not
//! contain `@`, `/` or `.`. Hierarchical names are therefore stored encoded
//! (`@` as `____`, `/` as `___`, `.` as `__`) and [`FlatSecretStore`]
//! presents them as the children of the project root.

use super::{status_error, SecretStore, StoreError};
use crate::config::SecretManagerConfig;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use parking_lot::RwLock;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::HashMap;

/// Encodes a hierarchical name into a valid secret id.
pub fn encode_secret_name(name: &str) -> String {
    let mut encoded = String::with_capacity(name.len() * 2);
    for c in name.chars() {
        match c {
            '@' => encoded.push_str("____"),
            '/' => encoded.push_str("___"),
            '.' => encoded.push_str("__"),
            other => encoded.push(other),
        }
    }
    encoded
}

/// Inverse of [`encode_secret_name`]; longer underscore runs win.
pub fn decode_secret_name(encoded: &str) -> String {
    const RULES: [(&str, char); 3] = [("____", '@'), ("___", '/'), ("__", '.')];

    let mut decoded = String::with_capacity(encoded.len());
    let mut rest = encoded;
    'outer: while !rest.is_empty() {
        for (pattern, replacement) in RULES {
            if let Some(tail) = rest.strip_prefix(pattern) {
                decoded.push(replacement);
                rest = tail;
                continue 'outer;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            decoded.push(c);
        }
        rest = chars.as_str();
    }
    decoded
}

/// The two calls ingestion needs from a secret manager.
pub trait SecretManagerApi: Send + Sync {
    /// Ids of every secret in `project`.
    fn list_secrets(&self, project: &str) -> Result<Vec<String>, StoreError>;

    /// Raw payload of the latest version of `secret_id`.
    fn access_latest(&self, project: &str, secret_id: &str) -> Result<Vec<u8>, StoreError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListSecretsResponse {
    #[serde(default)]
    secrets: Vec<SecretResource>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SecretResource {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AccessResponse {
    payload: Option<Payload>,
}

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    data: String,
}

/// REST client authenticated with an OAuth2 bearer token.
pub struct RestSecretManagerApi {
    client: Client,
    endpoint: String,
    access_token: String,
    page_size: u32,
}

impl RestSecretManagerApi {
    pub fn new(config: &SecretManagerConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint().trim_end_matches('/').to_string(),
            access_token: config.access_token().to_string(),
            page_size: config.page_size(),
        })
    }

    fn get<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        path: &str,
    ) -> Result<T, StoreError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, path));
        }

        response
            .json()
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))
    }
}

impl SecretManagerApi for RestSecretManagerApi {
    fn list_secrets(&self, project: &str) -> Result<Vec<String>, StoreError> {
        let url = format!("{}/projects/{}/secrets", self.endpoint, project);
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", self.page_size.to_string())];
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }

            let page: ListSecretsResponse = self.get(&url, &query, project)?;
            ids.extend(page.secrets.into_iter().filter_map(|secret| {
                secret.name.rsplit('/').next().map(str::to_string)
            }));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(ids)
    }

    fn access_latest(&self, project: &str, secret_id: &str) -> Result<Vec<u8>, StoreError> {
        let url = format!(
            "{}/projects/{}/secrets/{}/versions/latest:access",
            self.endpoint, project, secret_id
        );
        let response: AccessResponse = self.get(&url, &[], secret_id)?;
        let payload = response
            .payload
            .ok_or_else(|| StoreError::NotFound(secret_id.to_string()))?;

        BASE64
            .decode(payload.data.as_bytes())
            .map_err(|e| StoreError::InvalidResponse(format!("payload of {secret_id}: {e}")))
    }
}

/// Presents a flat project as a one-level tree rooted at the project id.
///
/// Listing the root remembers which secret id each decoded name came from,
/// and reads go back to that id. Names that decode with a leading or
/// trailing `/` therefore still resolve to their secret.
pub struct FlatSecretStore<A> {
    api: A,
    project: String,
    ids: RwLock<HashMap<String, String>>,
}

impl<A: SecretManagerApi> FlatSecretStore<A> {
    pub fn new(api: A, project: impl Into<String>) -> Self {
        Self {
            api,
            project: project.into().trim_matches('/').to_string(),
            ids: RwLock::new(HashMap::new()),
        }
    }

    /// Project id, the root path to ingest.
    pub fn project(&self) -> &str {
        &self.project
    }

    fn secret_name<'a>(&self, path: &'a str) -> Option<&'a str> {
        path.trim_matches('/')
            .strip_prefix(self.project.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| !name.is_empty())
    }
}

impl<A: SecretManagerApi> SecretStore for FlatSecretStore<A> {
    fn list(&self, path: &str) -> Result<Option<Vec<String>>, StoreError> {
        if path.trim_matches('/') != self.project {
            return Ok(None);
        }

        let ids = self.api.list_secrets(&self.project)?;
        let mut known = self.ids.write();
        let names = ids
            .into_iter()
            .map(|id| {
                let name = decode_secret_name(&id);
                known.insert(name.trim_matches('/').to_string(), id);
                name
            })
            .collect();
        Ok(Some(names))
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        let name = self
            .secret_name(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        let id = self
            .ids
            .read()
            .get(name)
            .cloned()
            .unwrap_or_else(|| encode_secret_name(name));
        self.api.access_latest(&self.project, &id)
    }

    fn backend(&self) -> &'static str {
        "secret-manager"
    }
}
