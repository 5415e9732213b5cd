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

//! Configuration types for the secret stores and the signing identity.
//!
//! Each struct is built with a builder that validates required fields:
//!
//! ```rust,ignore
//! let vault = VaultConfig::builder()
//!     .address("https://vault.example.com:8200")
//!     .token(token)
//!     .root("kv/atomyze")
//!     .build()?;
//! ```
//!
//! or deserialized from JSON with [`VaultConfig::from_json`].

use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SECRET_MANAGER_ENDPOINT: &str = "https://secretmanager.googleapis.com/v1";
const DEFAULT_PAGE_SIZE: u32 = 100;

/// Errors that can occur while building a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration field: {0}")]
    MissingField(&'static str),

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_endpoint() -> String {
    DEFAULT_SECRET_MANAGER_ENDPOINT.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn require(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::MissingField(field))
    } else {
        Ok(())
    }
}

/// Connection settings for a Vault KV tree.
#[derive(Clone, Deserialize)]
#[non_exhaustive]
pub struct VaultConfig {
    #[serde(default)]
    address: String,
    #[serde(default)]
    token: String,
    #[serde(default)]
    namespace: Option<String>,
    #[serde(default)]
    root: String,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

impl VaultConfig {
    pub fn builder() -> VaultConfigBuilder {
        VaultConfigBuilder::default()
    }

    /// Parses and validates a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        require("address", &self.address)?;
        require("token", &self.token)?;
        require("root", &self.root)?;
        if !(self.address.starts_with("http://") || self.address.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "address",
                reason: format!("expected an http(s) URL, got {}", self.address),
            });
        }
        Ok(())
    }

    /// Base URL of the Vault server.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Enterprise namespace sent as `X-Vault-Namespace`.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Path whose subtree is ingested.
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultConfig")
            .field("address", &self.address)
            .field("token", &"<redacted>")
            .field("namespace", &self.namespace)
            .field("root", &self.root)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Builder for [`VaultConfig`].
#[derive(Debug, Clone)]
pub struct VaultConfigBuilder {
    config: VaultConfig,
}

impl Default for VaultConfigBuilder {
    fn default() -> Self {
        Self {
            config: VaultConfig {
                address: String::new(),
                token: String::new(),
                namespace: None,
                root: String::new(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
        }
    }
}

impl VaultConfigBuilder {
    pub fn address(mut self, value: impl Into<String>) -> Self {
        self.config.address = value.into();
        self
    }

    pub fn token(mut self, value: impl Into<String>) -> Self {
        self.config.token = value.into();
        self
    }

    pub fn namespace(mut self, value: impl Into<String>) -> Self {
        self.config.namespace = Some(value.into());
        self
    }

    pub fn root(mut self, value: impl Into<String>) -> Self {
        self.config.root = value.into();
        self
    }

    pub fn timeout(mut self, value: Duration) -> Self {
        self.config.timeout_secs = value.as_secs().max(1);
        self
    }

    pub fn build(self) -> Result<VaultConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Settings for a flat secret-manager project.
#[derive(Clone, Deserialize)]
#[non_exhaustive]
pub struct SecretManagerConfig {
    #[serde(default)]
    project: String,
    #[serde(default)]
    access_token: String,
    #[serde(default = "default_endpoint")]
    endpoint: String,
    #[serde(default = "default_page_size")]
    page_size: u32,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

impl SecretManagerConfig {
    pub fn builder() -> SecretManagerConfigBuilder {
        SecretManagerConfigBuilder::default()
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        require("project", &self.project)?;
        require("access_token", &self.access_token)?;
        require("endpoint", &self.endpoint)?;
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "page_size",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Project id, also the ingestion root.
    pub fn project(&self) -> &str {
        &self.project
    }

    /// OAuth2 bearer token.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for SecretManagerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretManagerConfig")
            .field("project", &self.project)
            .field("access_token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("page_size", &self.page_size)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Builder for [`SecretManagerConfig`].
#[derive(Debug, Clone)]
pub struct SecretManagerConfigBuilder {
    config: SecretManagerConfig,
}

impl Default for SecretManagerConfigBuilder {
    fn default() -> Self {
        Self {
            config: SecretManagerConfig {
                project: String::new(),
                access_token: String::new(),
                endpoint: default_endpoint(),
                page_size: DEFAULT_PAGE_SIZE,
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
        }
    }
}

impl SecretManagerConfigBuilder {
    pub fn project(mut self, value: impl Into<String>) -> Self {
        self.config.project = value.into();
        self
    }

    pub fn access_token(mut self, value: impl Into<String>) -> Self {
        self.config.access_token = value.into();
        self
    }

    pub fn endpoint(mut self, value: impl Into<String>) -> Self {
        self.config.endpoint = value.into();
        self
    }

    pub fn page_size(mut self, value: u32) -> Self {
        self.config.page_size = value;
        self
    }

    pub fn timeout(mut self, value: Duration) -> Self {
        self.config.timeout_secs = value.as_secs().max(1);
        self
    }

    pub fn build(self) -> Result<SecretManagerConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Which certificate to load and how to unlock its private key.
#[derive(Clone, Deserialize)]
#[non_exhaustive]
pub struct IdentityConfig {
    #[serde(default)]
    msp_id: String,
    #[serde(default)]
    cert_name: String,
    #[serde(default)]
    key_password: Option<String>,
}

impl IdentityConfig {
    pub fn builder() -> IdentityConfigBuilder {
        IdentityConfigBuilder::default()
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        require("msp_id", &self.msp_id)?;
        require("cert_name", &self.cert_name)
    }

    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    /// Cache name of the enrollment certificate.
    pub fn cert_name(&self) -> &str {
        &self.cert_name
    }

    pub fn key_password(&self) -> Option<&[u8]> {
        self.key_password.as_deref().map(str::as_bytes)
    }
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("msp_id", &self.msp_id)
            .field("cert_name", &self.cert_name)
            .field(
                "key_password",
                &self.key_password.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Builder for [`IdentityConfig`].
#[derive(Debug, Clone, Default)]
pub struct IdentityConfigBuilder {
    config: IdentityConfig,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            msp_id: String::new(),
            cert_name: String::new(),
            key_password: None,
        }
    }
}

impl IdentityConfigBuilder {
    pub fn msp_id(mut self, value: impl Into<String>) -> Self {
        self.config.msp_id = value.into();
        self
    }

    pub fn cert_name(mut self, value: impl Into<String>) -> Self {
        self.config.cert_name = value.into();
        self
    }

    pub fn key_password(mut self, value: impl Into<String>) -> Self {
        self.config.key_password = Some(value.into());
        self
    }

    pub fn build(self) -> Result<IdentityConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
