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

//! Crate-level error type.

use crate::cache::CacheError;
use crate::config::ConfigError;
use crate::identity::IdentityError;
use crate::ingest::IngestError;
use crate::keys::KeyError;
use crate::signing::SigningError;
use crate::store::StoreError;
use crate::suite::SuiteError;
use thiserror::Error;

/// Any failure surfaced by this crate.
///
/// Construction of a [`crate::Manager`] fails with one of these when no
/// usable signing identity can be assembled; callers should treat that as
/// fatal to startup.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Secret store error: {0}")]
    Store(#[from] StoreError),

    #[error("Ingestion error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Key error: {0}")]
    Key(#[from] KeyError),

    #[error("Signing error: {0}")]
    Signing(#[from] SigningError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Crypto suite error: {0}")]
    Suite(#[from] SuiteError),
}

pub type Result<T> = std::result::Result<T, Error>;
