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

//! Security audit logging.
//!
//! This module provides structured audit events for:
//! - Secret ingestion (start, completion, failures, per-secret outcome)
//! - Signing identity construction
//! - Signature rejection
//!
//! Payloads are never logged, only names, sizes and reasons.

use std::time::Duration;

/// Event types for audit records.
pub mod events {
    /// Ingestion started event type.
    pub const INGEST_STARTED: &str = "ingest.started";
    /// Ingestion completed event type.
    pub const INGEST_COMPLETED: &str = "ingest.completed";
    /// Ingestion aborted event type.
    pub const INGEST_FAILED: &str = "ingest.failed";

    /// Secret stored in the cache event type.
    pub const SECRET_STORED: &str = "secret.stored";
    /// Secret skipped event type.
    pub const SECRET_SKIPPED: &str = "secret.skipped";

    /// Signing identity created event type.
    pub const IDENTITY_CREATED: &str = "identity.created";
    /// Signing identity construction failure event type.
    pub const IDENTITY_FAILED: &str = "identity.failed";

    /// Signature rejected during verification event type.
    pub const SIGNATURE_REJECTED: &str = "signature.rejected";
}

/// Log the start of an ingestion run.
pub fn log_ingest_started(backend: &str, root: &str) {
    tracing::info!(
        event_type = events::INGEST_STARTED,
        backend = %backend,
        root = %root,
        "Secret ingestion started"
    );
}

/// Log a completed ingestion run.
pub fn log_ingest_completed(
    backend: &str,
    root: &str,
    stored: usize,
    skipped: usize,
    elapsed: Duration,
) {
    tracing::info!(
        event_type = events::INGEST_COMPLETED,
        backend = %backend,
        root = %root,
        stored = stored,
        skipped = skipped,
        elapsed_ms = elapsed.as_millis() as u64,
        "Secret ingestion completed"
    );
}

/// Log an ingestion run aborted by a fatal store error.
pub fn log_ingest_failed(backend: &str, path: &str, reason: &str) {
    tracing::error!(
        event_type = events::INGEST_FAILED,
        backend = %backend,
        path = %path,
        reason = %reason,
        "Secret ingestion failed"
    );
}

/// Log a secret written to the cache.
pub fn log_secret_stored(path: &str, cache_key: &str, size: usize) {
    tracing::debug!(
        event_type = events::SECRET_STORED,
        path = %path,
        cache_key = %cache_key,
        size = size,
        "Secret stored"
    );
}

/// Log a secret skipped because it is missing or not readable.
pub fn log_secret_skipped(path: &str, reason: &str) {
    tracing::warn!(
        event_type = events::SECRET_SKIPPED,
        path = %path,
        reason = %reason,
        "Secret skipped"
    );
}

/// Log a signing identity becoming ready.
pub fn log_identity_created(msp_id: &str, cert_name: &str, ski: &str) {
    tracing::info!(
        event_type = events::IDENTITY_CREATED,
        msp_id = %msp_id,
        cert_name = %cert_name,
        ski = %ski,
        "Signing identity created"
    );
}

/// Log a failed signing identity construction.
pub fn log_identity_failed(msp_id: &str, cert_name: &str, reason: &str) {
    tracing::error!(
        event_type = events::IDENTITY_FAILED,
        msp_id = %msp_id,
        cert_name = %cert_name,
        reason = %reason,
        "Signing identity construction failed"
    );
}

/// Log a signature rejected as malformed or non-canonical.
pub fn log_signature_rejected(msp_id: &str, reason: &str) {
    tracing::warn!(
        event_type = events::SIGNATURE_REJECTED,
        msp_id = %msp_id,
        reason = %reason,
        "Signature rejected"
    );
}
