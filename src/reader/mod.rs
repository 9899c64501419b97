// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fetch collaborators for the backend content services
//!
//! The resolution engine talks to its backends through the [`Reader`]
//! seam; [`http::HttpContentReader`] is the production implementation.

pub mod config;
pub mod http;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::unroll::types::Content;

/// Fetched content keyed by identity
pub type ContentMap = HashMap<String, Content>;

/// Errors raised by the fetch collaborators
#[derive(Debug, Clone, Error)]
pub enum ReaderError {
    /// The backend could not be reached at the transport level
    #[error("request to {service} failed: {message}")]
    Unreachable { service: String, message: String },

    /// The backend answered with a non-success status
    #[error("request to {service} failed with status code {status}")]
    UpstreamStatus { service: String, status: u16 },

    /// The backend response could not be parsed into content
    #[error("error decoding response from {service}: {message}")]
    Decode { service: String, message: String },
}

/// Capability set the resolution engine consumes
///
/// Implementations must be safe for concurrent invocation by multiple
/// simultaneous resolution calls; retries and deadlines are their concern,
/// not the engine's.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Reader: Send + Sync {
    /// Batched fetch from the canonical published-content source
    async fn get(&self, identities: &[String], tid: &str) -> Result<ContentMap, ReaderError>;

    /// Batched fetch of the internal-only representation
    async fn get_internal(
        &self,
        identities: &[String],
        tid: &str,
    ) -> Result<ContentMap, ReaderError>;

    /// Per-item fetch through the native source plus transform step
    ///
    /// Items are fetched sequentially in the given order; the first
    /// per-item failure aborts the whole call.
    async fn get_native(
        &self,
        identities: &[String],
        tid: &str,
    ) -> Result<ContentMap, ReaderError>;
}

/// Routes batched reads through the native+transform path
///
/// Preview flavors resolve against content that has not reached the
/// published sources yet, so every read goes through [`Reader::get_native`].
pub struct NativeReader {
    inner: Arc<dyn Reader>,
}

impl NativeReader {
    pub fn new(inner: Arc<dyn Reader>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Reader for NativeReader {
    async fn get(&self, identities: &[String], tid: &str) -> Result<ContentMap, ReaderError> {
        self.inner.get_native(identities, tid).await
    }

    async fn get_internal(
        &self,
        identities: &[String],
        tid: &str,
    ) -> Result<ContentMap, ReaderError> {
        self.inner.get_native(identities, tid).await
    }

    async fn get_native(
        &self,
        identities: &[String],
        tid: &str,
    ) -> Result<ContentMap, ReaderError> {
        self.inner.get_native(identities, tid).await
    }
}
