// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for content unrolling

use serde_json::{Map, Value};
use thiserror::Error;

use crate::reader::ReaderError;

/// A content document: a weakly typed mapping from field name to JSON value.
///
/// Articles, images, image sets and dynamic-content items all share this
/// shape; fields of interest are accessed by the well-known keys below.
pub type Content = Map<String, Value>;

pub const ID: &str = "id";
pub const BODY_XML: &str = "bodyXML";
pub const MAIN_IMAGE: &str = "mainImage";
pub const ALT_IMAGES: &str = "alternativeImages";
pub const PROMOTIONAL_IMAGE: &str = "promotionalImage";
pub const LEAD_IMAGES: &str = "leadImages";
pub const MEMBERS: &str = "members";
pub const EMBEDS: &str = "embeds";
pub const IMAGE: &str = "image";

/// One unrolling request
#[derive(Debug, Clone)]
pub struct UnrollEvent {
    /// The source document; never mutated by a resolution call
    pub content: Content,
    /// Transaction id carried on every backend request and log line
    pub tid: String,
    /// Identity of the document itself, for logging
    pub uuid: String,
}

/// Outcome of an unrolling call
///
/// `content` is always present: the enriched clone on success, the
/// untouched source document when `error` is set.
#[derive(Debug)]
pub struct UnrollResult {
    pub content: Content,
    pub error: Option<UnrollError>,
}

/// Errors surfaced to callers of image unrolling
///
/// Internal-content unrolling swallows its fetch failures and never
/// produces one of these.
#[derive(Debug, Error)]
pub enum UnrollError {
    /// The batched fetch of expanded images failed
    #[error("error while getting expanded images for uuid {uuid}: {source}")]
    ImageFetch {
        /// Identity of the document being unrolled
        uuid: String,
        #[source]
        source: ReaderError,
    },
}
