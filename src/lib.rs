// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod monitoring;
pub mod reader;
pub mod unroll;

// Re-export main types
pub use reader::{
    config::ReaderConfig, http::HttpContentReader, ContentMap, NativeReader, Reader, ReaderError,
};
pub use unroll::{
    resolver::ContentResolver,
    types::{Content, UnrollError, UnrollEvent, UnrollResult},
};
