// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Set member resolution
//!
//! Image sets carry an ordered `members` list of stubs whose identities are
//! fetched alongside the set itself; this module folds an already fetched
//! batch back onto those stubs.

use std::collections::HashMap;

use tracing::info;

use super::document;
use super::types::{Content, ID, MEMBERS};

/// Resolve the `members` list of a set against an already fetched batch
///
/// Produces a new list; neither the set nor the batch is mutated. Each
/// member stub whose identity is present in the batch is shallow-merged
/// with the fetched content (fetched fields win, stub-only fields survive);
/// a member missing from the batch keeps its bare stub. Members whose
/// identity cannot be extracted are skipped and logged.
///
/// Returns `None` when the set has no member list to resolve.
pub fn resolve_members(
    set: &Content,
    fetched: &HashMap<String, Content>,
    tid: &str,
    uuid: &str,
) -> Option<Vec<Content>> {
    let raw_members = document::get_array(set, MEMBERS)?;

    let mut resolved = Vec::with_capacity(raw_members.len());
    for member in raw_members {
        let Some(stub) = member.as_object() else {
            info!("tid={} uuid={} set member is not an object, skipping", tid, uuid);
            continue;
        };
        let Some(raw_id) = document::get_str(stub, ID) else {
            info!("tid={} uuid={} set member is missing the id field, skipping", tid, uuid);
            continue;
        };
        let Some(identity) = document::extract_identity(raw_id) else {
            info!(
                "tid={} uuid={} error while extracting identity from {}, skipping member",
                tid, uuid, raw_id
            );
            continue;
        };

        let mut merged = stub.clone();
        if let Some(content) = fetched.get(&identity) {
            document::merge_into(&mut merged, content);
        }
        resolved.push(merged);
    }

    Some(resolved)
}
