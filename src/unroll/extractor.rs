// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Embedded reference extraction from body markup
//!
//! Articles reference embeddable content through `<content>` tags inside
//! their body markup; each tag declares the referenced item's content type
//! and carries its `id` URL in a `url` attribute.

use regex::Regex;
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::debug;

use super::document;

const REFERENCE_TAG: &str = "content";
const TYPE_ATTR: &str = "type";
const URL_ATTR: &str = "url";

/// Errors raised while scanning body markup
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The reference selector could not be built
    #[error("cannot build reference selector: {0}")]
    Selector(String),
}

/// Scan body markup for embedded references whose declared type matches
/// `type_filter`
///
/// Returns the identity of each matching reference in document order.
/// Duplicates are possible and are not deduplicated here. References whose
/// URL does not carry a valid identity are skipped.
pub fn extract_embedded(body: &str, type_filter: &Regex) -> Result<Vec<String>, ExtractError> {
    let fragment = Html::parse_fragment(body);
    let selector = Selector::parse(REFERENCE_TAG)
        .map_err(|err| ExtractError::Selector(err.to_string()))?;

    let mut identities = Vec::new();
    for element in fragment.select(&selector) {
        let matches = element
            .value()
            .attr(TYPE_ATTR)
            .map(|declared| type_filter.is_match(declared))
            .unwrap_or(false);
        if !matches {
            continue;
        }

        let Some(raw) = element.value().attr(URL_ATTR) else {
            debug!("embedded reference without a url attribute, skipping");
            continue;
        };
        match document::extract_identity(raw) {
            Some(identity) => identities.push(identity),
            None => debug!("embedded reference with unparseable identity {}, skipping", raw),
        }
    }

    Ok(identities)
}
