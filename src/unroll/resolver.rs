// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Content resolution orchestration
//!
//! Drives the two unrolling entry points: image unrolling for the published
//! read path and internal-content unrolling for lead images and embedded
//! dynamic content. Both operate on a clone of the source document; the
//! caller's document is never mutated.

use std::sync::Arc;

use regex::Regex;
use serde_json::Value;
use tracing::{error, info};

use crate::reader::{ContentMap, Reader};

use super::document;
use super::extractor;
use super::members;
use super::schema::{ContentSchema, Slot};
use super::types::{
    Content, UnrollError, UnrollEvent, UnrollResult, ALT_IMAGES, BODY_XML, EMBEDS, IMAGE,
    LEAD_IMAGES, MAIN_IMAGE, MEMBERS, PROMOTIONAL_IMAGE,
};

/// Type filter for embedded dynamic content in internal unrolling
const DYNAMIC_CONTENT_TYPE: &str = "^http://ontology\\.example\\.com/content/DynamicContent";

/// Resolves embedded references of a document into fully expanded content
pub struct ContentResolver {
    reader: Arc<dyn Reader>,
    whitelist: Regex,
    dynamic_filter: Regex,
    api_host: String,
}

impl ContentResolver {
    /// Create a resolver over a fetch collaborator
    ///
    /// `whitelist` selects which embedded reference types are expanded
    /// during image unrolling; `api_host` anchors the reconstructed stubs
    /// for references the backend no longer knows.
    pub fn new(reader: Arc<dyn Reader>, whitelist: Regex, api_host: String) -> Self {
        let dynamic_filter =
            Regex::new(DYNAMIC_CONTENT_TYPE).expect("dynamic content filter must compile");
        Self {
            reader,
            whitelist,
            dynamic_filter,
            api_host,
        }
    }

    /// Unroll the main image, embedded images and promotional image of a
    /// document
    ///
    /// Returns the enriched clone, or the untouched source document paired
    /// with an error when the batched fetch fails. A document with nothing
    /// to expand passes through unchanged.
    pub async fn unroll_images(&self, event: UnrollEvent) -> UnrollResult {
        let mut cc = event.content.clone();
        let mut schema = ContentSchema::new();

        let mut found_main = false;
        match document::get_object(&cc, MAIN_IMAGE) {
            Some(main) => match document::identity_of(main) {
                Some(identity) => {
                    schema.put(Slot::MainImage, identity);
                    found_main = true;
                }
                None => info!(
                    "tid={} uuid={} cannot extract main image identity, skipping main image expansion",
                    event.tid, event.uuid
                ),
            },
            None => info!(
                "tid={} uuid={} cannot find main image, skipping main image expansion",
                event.tid, event.uuid
            ),
        }

        let embedded =
            self.extract_embedded_by_type(&cc, &self.whitelist, &event.tid, &event.uuid);
        let found_embedded = !embedded.is_empty();
        if found_embedded {
            schema.put_all(Slot::Embeds, embedded);
        }

        let mut found_promo = false;
        if let Some(alt_images) = document::get_object(&cc, ALT_IMAGES) {
            match document::get_object(alt_images, PROMOTIONAL_IMAGE) {
                Some(promo) => match document::identity_of(promo) {
                    Some(identity) => {
                        schema.put(Slot::PromotionalImage, identity);
                        found_promo = true;
                    }
                    None => info!(
                        "tid={} uuid={} cannot extract promotional image identity, skipping promotional image expansion",
                        event.tid, event.uuid
                    ),
                },
                None => info!(
                    "tid={} uuid={} cannot find promotional image, skipping promotional image expansion",
                    event.tid, event.uuid
                ),
            }
        }

        if !found_main && !found_embedded && !found_promo {
            info!(
                "tid={} uuid={} no main image, body images or promotional image to expand",
                event.tid, event.uuid
            );
            return UnrollResult {
                content: cc,
                error: None,
            };
        }

        let mut fetched = match self.reader.get(&schema.to_batch(), &event.tid).await {
            Ok(batch) => batch,
            Err(err) => {
                return UnrollResult {
                    content: event.content,
                    error: Some(UnrollError::ImageFetch {
                        uuid: event.uuid,
                        source: err,
                    }),
                };
            }
        };

        self.resolve_sets(&schema, &mut fetched, &event.tid, &event.uuid);

        if found_main {
            if let Some(main) = schema
                .get(Slot::MainImage)
                .and_then(|identity| fetched.get(identity))
            {
                cc.insert(MAIN_IMAGE.to_string(), Value::Object(main.clone()));
            }
        }

        if found_embedded {
            let embedded: Vec<Value> = schema
                .get_all(Slot::Embeds)
                .iter()
                .filter_map(|identity| fetched.get(identity))
                .cloned()
                .map(Value::Object)
                .collect();
            cc.insert(EMBEDS.to_string(), Value::Array(embedded));
        }

        if found_promo {
            let promo = schema
                .get(Slot::PromotionalImage)
                .and_then(|identity| fetched.get(identity))
                .cloned();
            if let Some(promo) = promo {
                if let Some(Value::Object(alt_images)) = cc.get_mut(ALT_IMAGES) {
                    alt_images.insert(PROMOTIONAL_IMAGE.to_string(), Value::Object(promo));
                }
            }
        }

        UnrollResult {
            content: cc,
            error: None,
        }
    }

    /// Unroll lead images and embedded dynamic content
    ///
    /// Always succeeds: a failed backend call abandons expansion of the
    /// affected slot, is logged, and leaves that slot exactly as supplied.
    pub async fn unroll_internal_content(&self, event: UnrollEvent) -> UnrollResult {
        let mut cc = event.content.clone();

        if let Some(expanded) = self.unroll_lead_images(&cc, &event.tid, &event.uuid).await {
            cc.insert(LEAD_IMAGES.to_string(), Value::Array(expanded));
        }

        if let Some(embedded) = self
            .unroll_embedded_dynamic_content(&cc, &event.tid, &event.uuid)
            .await
        {
            cc.insert(EMBEDS.to_string(), Value::Array(embedded));
        }

        UnrollResult {
            content: cc,
            error: None,
        }
    }

    async fn unroll_lead_images(
        &self,
        cc: &Content,
        tid: &str,
        uuid: &str,
    ) -> Option<Vec<Value>> {
        let images = match document::get_array(cc, LEAD_IMAGES) {
            Some(images) if !images.is_empty() => images,
            _ => {
                info!("tid={} uuid={} no lead images to expand for supplied content", tid, uuid);
                return None;
            }
        };

        // Identity per stub position; a stub whose identity cannot be
        // extracted stays in the output untouched.
        let identities: Vec<Option<String>> = images
            .iter()
            .map(|item| {
                let identity = item.as_object().and_then(document::identity_of);
                if identity.is_none() {
                    info!(
                        "tid={} uuid={} cannot extract identity for lead image, leaving stub as supplied",
                        tid, uuid
                    );
                }
                identity
            })
            .collect();

        let mut schema = ContentSchema::new();
        schema.put_all(
            Slot::LeadImages,
            identities.iter().flatten().cloned().collect(),
        );
        if schema.is_empty() {
            return None;
        }

        let fetched = match self.reader.get(schema.get_all(Slot::LeadImages), tid).await {
            Ok(batch) => batch,
            Err(err) => {
                error!(
                    "tid={} uuid={} error while getting content for expanded lead images: {}",
                    tid, uuid, err
                );
                return None;
            }
        };

        let mut expanded = Vec::with_capacity(images.len());
        for (item, identity) in images.iter().zip(identities) {
            let Some(stub) = item.as_object() else {
                expanded.push(item.clone());
                continue;
            };
            let mut entry = stub.clone();
            if let Some(identity) = identity {
                match fetched.get(&identity) {
                    Some(image) => {
                        entry.insert(IMAGE.to_string(), Value::Object(image.clone()));
                    }
                    None => info!(
                        "tid={} uuid={} missing image model {}, returning only the id",
                        tid, uuid, identity
                    ),
                }
            }
            expanded.push(Value::Object(entry));
        }

        Some(expanded)
    }

    async fn unroll_embedded_dynamic_content(
        &self,
        cc: &Content,
        tid: &str,
        uuid: &str,
    ) -> Option<Vec<Value>> {
        let identities = self.extract_embedded_by_type(cc, &self.dynamic_filter, tid, uuid);
        if identities.is_empty() {
            return None;
        }

        let fetched = match self.reader.get_internal(&identities, tid).await {
            Ok(batch) => batch,
            Err(err) => {
                error!(
                    "tid={} uuid={} error while getting embedded dynamic content: {}",
                    tid, uuid, err
                );
                return None;
            }
        };

        let embedded: Vec<Value> = identities
            .iter()
            .filter_map(|identity| fetched.get(identity))
            .cloned()
            .map(Value::Object)
            .collect();
        Some(embedded)
    }

    /// Reconcile set-shaped results with the fetched batch
    ///
    /// Every set-level identity recorded for the main image or embeds slot
    /// must be answerable after this pass: identities the fetch did not
    /// return are substituted with a minimal stub, and the members of the
    /// sets that were returned are resolved against the batch.
    fn resolve_sets(
        &self,
        schema: &ContentSchema,
        fetched: &mut ContentMap,
        tid: &str,
        uuid: &str,
    ) {
        let mut set_identities: Vec<String> = Vec::new();
        if let Some(main) = schema.get(Slot::MainImage) {
            set_identities.push(main.to_string());
        }
        set_identities.extend(schema.get_all(Slot::Embeds).iter().cloned());

        for identity in set_identities {
            if !fetched.contains_key(&identity) {
                info!(
                    "tid={} uuid={} content {} not returned by the batch, substituting stub",
                    tid, uuid, identity
                );
                fetched.insert(
                    identity.clone(),
                    document::minimal_stub(&self.api_host, &identity),
                );
                continue;
            }

            let resolved = fetched
                .get(&identity)
                .and_then(|set| members::resolve_members(set, fetched, tid, uuid));
            if let Some(resolved) = resolved {
                if let Some(set) = fetched.get_mut(&identity) {
                    set.insert(
                        MEMBERS.to_string(),
                        Value::Array(resolved.into_iter().map(Value::Object).collect()),
                    );
                }
            }
        }
    }

    fn extract_embedded_by_type(
        &self,
        cc: &Content,
        type_filter: &Regex,
        tid: &str,
        uuid: &str,
    ) -> Vec<String> {
        let Some(body) = document::get_str(cc, BODY_XML) else {
            info!(
                "tid={} uuid={} missing body, skipping embedded content expansion",
                tid, uuid
            );
            return Vec::new();
        };

        match extractor::extract_embedded(body, type_filter) {
            Ok(identities) => identities,
            Err(err) => {
                error!("tid={} uuid={} cannot parse body: {}", tid, uuid, err);
                Vec::new()
            }
        }
    }
}
