// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP implementation of the fetch collaborator
//!
//! Talks to the published, internal, native and transform backends over
//! reqwest, propagating the transaction id on every request.

use async_trait::async_trait;
use reqwest::header;
use reqwest::Client;
use tracing::warn;
use uuid::Uuid;

use crate::unroll::document;
use crate::unroll::types::{Content, MEMBERS};

use super::config::ReaderConfig;
use super::{ContentMap, Reader, ReaderError};

const USER_AGENT_VALUE: &str = "content-unroller/1.0";
const TRANSACTION_ID_HEADER: &str = "X-Request-Id";
const UUID_FIELD: &str = "uuid";

/// Reader backed by the HTTP content services
pub struct HttpContentReader {
    client: Client,
    config: ReaderConfig,
}

impl HttpContentReader {
    pub fn new(client: Client, config: ReaderConfig) -> Self {
        Self { client, config }
    }

    /// Batched GET against a list-shaped endpoint
    ///
    /// Identities that are not valid UUIDs are dropped from the query.
    async fn do_get(
        &self,
        identities: &[String],
        tid: &str,
        url: &str,
        service: &str,
    ) -> Result<Vec<Content>, ReaderError> {
        let query: Vec<(&str, &String)> = identities
            .iter()
            .filter(|identity| Uuid::parse_str(identity).is_ok())
            .map(|identity| ("uuid", identity))
            .collect();

        let response = self
            .client
            .get(url)
            .header(TRANSACTION_ID_HEADER, tid)
            .header(header::USER_AGENT, USER_AGENT_VALUE)
            .query(&query)
            .send()
            .await
            .map_err(|err| ReaderError::Unreachable {
                service: service.to_string(),
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReaderError::UpstreamStatus {
                service: service.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<Vec<Content>>()
            .await
            .map_err(|err| ReaderError::Decode {
                service: service.to_string(),
                message: err.to_string(),
            })
    }

    async fn do_get_native(&self, identity: &str, tid: &str) -> Result<Vec<u8>, ReaderError> {
        let url = format!("{}{}", self.config.native_source_url, identity);
        let service = &self.config.native_source_name;

        let response = self
            .client
            .get(&url)
            .header(TRANSACTION_ID_HEADER, tid)
            .header(header::USER_AGENT, USER_AGENT_VALUE)
            .header(
                header::AUTHORIZATION,
                format!("Basic {}", self.config.native_source_auth),
            )
            .send()
            .await
            .map_err(|err| ReaderError::Unreachable {
                service: service.clone(),
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReaderError::UpstreamStatus {
                service: service.clone(),
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|err| ReaderError::Unreachable {
                service: service.clone(),
                message: err.to_string(),
            })
    }

    async fn do_transform(&self, payload: Vec<u8>, tid: &str) -> Result<Content, ReaderError> {
        let service = &self.config.transform_source_name;

        let response = self
            .client
            .post(&self.config.transform_source_url)
            .header(TRANSACTION_ID_HEADER, tid)
            .header(header::USER_AGENT, USER_AGENT_VALUE)
            .header(header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|err| ReaderError::Unreachable {
                service: service.clone(),
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReaderError::UpstreamStatus {
                service: service.clone(),
                status: status.as_u16(),
            });
        }

        response
            .json::<Content>()
            .await
            .map_err(|err| ReaderError::Decode {
                service: service.clone(),
                message: err.to_string(),
            })
    }
}

#[async_trait]
impl Reader for HttpContentReader {
    async fn get(&self, identities: &[String], tid: &str) -> Result<ContentMap, ReaderError> {
        let batch = self
            .do_get(
                identities,
                tid,
                &self.config.content_source_url,
                &self.config.content_source_name,
            )
            .await?;

        let mut content_map = ContentMap::new();
        let mut member_identities = Vec::new();
        for item in batch {
            if item.contains_key(MEMBERS) {
                member_identities.extend(collect_member_identities(&item));
            }
            add_item(&mut content_map, item);
        }

        if member_identities.is_empty() {
            return Ok(content_map);
        }

        // Second batch: the member models referenced by the sets above
        let models = self
            .do_get(
                &member_identities,
                tid,
                &self.config.content_source_url,
                &self.config.content_source_name,
            )
            .await?;
        for item in models {
            add_item(&mut content_map, item);
        }

        Ok(content_map)
    }

    async fn get_internal(
        &self,
        identities: &[String],
        tid: &str,
    ) -> Result<ContentMap, ReaderError> {
        let batch = self
            .do_get(
                identities,
                tid,
                &self.config.internal_source_url,
                &self.config.internal_source_name,
            )
            .await?;

        let mut content_map = ContentMap::new();
        for item in batch {
            let uuid = document::get_str(&item, UUID_FIELD).map(str::to_string);
            match uuid {
                Some(uuid) => {
                    content_map.insert(uuid, item);
                }
                None => warn!("tid={} cannot extract uuid for internal content item, skipping", tid),
            }
        }

        Ok(content_map)
    }

    async fn get_native(
        &self,
        identities: &[String],
        tid: &str,
    ) -> Result<ContentMap, ReaderError> {
        let mut content_map = ContentMap::new();
        for identity in identities {
            let native = self.do_get_native(identity, tid).await?;
            let transformed = self.do_transform(native, tid).await?;
            content_map.insert(identity.clone(), transformed);
        }
        Ok(content_map)
    }
}

/// Key a fetched item by the identity carried in its `id` field
///
/// Items without an extractable identity cannot be addressed by the
/// resolution engine and are dropped.
fn add_item(content_map: &mut ContentMap, item: Content) {
    match document::identity_of(&item) {
        Some(identity) => {
            content_map.insert(identity, item);
        }
        None => warn!("fetched item without an extractable identity, dropping"),
    }
}

/// Collect the member identities of a set-shaped item
fn collect_member_identities(set: &Content) -> Vec<String> {
    let Some(members) = document::get_array(set, MEMBERS) else {
        return Vec::new();
    };

    members
        .iter()
        .filter_map(|member| member.as_object())
        .filter_map(document::identity_of)
        .collect()
}
