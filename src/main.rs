// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use content_unroller::{
    api::{start_server, AppState},
    monitoring::{BackendCheck, HealthService},
    reader::{config::ReaderConfig, http::HttpContentReader, NativeReader},
    unroll::resolver::ContentResolver,
};
use regex::Regex;
use std::{env, sync::Arc, time::Duration};

/// Embedded reference types expanded during image unrolling
const DEFAULT_CONTENT_TYPE_WHITELIST: &str =
    "^http://ontology\\.example\\.com/content/(ImageSet|DynamicContent)$";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    // Parse environment variables for configuration
    let api_port = env::var("APP_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()
        .unwrap_or(8080);
    let api_host = env::var("API_HOST").unwrap_or_else(|_| "http://api.example.com".to_string());
    let whitelist_pattern = env::var("CONTENT_TYPE_WHITELIST")
        .unwrap_or_else(|_| DEFAULT_CONTENT_TYPE_WHITELIST.to_string());
    let whitelist = Regex::new(&whitelist_pattern)?;

    let reader_config = ReaderConfig::from_env();
    reader_config
        .validate()
        .map_err(|message| anyhow::anyhow!(message))?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let reader = Arc::new(HttpContentReader::new(client.clone(), reader_config.clone()));
    let resolver = Arc::new(ContentResolver::new(
        reader.clone(),
        whitelist.clone(),
        api_host.clone(),
    ));
    let preview_reader = Arc::new(NativeReader::new(reader));
    let preview_resolver = Arc::new(ContentResolver::new(preview_reader, whitelist, api_host));

    let health = Arc::new(HealthService::new(
        client,
        vec![
            BackendCheck::for_source(
                &reader_config.content_source_name,
                &reader_config.content_source_url,
            ),
            BackendCheck::for_source(
                &reader_config.internal_source_name,
                &reader_config.internal_source_url,
            ),
            BackendCheck::for_source(
                &reader_config.native_source_name,
                &reader_config.native_source_url,
            ),
            BackendCheck::for_source(
                &reader_config.transform_source_name,
                &reader_config.transform_source_url,
            ),
        ],
    ));

    println!("🚀 Starting content-unroller on port {}...", api_port);

    start_server(
        AppState {
            resolver,
            preview_resolver,
            health,
        },
        api_port,
    )
    .await
    .map_err(|err| anyhow::anyhow!("{}", err))?;

    Ok(())
}
