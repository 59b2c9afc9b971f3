use std::time::Duration;

use anyhow::{Context, Result};

use crate::infra::config::AppConfig;

/// The two blocking clients the dashboard uses: a short-timeout one for list
/// and CRUD traffic, and a long-timeout one for CSV export. Dropping an
/// errored request tears down its connection, so a timed-out export does not
/// keep the socket alive.
pub struct ApiClients {
    pub list: reqwest::blocking::Client,
    pub export: reqwest::blocking::Client,
    pub base_url: String,
}

fn default_headers(config: &AppConfig) -> Result<reqwest::header::HeaderMap> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_static("leaddesk/0.1"),
    );
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json"),
    );
    if !config.api_token.trim().is_empty() {
        let mut value =
            reqwest::header::HeaderValue::from_str(&format!("Bearer {}", config.api_token.trim()))
                .context("api token contains characters not valid in a header")?;
        value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, value);
    }
    Ok(headers)
}

pub fn build_clients(config: &AppConfig) -> Result<ApiClients> {
    let headers = default_headers(config)?;

    let list = reqwest::blocking::Client::builder()
        .default_headers(headers.clone())
        .timeout(Duration::from_secs(config.timeout_seconds.max(1)))
        .build()
        .context("failed to build http client")?;

    let export = reqwest::blocking::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(config.export_timeout_seconds.max(1)))
        .build()
        .context("failed to build export http client")?;

    Ok(ApiClients {
        list,
        export,
        base_url: config.api_base_url.clone(),
    })
}
