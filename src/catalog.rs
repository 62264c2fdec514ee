//! Technology catalog: one GET to the catalog endpoint, one directory per item.

use crate::config::HarvestConfig;
use crate::error::{HarvestError, Result};
use crate::records::TechnologyStore;
use crate::utils::{ensure_directory, id_string};
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde_json::Value;
use url::Url;

/// One technology item of the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub category: String,
    pub id: String,
    pub title: String,
}

/// HTTP client for the catalog endpoint, dressed up as the portal's own XHR
pub struct CatalogClient {
    client: reqwest::Client,
    catalog_url: String,
}

impl CatalogClient {
    pub fn new(config: &HarvestConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .default_headers(browser_headers(&config.catalog_url)?)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| HarvestError::Catalog(e.to_string()))?;

        Ok(Self {
            client,
            catalog_url: config.catalog_url.clone(),
        })
    }

    /// Fetches and parses the catalog, keeping category and item order
    pub async fn fetch(&self) -> Result<Vec<CatalogEntry>> {
        ::log::info!("Fetching technology catalog from {}", self.catalog_url);

        let response = self
            .client
            .get(&self.catalog_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| HarvestError::Catalog(e.to_string()))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| HarvestError::Catalog(format!("invalid JSON: {e}")))?;

        parse_catalog(&body)
    }
}

/// Header set the portal's single-page app sends with its catalog request
fn browser_headers(catalog_url: &str) -> Result<HeaderMap> {
    let origin = Url::parse(catalog_url)
        .map_err(|e| HarvestError::Config(format!("catalog_url: {e}")))?
        .origin()
        .ascii_serialization();
    let referer = HeaderValue::from_str(&format!("{origin}/"))
        .map_err(|e| HarvestError::Config(format!("catalog_url: {e}")))?;

    let mut headers = HeaderMap::new();
    headers.insert("sec-ch-ua-platform", HeaderValue::from_static("\"macOS\""));
    headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert("sec-ch-ua-mobile", HeaderValue::from_static("?0"));
    headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("cors"));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("empty"));
    headers.insert(header::REFERER, referer);
    headers.insert("priority", HeaderValue::from_static("u=1, i"));
    Ok(headers)
}

/// Parses `{category: [{id, title}, ...], ...}`
pub fn parse_catalog(body: &Value) -> Result<Vec<CatalogEntry>> {
    let categories = body
        .as_object()
        .ok_or_else(|| HarvestError::Catalog("expected an object of categories".into()))?;

    let mut entries = Vec::new();
    for (category, items) in categories {
        let items = items.as_array().ok_or_else(|| {
            HarvestError::Catalog(format!("category {category:?} is not a list"))
        })?;

        for item in items {
            let id = item.get("id").and_then(id_string).ok_or_else(|| {
                HarvestError::Catalog(format!("item without id in {category:?}"))
            })?;
            let title = item
                .get("title")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    HarvestError::Catalog(format!("item {id} without title in {category:?}"))
                })?;

            entries.push(CatalogEntry {
                category: category.clone(),
                id,
                title: title.to_string(),
            });
        }
    }

    Ok(entries)
}

/// Fetches the catalog, creates `<output_dir>/<category>/<title>` for every
/// item and returns the store of technologies with empty resource lists
pub async fn fetch_technology_catalog(config: &HarvestConfig) -> Result<TechnologyStore> {
    let entries = CatalogClient::new(config)?.fetch().await?;
    build_store(config, &entries)
}

pub(crate) fn build_store(config: &HarvestConfig, entries: &[CatalogEntry]) -> Result<TechnologyStore> {
    let mut store = TechnologyStore::new();
    for entry in entries {
        let directory = ensure_directory(&config.output_dir, &[&entry.category, &entry.title])?;
        store.insert(entry.id.clone(), directory);
    }

    ::log::info!(
        "Catalog lists {} technologies in {} entries",
        store.len(),
        entries.len()
    );
    Ok(store)
}
