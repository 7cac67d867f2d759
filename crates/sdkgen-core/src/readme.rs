//! Publishing model documentation to a readme.com documentation host.
//!
//! Uploads are an idempotent upsert keyed by the document slug: an existing
//! document keeps its `hidden` flag (only a person makes a page visible) and
//! has everything else overwritten; a missing one is created hidden.

use std::future::Future;

use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{DocFormat, ReadmeConfig};
use crate::emit::markdown::{doc_slug, render_model};
use crate::error::{Error, Result};
use crate::schema::ApiSchema;

/// API root used when the configuration names none
pub const DEFAULT_BASE_URL: &str = "https://dash.readme.com";

/// A documentation page as the host stores it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadmeDoc {
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub order: u32,
}

/// The three requests an upsert needs
pub trait DocsHost: Sync {
    /// The document under `slug`, or `None` when it does not exist
    fn fetch(&self, slug: &str) -> impl Future<Output = Result<Option<ReadmeDoc>>> + Send;

    fn update(&self, slug: &str, doc: &ReadmeDoc) -> impl Future<Output = Result<()>> + Send;

    fn create(&self, doc: &ReadmeDoc) -> impl Future<Output = Result<()>> + Send;
}

/// [`DocsHost`] over the readme.com v1 docs API
#[derive(Debug, Clone)]
pub struct ReadmeClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl ReadmeClient {
    pub fn new(api_key: impl Into<String>, base_url: Option<Url>) -> Result<Self> {
        let base_url = match base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)
                .map_err(|e| Error::config(format!("invalid documentation host URL: {}", e)))?,
        };
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            api_key: api_key.into(),
        })
    }

    /// Build a client from project settings; `api_key` wins over the configured key
    pub fn from_config(config: &ReadmeConfig, api_key: Option<String>) -> Result<Self> {
        let key = api_key
            .or_else(|| config.api_key.clone())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::config("no documentation host API key configured"))?;
        Self::new(key, config.base_url.clone())
    }

    fn docs_url(&self, slug: Option<&str>) -> Result<Url> {
        let path = match slug {
            Some(slug) => format!("/api/v1/docs/{}", slug),
            None => "/api/v1/docs".to_string(),
        };
        self.base_url
            .join(&path)
            .map_err(|e| Error::config(format!("invalid document path '{}': {}", path, e)))
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .basic_auth(&self.api_key, None::<&str>)
            .header(ACCEPT, "application/json")
    }
}

impl DocsHost for ReadmeClient {
    async fn fetch(&self, slug: &str) -> Result<Option<ReadmeDoc>> {
        let response = self
            .request(reqwest::Method::GET, self.docs_url(Some(slug))?)
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => Err(Error::upload(format!("GET {}: HTTP {}", slug, status))),
        }
    }

    async fn update(&self, slug: &str, doc: &ReadmeDoc) -> Result<()> {
        let response = self
            .request(reqwest::Method::PUT, self.docs_url(Some(slug))?)
            .json(doc)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::upload(format!("PUT {}: HTTP {}", slug, response.status())));
        }
        Ok(())
    }

    async fn create(&self, doc: &ReadmeDoc) -> Result<()> {
        let response = self
            .request(reqwest::Method::POST, self.docs_url(None)?)
            .json(doc)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::upload(format!(
                "POST {}: HTTP {}",
                doc.title,
                response.status()
            )));
        }
        Ok(())
    }
}

/// Tally of one publishing pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
}

enum Upsert {
    Created,
    Updated,
}

/// Upload one page per documented model, in declared order.
///
/// Page order starts at 1 and advances for every model, uploaded or not. A
/// failed upload is logged and counted; the remaining models still go out.
pub async fn publish_models<H: DocsHost>(
    host: &H,
    schema: &ApiSchema,
    category: &str,
    format: DocFormat,
) -> UploadSummary {
    let mut summary = UploadSummary::default();
    for (index, item) in schema.documented_schemas().enumerate() {
        let slug = doc_slug(&item.name);
        let doc = ReadmeDoc {
            hidden: true,
            title: item.name.clone(),
            body: render_model(schema, item, format),
            category: category.to_string(),
            order: index as u32 + 1,
        };
        match upsert(host, &slug, doc).await {
            Ok(Upsert::Created) => {
                log::info!("Created {}", slug);
                summary.created += 1;
            }
            Ok(Upsert::Updated) => {
                log::info!("Updated {}", slug);
                summary.updated += 1;
            }
            Err(err) => {
                log::warn!("Upload of {} failed: {}", item.name, err);
                summary.failed += 1;
            }
        }
    }
    summary
}

async fn upsert<H: DocsHost>(host: &H, slug: &str, mut doc: ReadmeDoc) -> Result<Upsert> {
    match host.fetch(slug).await? {
        Some(existing) => {
            doc.hidden = existing.hidden;
            host.update(slug, &doc).await?;
            Ok(Upsert::Updated)
        }
        None => {
            host.create(&doc).await?;
            Ok(Upsert::Created)
        }
    }
}
