//! Loading raw API descriptions.
//!
//! An [`ApiDescription`] is the untyped document exactly as published: the
//! ingestor turns it into the typed IR. Loading supports JSON and YAML, from
//! local files or `http(s)` URLs.
//!
//! # Examples
//!
//! ```no_run
//! use sdkgen_core::description::ApiDescription;
//! use sdkgen_core::error::Result;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let description = ApiDescription::from_file_or_url("openapi.json").await?;
//! if let Some(title) = description.title() {
//!     println!("API Title: {}", title);
//! }
//! # Ok(())
//! # }
//! ```

// Internal imports (std, crate)
use std::path::Path;

use crate::error::IngestError;

// External imports (alphabetized)
use serde_json::Value as JsonValue;
use tokio::fs;

/// A raw OpenAPI or Swagger document
#[derive(Debug, Clone, serde::Serialize)]
#[serde(transparent)]
pub struct ApiDescription {
    /// The raw JSON value of the document
    pub json: JsonValue,
}

impl ApiDescription {
    /// Load from a file or URL (supports both YAML and JSON)
    pub async fn from_file_or_url<P: AsRef<str>>(location: P) -> crate::Result<Self> {
        let location = location.as_ref();

        if location.starts_with("http://") || location.starts_with("https://") {
            return Self::from_url(location).await;
        }

        Self::from_file(location).await
    }

    /// Load from a file (supports both YAML and JSON)
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        log::debug!("Read {} bytes from {}", content.len(), path.display());
        Ok(Self::parse_content(&content)?)
    }

    /// Load from a URL (supports both YAML and JSON)
    pub async fn from_url(url: &str) -> crate::Result<Self> {
        let response = reqwest::get(url).await.map_err(|e| {
            crate::Error::openapi(format!("Failed to fetch OpenAPI spec from {}: {}", url, e))
        })?;

        if !response.status().is_success() {
            return Err(crate::Error::openapi(format!(
                "Failed to fetch OpenAPI spec from {}: HTTP {}",
                url,
                response.status()
            )));
        }

        let content = response.text().await.map_err(|e| {
            crate::Error::openapi(format!("Failed to read response from {}: {}", url, e))
        })?;

        Ok(Self::parse_content(&content)?)
    }

    /// Parse content as either JSON or YAML.
    ///
    /// A document that parses but is not a mapping at the top level is as
    /// unusable as one that does not parse at all.
    pub fn parse_content(content: &str) -> Result<Self, IngestError> {
        let json = match serde_json::from_str::<JsonValue>(content) {
            Ok(json) => json,
            Err(json_err) => serde_yaml::from_str::<JsonValue>(content).map_err(|yaml_err| {
                IngestError::malformed(
                    "#",
                    format!(
                        "content is neither valid JSON ({}) nor YAML ({})",
                        json_err, yaml_err
                    ),
                )
            })?,
        };

        if !json.is_object() {
            return Err(IngestError::malformed(
                "#",
                "top level of the document must be an object",
            ));
        }

        Ok(Self { json })
    }

    /// Get a reference to the raw JSON value
    pub fn as_json(&self) -> &JsonValue {
        &self.json
    }

    /// Get the title of the API
    pub fn title(&self) -> Option<&str> {
        self.json.get("info")?.get("title")?.as_str()
    }

    /// Get the declared version of the API
    pub fn version(&self) -> Option<&str> {
        self.json.get("info")?.get("version")?.as_str()
    }

    /// True for Swagger 2.0 documents, false for OpenAPI 3.x
    pub fn is_swagger2(&self) -> bool {
        self.json.get("swagger").is_some()
    }
}
