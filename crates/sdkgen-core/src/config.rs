//! Project configuration for sdkgen.
//!
//! A [`ProjectConfig`] names the API description to ingest, the ingestion
//! conventions, every target to generate, and optionally the documentation
//! host to publish model docs to. It can be loaded from YAML or TOML
//! (chosen by file extension), created programmatically, or scaffolded with
//! [`ProjectConfig::template`].
//!
//! # Examples
//!
//! ```no_run
//! use sdkgen_core::config::{ProjectConfig, TargetConfig};
//! use sdkgen_core::target::TargetKind;
//!
//! let mut config = ProjectConfig::new("billing", "https://example.com/swagger.json");
//! config.targets.push(TargetConfig::new(TargetKind::Python, "sdk/python", "billing_sdk"));
//!
//! # async fn load() -> sdkgen_core::Result<()> {
//! let config = ProjectConfig::from_file("sdkgen.yaml").await?;
//! # Ok(())
//! # }
//! ```

// Internal imports (std, crate)
use std::path::Path;

use crate::target::TargetKind;
use crate::utils::Casing;

// External imports (alphabetized)
use serde::{Deserialize, Deserializer, Serialize};
use serde_value::Value as SerdeValue;
use tokio::fs;
use url::Url;

/// Conventions the ingestor applies while building the IR
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestOptions {
    /// Version to stamp on the schema instead of `info.version`
    #[serde(default)]
    pub version: Option<String>,

    /// Name suffixes marking paginated envelope types, e.g. `FetchResult`
    #[serde(default = "default_envelope_suffixes", deserialize_with = "string_or_list")]
    pub envelope_suffixes: Vec<String>,

    /// Field names whose array-of-model value is the payload of an envelope
    #[serde(default, deserialize_with = "string_or_list")]
    pub envelope_fields: Vec<String>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            version: None,
            envelope_suffixes: default_envelope_suffixes(),
            envelope_fields: Vec::new(),
        }
    }
}

fn default_envelope_suffixes() -> Vec<String> {
    vec!["FetchResult".to_string()]
}

/// Casing and pluralization rules for one target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConvention {
    /// Casing for emitted field and parameter names; each language has a default
    #[serde(default)]
    pub member_case: Option<Casing>,

    /// Casing for emitted file names; each language has a default
    #[serde(default)]
    pub file_case: Option<Casing>,

    /// Pluralize resource client names (`InvoicesClient` rather than `InvoiceClient`)
    #[serde(default)]
    pub pluralize_clients: bool,
}

/// Layout of generated model documentation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocFormat {
    /// Sectioned bullet list, one heading per field
    #[default]
    List,
    /// Single table of all fields
    Table,
}

/// A named API root the generated clients can be pointed at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
    pub url: Url,
}

impl Environment {
    pub fn new(name: impl Into<String>, url: Url) -> Self {
        Self {
            name: name.into(),
            url,
        }
    }
}

/// Configuration for one generation target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Which backend to run
    pub target: TargetKind,

    /// Where the artifacts of this target are written
    pub output_directory: String,

    /// Namespace, package, or module name of the generated library
    pub package_identifier: String,

    /// Only used by the markdown target
    #[serde(default)]
    pub doc_format: DocFormat,

    #[serde(default)]
    pub naming: NamingConvention,

    /// Replaces the project environments for this target when non-empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environments: Vec<Environment>,
}

impl TargetConfig {
    pub fn new(
        target: TargetKind,
        output_directory: impl Into<String>,
        package_identifier: impl Into<String>,
    ) -> Self {
        Self {
            target,
            output_directory: output_directory.into(),
            package_identifier: package_identifier.into(),
            naming: NamingConvention::default(),
            doc_format: DocFormat::default(),
            environments: Vec::new(),
        }
    }
}

/// Documentation host settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadmeConfig {
    /// API key; when absent the CLI reads `SDKGEN_README_API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,

    /// Category id new model documents are filed under
    pub model_category: String,

    #[serde(default)]
    pub format: DocFormat,

    /// Documentation host API root; defaults to the public readme.com dashboard
    #[serde(default)]
    pub base_url: Option<Url>,
}

/// Configuration for a whole sdkgen project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name
    pub project_name: String,

    /// Path or URL of the OpenAPI/Swagger document
    pub description_location: String,

    #[serde(default)]
    pub ingest: IngestOptions,

    /// API roots shared by every source target, in declared order
    #[serde(default)]
    pub environments: Vec<Environment>,

    #[serde(default)]
    pub targets: Vec<TargetConfig>,

    #[serde(default)]
    pub readme: Option<ReadmeConfig>,
}

impl ProjectConfig {
    /// Create a new ProjectConfig without targets
    pub fn new(project_name: impl Into<String>, description_location: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            description_location: description_location.into(),
            ingest: IngestOptions::default(),
            environments: Vec::new(),
            targets: Vec::new(),
            readme: None,
        }
    }

    /// A starter project with every target configured
    pub fn template(project_name: &str) -> crate::Result<Self> {
        use crate::utils::{to_snake_case, to_upper_camel_case};

        let snake = to_snake_case(project_name);
        let mut config = Self::new(project_name, "https://example.com/swagger/v1/swagger.json");
        config.targets = TargetKind::all()
            .map(|kind| {
                let package = match kind {
                    TargetKind::CSharp => format!("{}.Sdk", to_upper_camel_case(project_name)),
                    TargetKind::Java => format!("com.example.{}", snake.replace('_', "")),
                    TargetKind::TypeScript => format!("{}-sdk", snake.replace('_', "-")),
                    TargetKind::Python | TargetKind::Ruby => format!("{}_sdk", snake),
                    TargetKind::Markdown => "models".to_string(),
                };
                TargetConfig::new(kind, format!("sdk/{}", kind.as_str()), package)
            })
            .collect();
        config.environments = vec![
            Environment::new("production", Url::parse("https://api.example.com")?),
            Environment::new("sandbox", Url::parse("https://sandbox.api.example.com")?),
        ];
        config.readme = Some(ReadmeConfig {
            api_key: None,
            model_category: String::new(),
            format: DocFormat::List,
            base_url: None,
        });
        Ok(config)
    }

    /// Load configuration from a `.yaml`/`.yml` or `.toml` file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let config = if is_toml(path) {
            toml::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        Ok(config)
    }

    /// Save configuration to a file, format chosen by extension
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let path = path.as_ref();
        let content = if is_toml(path) {
            toml::to_string_pretty(self)?
        } else {
            serde_yaml::to_string(self)?
        };
        fs::write(path, content).await?;
        Ok(())
    }

    /// Targets restricted to the given kinds; an empty filter keeps all.
    /// Targets without their own environments inherit the project's.
    pub fn selected_targets(&self, only: &[TargetKind]) -> Vec<TargetConfig> {
        self.targets
            .iter()
            .filter(|t| only.is_empty() || only.contains(&t.target))
            .map(|t| {
                let mut target = t.clone();
                if target.environments.is_empty() {
                    target.environments = self.environments.clone();
                }
                target
            })
            .collect()
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("toml")
}

/// Accept either a single string or a list of strings
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = SerdeValue::deserialize(deserializer)?;

    match value {
        SerdeValue::String(s) => Ok(vec![s]),
        SerdeValue::Seq(seq) => {
            let mut result = Vec::new();
            for item in seq {
                if let SerdeValue::String(s) = item {
                    result.push(s);
                } else {
                    return Err(serde::de::Error::custom(
                        "Expected string or array of strings",
                    ));
                }
            }
            Ok(result)
        }
        SerdeValue::Unit | SerdeValue::Option(None) => Ok(Vec::new()),
        _ => Err(serde::de::Error::custom(
            "Expected string or array of strings",
        )),
    }
}
