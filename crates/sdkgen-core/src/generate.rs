//! Generation runs.
//!
//! A run ingests the API description once and then hands the same immutable
//! [`ApiSchema`] to every configured backend. Each backend renders on tokio's
//! blocking pool; a failing backend is recorded in the [`GenerationReport`]
//! and never stops its siblings.

use std::fmt::Write as _;
use std::sync::Arc;

use futures::future::join_all;
use tokio::task;

use crate::config::{IngestOptions, ProjectConfig, TargetConfig};
use crate::description::ApiDescription;
use crate::emit::{emitter_for, Artifact};
use crate::error::{EmitError, IngestError};
use crate::ingest::ingest;
use crate::schema::ApiSchema;
use crate::target::TargetKind;

/// What one target produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetOutcome {
    pub target: TargetKind,
    pub output_directory: String,
    pub result: Result<Vec<Artifact>, EmitError>,
}

impl TargetOutcome {
    /// Rendered artifacts; empty when the target failed
    pub fn artifacts(&self) -> &[Artifact] {
        self.result.as_deref().unwrap_or(&[])
    }

    pub fn error(&self) -> Option<&EmitError> {
        self.result.as_ref().err()
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Result of one generation run, in configured target order
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// Version stamped on every package
    pub version: String,
    /// The IR every target rendered from
    pub schema: Arc<ApiSchema>,
    pub outcomes: Vec<TargetOutcome>,
}

impl GenerationReport {
    pub fn artifact_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.artifacts().len()).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &EmitError> {
        self.outcomes.iter().filter_map(TargetOutcome::error)
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(TargetOutcome::is_success)
    }

    pub fn outcome(&self, target: TargetKind) -> Option<&TargetOutcome> {
        self.outcomes.iter().find(|o| o.target == target)
    }

    /// One line per target plus a totals line
    pub fn summary(&self) -> String {
        let succeeded = self.outcomes.iter().filter(|o| o.is_success()).count();
        let mut out = format!(
            "version {}: {} of {} targets succeeded, {} artifacts\n",
            self.version,
            succeeded,
            self.outcomes.len(),
            self.artifact_count()
        );
        for outcome in &self.outcomes {
            let _ = match &outcome.result {
                Ok(artifacts) => writeln!(
                    out,
                    "  ok    {:<10} {:>3} files -> {}",
                    outcome.target,
                    artifacts.len(),
                    outcome.output_directory
                ),
                Err(err) => writeln!(out, "  FAIL  {:<10} {}", outcome.target, err),
            };
        }
        out
    }
}

/// Ingest `description` once and run every target against the result.
///
/// Only ingestion can fail the whole run; backend failures are recorded per
/// target in the returned report.
pub async fn generate(
    description: &ApiDescription,
    options: &IngestOptions,
    targets: &[TargetConfig],
) -> Result<GenerationReport, IngestError> {
    let schema = Arc::new(ingest(description, options)?);

    let runs = targets.iter().cloned().map(|config| {
        let schema = Arc::clone(&schema);
        async move {
            let target = config.target;
            let output_directory = config.output_directory.clone();
            let result = task::spawn_blocking(move || emitter_for(target).emit(&schema, &config))
                .await
                .unwrap_or_else(|e| {
                    Err(EmitError::Aborted {
                        target,
                        reason: e.to_string(),
                    })
                });
            match &result {
                Ok(artifacts) => log::info!("{}: rendered {} artifacts", target, artifacts.len()),
                Err(err) => log::error!("{}", err),
            }
            TargetOutcome {
                target,
                output_directory,
                result,
            }
        }
    });
    let outcomes = join_all(runs).await;

    Ok(GenerationReport {
        version: schema.version.clone(),
        schema,
        outcomes,
    })
}

/// Load the description a project names and generate its targets
pub async fn generate_project(config: &ProjectConfig) -> crate::Result<GenerationReport> {
    log::info!(
        "{}: loading API description from {}",
        config.project_name,
        config.description_location
    );
    let description = ApiDescription::from_file_or_url(&config.description_location).await?;
    let targets = config.selected_targets(&[]);
    Ok(generate(&description, &config.ingest, &targets).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const DESCRIPTION: &str = r##"{
        "openapi": "3.0.1",
        "info": { "title": "Billing", "version": "2.1" },
        "paths": {
            "/invoices/{id}": {
                "get": {
                    "operationId": "getInvoice",
                    "parameters": [
                        { "name": "id", "in": "path", "required": true, "schema": { "type": "integer" } }
                    ],
                    "responses": {
                        "200": {
                            "description": "ok",
                            "content": {
                                "application/json": { "schema": { "$ref": "#/components/schemas/Invoice" } }
                            }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Invoice": {
                    "type": "object",
                    "required": ["amount"],
                    "properties": {
                        "id": { "type": "integer", "readOnly": true },
                        "amount": { "type": "number" }
                    }
                }
            }
        }
    }"##;

    fn description() -> ApiDescription {
        ApiDescription::parse_content(DESCRIPTION).unwrap()
    }

    #[tokio::test]
    async fn test_failing_target_does_not_stop_siblings() {
        let targets = vec![
            TargetConfig::new(TargetKind::Python, "sdk/python", "class"),
            TargetConfig::new(TargetKind::TypeScript, "sdk/ts", "billing-sdk"),
            TargetConfig::new(TargetKind::Markdown, "docs", "models"),
        ];
        let report = generate(&description(), &IngestOptions::default(), &targets)
            .await
            .unwrap();

        assert_eq!(report.version, "2.1.0");
        assert_eq!(report.outcomes.len(), 3);
        assert!(!report.is_success());
        assert_eq!(
            report.failures().collect::<Vec<_>>(),
            vec![&EmitError::ReservedIdentifier {
                target: TargetKind::Python,
                identifier: "class".into()
            }]
        );
        let ts = report.outcome(TargetKind::TypeScript).unwrap();
        assert!(ts.artifacts().iter().any(|a| a.name == "src/models/Invoice.ts"));
        let docs = report.outcome(TargetKind::Markdown).unwrap();
        assert_eq!(docs.artifacts()[0].name, "invoice.md");
        assert!(report.summary().contains("2 of 3 targets succeeded"));
    }

    #[tokio::test]
    async fn test_ingest_failure_aborts_run() {
        let broken = ApiDescription::parse_content(r#"{"swagger": "1.2"}"#).unwrap();
        let targets = vec![TargetConfig::new(TargetKind::Markdown, "docs", "models")];
        let err = generate(&broken, &IngestOptions::default(), &targets)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::MalformedDescription { .. }));
    }

    #[tokio::test]
    async fn test_generate_project_from_file() -> crate::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("openapi.json");
        tokio::fs::write(&path, DESCRIPTION).await?;

        let mut config = ProjectConfig::new("billing", path.to_string_lossy());
        config.ingest.version = Some("5.0.0".into());
        config
            .targets
            .push(TargetConfig::new(TargetKind::Ruby, "sdk/ruby", "billing_sdk"));

        let report = generate_project(&config).await?;
        assert!(report.is_success());
        assert_eq!(report.version, "5.0.0");
        assert_eq!(report.schema.endpoints.len(), 1);
        Ok(())
    }
}
