//! Writing generated artifacts to disk.

use std::path::{Component, Path, PathBuf};

use tokio::fs;

use crate::error::{Error, Result};
use crate::generate::GenerationReport;

/// Counts of what [`write_report`] put on disk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub targets: usize,
    pub files: usize,
    /// Targets skipped because their backend failed
    pub skipped: usize,
}

/// Write every succeeded target's artifacts under `root/<output_directory>`.
///
/// Failed targets are skipped, so a partially succeeded run still leaves
/// every good target on disk.
pub async fn write_report(report: &GenerationReport, root: &Path) -> Result<WriteSummary> {
    let mut summary = WriteSummary::default();
    for outcome in &report.outcomes {
        let Ok(artifacts) = &outcome.result else {
            summary.skipped += 1;
            continue;
        };
        let directory = root.join(&outcome.output_directory);
        for artifact in artifacts {
            let path = artifact_path(&directory, &artifact.name)?;
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&path, &artifact.content).await?;
            log::debug!("Wrote {}", path.display());
        }
        log::info!(
            "{}: wrote {} files to {}",
            outcome.target,
            artifacts.len(),
            directory.display()
        );
        summary.targets += 1;
        summary.files += artifacts.len();
    }
    Ok(summary)
}

/// Artifact names are relative and must stay inside the target directory
fn artifact_path(directory: &Path, name: &str) -> Result<PathBuf> {
    let relative = Path::new(name);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes || name.is_empty() {
        return Err(Error::config(format!(
            "artifact '{}' would be written outside {}",
            name,
            directory.display()
        )));
    }
    Ok(directory.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::Artifact;
    use crate::error::EmitError;
    use crate::generate::TargetOutcome;
    use crate::schema::ApiSchema;
    use crate::target::TargetKind;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn report(outcomes: Vec<TargetOutcome>) -> GenerationReport {
        GenerationReport {
            version: "1.0.0".into(),
            schema: Arc::new(ApiSchema::default()),
            outcomes,
        }
    }

    #[tokio::test]
    async fn test_writes_only_succeeded_targets() -> Result<()> {
        let dir = tempdir()?;
        let report = report(vec![
            TargetOutcome {
                target: TargetKind::Markdown,
                output_directory: "docs".into(),
                result: Ok(vec![
                    Artifact::new("invoice.md", "# Invoice\n"),
                    Artifact::new("nested/line.md", "# Line\n"),
                ]),
            },
            TargetOutcome {
                target: TargetKind::Python,
                output_directory: "sdk/python".into(),
                result: Err(EmitError::ReservedIdentifier {
                    target: TargetKind::Python,
                    identifier: "import".into(),
                }),
            },
        ]);

        let summary = write_report(&report, dir.path()).await?;
        assert_eq!(
            summary,
            WriteSummary {
                targets: 1,
                files: 2,
                skipped: 1
            }
        );
        let written = fs::read_to_string(dir.path().join("docs/nested/line.md")).await?;
        assert_eq!(written, "# Line\n");
        assert!(!dir.path().join("sdk/python").exists());
        Ok(())
    }

    #[test]
    fn test_rejects_escaping_names() {
        let root = Path::new("/tmp/out");
        assert!(artifact_path(root, "../etc/passwd").is_err());
        assert!(artifact_path(root, "/etc/passwd").is_err());
        assert_eq!(
            artifact_path(root, "src/index.ts").unwrap(),
            PathBuf::from("/tmp/out/src/index.ts")
        );
    }
}
