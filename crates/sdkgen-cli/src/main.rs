//! sdkgen CLI entrypoint
//! Parses command-line arguments and dispatches to the core generator.

// Internal imports (std, crate)
use std::path::{Path, PathBuf};

// External imports (alphabetized)
use anyhow::{bail, Context};
use clap::Parser;
use dialoguer::Confirm;
use sdkgen_core::ingest::ingest;
use sdkgen_core::output::write_report;
use sdkgen_core::readme::{publish_models, ReadmeClient};
use sdkgen_core::{ApiDescription, ProjectConfig, TargetKind};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable read when the project names no documentation API key
const API_KEY_ENV: &str = "SDKGEN_README_API_KEY";

#[derive(Parser)]
#[command(name = "sdkgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate SDKs and model docs for a project
    Generate {
        /// Project file (YAML or TOML)
        #[arg(long)]
        project: PathBuf,
        /// Do not upload model documentation even when configured
        #[arg(long)]
        skip_upload: bool,
        /// Only generate these targets (repeatable)
        #[arg(long = "target", value_enum)]
        targets: Vec<TargetKind>,
        /// Directory output paths are relative to (default: the project file's directory)
        #[arg(long)]
        output_root: Option<PathBuf>,
    },
    /// Ingest the API description and report what would be generated
    Check {
        /// Project file (YAML or TOML)
        #[arg(long)]
        project: PathBuf,
    },
    /// Write a starter project file
    New {
        /// Project name
        name: String,
        /// Where to write the project file
        #[arg(long, default_value = "sdkgen.yaml")]
        path: PathBuf,
        /// Overwrite an existing file without asking
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let succeeded = match cli.command {
        Commands::Generate {
            project,
            skip_upload,
            targets,
            output_root,
        } => run_generate(&project, skip_upload, &targets, output_root).await?,
        Commands::Check { project } => run_check(&project).await?,
        Commands::New { name, path, force } => run_new(&name, &path, force).await?,
    };
    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}

async fn run_generate(
    project: &Path,
    skip_upload: bool,
    only: &[TargetKind],
    output_root: Option<PathBuf>,
) -> anyhow::Result<bool> {
    let (config, description) = load_project(project).await?;
    let targets = config.selected_targets(only);
    if targets.is_empty() {
        bail!("No targets selected in {}", project.display());
    }

    let report = sdkgen_core::generate(&description, &config.ingest, &targets)
        .await
        .context("Failed to ingest API description")?;

    let root = output_root.unwrap_or_else(|| project_dir(project));
    let written = write_report(&report, &root)
        .await
        .with_context(|| format!("Failed to write artifacts under {}", root.display()))?;
    info!(
        targets = written.targets,
        files = written.files,
        skipped = written.skipped,
        "Artifacts written"
    );
    print!("{}", report.summary());

    let mut succeeded = report.is_success();
    match &config.readme {
        Some(_) if skip_upload => info!("Skipping documentation upload"),
        Some(readme) => {
            let key = readme
                .api_key
                .clone()
                .or_else(|| std::env::var(API_KEY_ENV).ok());
            let client = ReadmeClient::from_config(readme, key).with_context(|| {
                format!("Set readme.api_key in the project or {}", API_KEY_ENV)
            })?;
            let uploaded =
                publish_models(&client, &report.schema, &readme.model_category, readme.format)
                    .await;
            println!(
                "docs: {} created, {} updated, {} failed",
                uploaded.created, uploaded.updated, uploaded.failed
            );
            succeeded &= uploaded.failed == 0;
        }
        None => {}
    }
    Ok(succeeded)
}

async fn run_check(project: &Path) -> anyhow::Result<bool> {
    let (config, description) = load_project(project).await?;
    let schema = ingest(&description, &config.ingest).context("Failed to ingest API description")?;
    println!(
        "{} {}: {} models ({} documented), {} endpoints",
        schema.title.as_deref().unwrap_or(&config.project_name),
        schema.version,
        schema.schemas.len(),
        schema.documented_schemas().count(),
        schema.endpoints.len()
    );
    for target in &config.targets {
        println!(
            "  {:<10} {} -> {}",
            target.target, target.package_identifier, target.output_directory
        );
    }
    Ok(true)
}

async fn run_new(name: &str, path: &Path, force: bool) -> anyhow::Result<bool> {
    if path.exists() && !force {
        let overwrite = Confirm::new()
            .with_prompt(format!("{} exists. Overwrite?", path.display()))
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if !overwrite {
            warn!("Left {} unchanged", path.display());
            return Ok(true);
        }
    }
    ProjectConfig::template(name)?
        .save(path)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(true)
}

async fn load_project(project: &Path) -> anyhow::Result<(ProjectConfig, ApiDescription)> {
    let config = ProjectConfig::from_file(project)
        .await
        .with_context(|| format!("Failed to load project {}", project.display()))?;
    let location = resolve_location(&config.description_location, &project_dir(project));
    info!(location = %location, "Loading API description");
    let description = ApiDescription::from_file_or_url(&location)
        .await
        .with_context(|| format!("Failed to load API description from {}", location))?;
    Ok((config, description))
}

fn project_dir(project: &Path) -> PathBuf {
    project
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Relative description paths are taken relative to the project file
fn resolve_location(location: &str, base: &Path) -> String {
    if location.starts_with("http://") || location.starts_with("https://") {
        return location.to_string();
    }
    let path = Path::new(location);
    if path.is_absolute() {
        location.to_string()
    } else {
        base.join(path).to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_arguments() {
        let cli = Cli::try_parse_from([
            "sdkgen",
            "generate",
            "--project",
            "api/sdkgen.yaml",
            "--target",
            "python",
            "--target",
            "csharp",
            "--skip-upload",
        ])
        .unwrap();
        match cli.command {
            Commands::Generate {
                project,
                skip_upload,
                targets,
                output_root,
            } => {
                assert_eq!(project, PathBuf::from("api/sdkgen.yaml"));
                assert!(skip_upload);
                assert_eq!(targets, vec![TargetKind::Python, TargetKind::CSharp]);
                assert!(output_root.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_resolve_location() {
        let base = Path::new("/work/api");
        assert_eq!(
            resolve_location("https://example.com/swagger.json", base),
            "https://example.com/swagger.json"
        );
        assert_eq!(resolve_location("/abs/openapi.yaml", base), "/abs/openapi.yaml");
        assert_eq!(
            resolve_location("openapi.yaml", base),
            "/work/api/openapi.yaml"
        );
        assert_eq!(project_dir(Path::new("sdkgen.yaml")), PathBuf::from("."));
    }

    #[tokio::test]
    async fn test_new_writes_loadable_project() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("billing.yaml");
        assert!(run_new("billing", &path, true).await?);

        let config = ProjectConfig::from_file(&path).await?;
        assert_eq!(config.project_name, "billing");
        assert_eq!(config.targets.len(), 6);
        assert_eq!(config.environments.len(), 2);
        Ok(())
    }
}
