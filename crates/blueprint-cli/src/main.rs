//! Blueprint CLI - OSCAL project tool
//!
//! Reads a blueprint.toml project file together with the catalog and
//! component-definition JSON it names, then prints control views and
//! progress or writes the project's System Security Plan.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod check;
mod config;
mod error;
mod output;

use blueprint::catalog::{CatalogLoader, CatalogVersion, ImpactLevel};
use blueprint::observability::{self, LogFormat, ObservabilityConfig};
use blueprint::oscal::{Component, ComponentModel, OscalElement};
use blueprint::project::{ControlAggregator, NarrativeOverride};
use blueprint::ssp::{ssp_filename, SspAssembler};
use blueprint::SspConfig;
use serde::Serialize;

use config::ProjectFile;
use error::{CliError, Result};

/// Blueprint CLI - OSCAL catalogs, components and System Security Plans
#[derive(Parser)]
#[command(name = "blueprint")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to blueprint.toml project file
    #[arg(short, long, default_value = "blueprint.toml", global = true)]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format: pretty, json, compact
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the aggregated view of one control
    Control {
        /// Control id, e.g. ac-2
        control_id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Enable a component's narrative for this control (component uuid)
        #[arg(long, value_name = "UUID")]
        enable: Vec<String>,

        /// Disable a component's narrative for this control (component uuid)
        #[arg(long, value_name = "UUID")]
        disable: Vec<String>,
    },

    /// Show completion progress over the catalog
    Progress {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export the System Security Plan
    Ssp {
        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Print to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,
    },

    /// List attached components
    Components {
        /// Only components implementing this catalog version
        #[arg(long)]
        catalog_version: Option<CatalogVersion>,
    },

    /// Inspect a catalog file
    Catalog {
        /// Resolved-profile catalog JSON
        file: PathBuf,

        /// Catalog version: NIST_SP80053R4, NIST_SP80053R5
        #[arg(long)]
        catalog_version: CatalogVersion,

        /// Impact level: low, moderate, high
        #[arg(long, default_value = "moderate")]
        impact: ImpactLevel,

        /// Show one control instead of statistics
        control: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Strictly check a component-definition file
    Check {
        /// Component-definition JSON
        file: PathBuf,

        /// Also check control ids against this catalog
        #[arg(long, requires = "catalog_version")]
        catalog: Option<PathBuf>,

        /// Version of the catalog given with --catalog
        #[arg(long)]
        catalog_version: Option<CatalogVersion>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.log_format.as_deref()) {
        output::error(&e.to_string());
        return ExitCode::from(e.exit_code());
    }

    let result = match cli.command {
        Commands::Control {
            control_id,
            json,
            enable,
            disable,
        } => cmd_control(&cli.config, &control_id, json, &enable, &disable),

        Commands::Progress { json } => cmd_progress(&cli.config, json),

        Commands::Ssp { output, stdout } => cmd_ssp(&cli.config, &output, stdout),

        Commands::Components { catalog_version } => cmd_components(&cli.config, catalog_version),

        Commands::Catalog {
            file,
            catalog_version,
            impact,
            control,
            json,
        } => cmd_catalog(&file, catalog_version, impact, control.as_deref(), json),

        Commands::Check {
            file,
            catalog,
            catalog_version,
            json,
        } => cmd_check(&file, catalog.as_deref(), catalog_version, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            output::error(&e.to_string());
            ExitCode::from(e.exit_code())
        }
    }
}

/// Logs go to stderr; without a filter in the environment only warnings show
fn init_logging(verbose: bool, format: Option<&str>) -> Result<()> {
    let mut config = ObservabilityConfig::from_env();

    if let Some(format) = format {
        config.log_format = LogFormat::parse(format)
            .ok_or_else(|| CliError::invalid("--log-format", format!("unknown format '{format}'")))?;
    }
    if verbose {
        config.log_filter = "blueprint=debug,blueprint_cli=debug".to_string();
    } else if std::env::var_os("BLUEPRINT_LOG").is_none() && std::env::var_os("RUST_LOG").is_none() {
        config.log_filter = "warn".to_string();
    }

    observability::init(config)?;
    Ok(())
}

// =============================================================================
// Command Implementations
// =============================================================================

fn cmd_control(
    config_path: &Path,
    control_id: &str,
    json: bool,
    enable: &[String],
    disable: &[String],
) -> Result<()> {
    let file = ProjectFile::from_file(config_path)?;
    let catalog = file.load_catalog()?;
    let mut project = file.load_snapshot()?;

    let overrides = if enable.is_empty() && disable.is_empty() {
        Vec::new()
    } else {
        let enable: Vec<&str> = enable.iter().map(String::as_str).collect();
        let disable: Vec<&str> = disable.iter().map(String::as_str).collect();
        ControlAggregator::new(&project, &catalog)?.toggle_narratives(control_id, &enable, &disable)?
    };
    project.apply_overrides(&overrides);

    let view = ControlAggregator::new(&project, &catalog)?.view(control_id)?;

    if json && overrides.is_empty() {
        output::print_json(&view)?;
    } else if json {
        output::print_json(&serde_json::json!({ "view": view, "overrides": overrides }))?;
    } else {
        output::print_control_view(&view);
        if !overrides.is_empty() {
            print_overrides(config_path, &overrides)?;
        }
    }

    Ok(())
}

/// Print `[[narratives]]` entries for the user to persist
fn print_overrides(config_path: &Path, overrides: &[NarrativeOverride]) -> Result<()> {
    #[derive(Serialize)]
    struct Narratives<'a> {
        narratives: &'a [NarrativeOverride],
    }

    output::info(&format!("Add to {} to keep these settings:", config_path.display()));
    println!("{}", toml::to_string(&Narratives { narratives: overrides })?);
    Ok(())
}

fn cmd_progress(config_path: &Path, json: bool) -> Result<()> {
    let file = ProjectFile::from_file(config_path)?;
    let catalog = file.load_catalog()?;
    let project = file.load_snapshot()?;

    let progress = ControlAggregator::new(&project, &catalog)?.progress();

    if json {
        output::print_json(&progress)?;
    } else {
        output::print_progress(&progress);
    }

    Ok(())
}

fn cmd_ssp(config_path: &Path, output_dir: &Path, stdout: bool) -> Result<()> {
    let file = ProjectFile::from_file(config_path)?;
    let catalog = file.load_catalog()?;
    let project = file.load_snapshot()?;

    blueprint::config::init(file.ssp_config(&SspConfig::from_env()));
    let json = SspAssembler::new(blueprint::config::config()).to_json(&project, &catalog)?;

    if stdout {
        println!("{json}");
        return Ok(());
    }

    std::fs::create_dir_all(output_dir).map_err(|e| CliError::OutputDirCreation {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    let path = output_dir.join(ssp_filename(&project.title));
    std::fs::write(&path, &json).map_err(|e| CliError::FileWrite {
        path: path.clone(),
        source: e,
    })?;

    output::success(&format!(
        "Wrote {} ({} controls, {} components)",
        path.display(),
        project.controls.len(),
        project.components.len()
    ));
    Ok(())
}

fn cmd_components(config_path: &Path, version: Option<CatalogVersion>) -> Result<()> {
    let file = ProjectFile::from_file(config_path)?;
    let project = file.load_snapshot()?;

    let components: Vec<&Component> = project
        .components
        .iter()
        .map(|attached| &attached.component)
        .filter(|component| version.map_or(true, |v| component.get_control_implementation(v).is_ok()))
        .collect();

    output::print_components(&components);
    Ok(())
}

fn cmd_catalog(
    path: &Path,
    version: CatalogVersion,
    impact: ImpactLevel,
    control: Option<&str>,
    json: bool,
) -> Result<()> {
    let catalog = CatalogLoader::new(version, impact).from_file(path)?;

    match (control, json) {
        (Some(control_id), true) => output::print_json(catalog.control(control_id)?)?,
        (Some(control_id), false) => output::print_catalog_control(catalog.control(control_id)?),
        (None, true) => output::print_json(&catalog.stats())?,
        (None, false) => output::print_catalog_stats(&catalog.stats()),
    }

    Ok(())
}

fn cmd_check(path: &Path, catalog: Option<&Path>, version: Option<CatalogVersion>, json: bool) -> Result<()> {
    let model = ComponentModel::from_file(path).map_err(|source| CliError::ComponentFile {
        path: path.to_path_buf(),
        source,
    })?;

    let catalog = match (catalog, version) {
        (Some(catalog_path), Some(version)) => {
            Some(CatalogLoader::new(version, ImpactLevel::default()).from_file(catalog_path)?)
        }
        _ => None,
    };

    let result = check::check_definition(&model.component_definition, catalog.as_ref());

    if json {
        output::print_json(&result)?;
    } else {
        output::print_check_result(&result);
    }

    if !result.passed {
        return Err(CliError::CheckFailed {
            count: result.error_count,
        });
    }

    Ok(())
}
