use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde_json::json;

use crate::config::HoverConfig;
use crate::driver::{Selection, THEME_SECTION, run_checks};
use crate::error::{CheckError, Result};
use crate::report::RunSummary;
use crate::util::{OutputIntegration, output_for};

#[derive(Debug, Parser)]
#[command(
    name = "hover_doctor",
    about = "Structural hover-contrast and menu paint-routing checks for desktop themes",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the theme contrast checks and the source audit.
    Check(CheckArgs),

    /// Run only the theme contrast checks.
    Themes(CheckArgs),

    /// Run only the paint-routing source audit.
    Audit(CheckArgs),

    /// Print the configured markers and the forbidden call.
    #[command(name = "list-markers")]
    ListMarkers(ConfigArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Root of the host application checkout.
    #[arg(long = "project-dir", default_value = ".")]
    pub project_dir: PathBuf,

    /// JSON configuration file; missing fields keep their defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long = "theme-dir")]
    pub theme_dir: Option<PathBuf>,

    #[arg(long = "source-root")]
    pub source_root: Option<PathBuf>,

    #[arg(long = "paint-source")]
    pub paint_source: Option<PathBuf>,

    #[arg(long = "fixup-source")]
    pub fixup_source: Option<PathBuf>,

    #[arg(long = "raw-threshold")]
    pub raw_threshold: Option<u32>,

    #[arg(long = "fixed-threshold")]
    pub fixed_threshold: Option<u32>,
}

impl ConfigArgs {
    /// Load the config file (if any) and apply command-line overrides.
    pub fn resolve(&self) -> Result<HoverConfig> {
        let mut config = match &self.config {
            Some(path) => HoverConfig::load(path)?,
            None => HoverConfig::default(),
        };

        if let Some(dir) = &self.theme_dir {
            config.layout.theme_dir.clone_from(dir);
        }
        if let Some(root) = &self.source_root {
            config.layout.source_root.clone_from(root);
        }
        if let Some(path) = &self.paint_source {
            config.layout.paint_source.clone_from(path);
        }
        if let Some(path) = &self.fixup_source {
            config.layout.fixup_source.clone_from(path);
        }
        if let Some(threshold) = self.raw_threshold {
            config.policy.raw_threshold = threshold;
        }
        if let Some(threshold) = self.fixed_threshold {
            config.policy.fixed_threshold = threshold;
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Also write a JSON summary of every check to this path.
    #[arg(long = "summary-json")]
    pub summary_json: Option<PathBuf>,
}

pub fn run_from_env() -> Result<i32> {
    let cli = Cli::parse();
    run(cli)
}

/// Dispatch a parsed command line. Returns the process exit status.
pub fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Check(args) => run_selected(&args, Selection::ALL),
        Commands::Themes(args) => run_selected(&args, Selection::THEMES),
        Commands::Audit(args) => run_selected(&args, Selection::AUDIT),
        Commands::ListMarkers(args) => {
            print_markers(&args.resolve()?);
            Ok(0)
        }
    }
}

fn run_selected(args: &CheckArgs, selection: Selection) -> Result<i32> {
    let config = args.config.resolve()?;
    let stdout = std::io::stdout();
    let summary = match run_checks(&config, &args.config.project_dir, selection, stdout.lock()) {
        Ok(summary) => summary,
        Err(error @ CheckError::NoThemesFound { .. }) => {
            if let Some(path) = &args.summary_json {
                RunSummary::aborted(THEME_SECTION, error.to_string()).write_json(path)?;
            }
            return Err(error);
        }
        Err(error) => return Err(error),
    };
    if let Some(path) = &args.summary_json {
        summary.write_json(path)?;
    }
    Ok(summary.exit_code())
}

fn print_markers(config: &HoverConfig) {
    let integration = OutputIntegration::detect();
    if integration.should_emit_json() {
        println!(
            "{}",
            json!({
                "markers": config.markers,
                "forbidden": config.forbidden,
                "fixup_markers": config.fixup_markers,
            })
        );
        return;
    }

    let ui = output_for(&integration);
    ui.rule(Some("paint-routing markers"));
    for marker in &config.markers {
        println!("{}\t{}", marker.label, marker.pattern);
    }
    ui.rule(Some("forbidden call"));
    println!(
        "{}\ton {}",
        config.forbidden.call,
        config.forbidden.receivers.join(", ")
    );
    ui.rule(Some("fixup markers"));
    for literal in &config.fixup_markers {
        println!("{literal}");
    }
    if config.markers.is_empty() {
        ui.warning("no paint-routing markers configured");
    }
}
