//! Build command implementation
//!
//! This module provides the CLI interface for building the plugin.

use camino::Utf8Path;
use clap::Args;
use miette::{IntoDiagnostic, Result};
use std::io::{BufRead, Write};

use crate::config::{BuildConfig, Config};
use crate::descriptor::ProjectDescriptor;
use crate::pipeline::{BuildOptions, Pipeline};
use crate::platform::Platform;

/// Arguments for the build command
#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Build config, defaults to "Release"
    #[arg(short, long, value_enum)]
    pub config: Option<BuildConfig>,

    /// Copy the .vst3 plugin to the default VST3 directory
    /// ("%CommonProgramW6432%\VST3" on Windows, "/Library/Audio/Plug-Ins/VST3" on macOS)
    #[arg(short = 'C', long)]
    pub copy_to_vst3_dir: bool,

    /// Archive the plugin as a versioned zip file in the "dist" folder
    #[arg(short, long)]
    pub distribute: bool,

    /// Exporter tag from the EXPORTFORMATS section of the .jucer file. If not
    /// set, the first exporter for the current platform is used (VS on
    /// Windows, XCODE_MAC on macOS)
    #[arg(short, long)]
    pub exporter: Option<String>,

    /// Build for this platform instead of the detected one
    #[arg(long, value_enum)]
    pub platform: Option<Platform>,

    /// Dry run - show what would be built, copied and archived
    #[arg(long)]
    pub dry_run: bool,

    /// List the exporters defined in the .jucer file and exit
    #[arg(long)]
    pub list_exporters: bool,

    /// Distribute non-release builds without asking
    #[arg(short, long)]
    pub yes: bool,
}

impl BuildArgs {
    /// Merge command-line flags over the project configuration
    fn to_options(&self, config: &Config) -> BuildOptions {
        BuildOptions {
            config: self.config.unwrap_or(config.build.config),
            exporter: self.exporter.clone().or_else(|| config.build.exporter.clone()),
            copy_to_vst3_dir: self.copy_to_vst3_dir,
            distribute: self.distribute,
            dry_run: self.dry_run,
        }
    }
}

/// Run the build command
pub fn run(project_root: &Utf8Path, args: BuildArgs) -> Result<()> {
    let config = Config::load(project_root)?;
    let options = args.to_options(&config);

    if !args.yes && !args.list_exporters && !validate(&options)? {
        return Ok(());
    }

    let project = ProjectDescriptor::discover(project_root)?;

    if args.list_exporters {
        print_exporters(&project);
        return Ok(());
    }

    let platform = match args.platform {
        Some(platform) => platform,
        None => Platform::detect()?,
    };

    let report = Pipeline::new(project_root, &config, &project, platform).run(&options)?;

    if let Some(installed) = report.installed {
        tracing::info!("Installed {}", installed);
    }
    if let Some(archive) = report.archive {
        tracing::info!("Distribution archive: {}", archive);
    }

    Ok(())
}

/// Ask before distributing a non-release build; `false` means the user declined
fn validate(options: &BuildOptions) -> Result<bool> {
    if options.config.is_release() || !options.distribute {
        return Ok(true);
    }

    let stdin = std::io::stdin();
    let confirmed = confirm_distribution(options.config, &mut stdin.lock(), &mut std::io::stderr())
        .into_diagnostic()?;

    if !confirmed {
        tracing::info!("Canceled.");
    }
    Ok(confirmed)
}

/// Prompt on `output` and read the answer from `input`. Only "y"/"Y" confirms.
pub fn confirm_distribution(
    config: BuildConfig,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> std::io::Result<bool> {
    write!(output, "Attempt to distribute as {} build. Continue? (y/n)", config)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

fn print_exporters(project: &ProjectDescriptor) {
    println!("{} v{} ({})", project.name, project.version, project.path);
    if project.exporters.is_empty() {
        println!("  (no exporters)");
    }
    for exporter in &project.exporters {
        println!(
            "  - {} -> {}",
            exporter.tag,
            exporter.target_folder.as_deref().unwrap_or("(no target folder)")
        );
    }
}
