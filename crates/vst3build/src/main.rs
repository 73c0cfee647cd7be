//! vst3build CLI - JUCE VST3 plugin build tool

use clap::Parser;
use miette::Result;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use vst3build::commands;

/// vst3build - build, install and package a JUCE VST3 plugin
#[derive(Debug, Parser)]
#[command(name = "vst3build")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Project root directory (the one holding the .jucer file)
    #[arg(short, long)]
    project: Option<String>,

    #[command(flatten)]
    build: commands::build::BuildArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let project_root = if let Some(ref path) = cli.project {
        camino::Utf8PathBuf::from(path)
    } else {
        std::env::current_dir()
            .ok()
            .and_then(|p| camino::Utf8PathBuf::try_from(p).ok())
            .unwrap_or_else(|| camino::Utf8PathBuf::from("."))
    };

    commands::build::run(&project_root, cli.build)
}
