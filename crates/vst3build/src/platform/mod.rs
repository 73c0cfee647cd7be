//! Platform build drivers
//!
//! This module provides one driver per supported host:
//! - Windows: Visual Studio exporters built with MSBuild
//! - macOS: Xcode exporters built with xcodebuild
//!
//! [`Platform`] is selected once at startup and dispatches to the driver.

mod command;
mod macos;
mod windows;

use camino::{Utf8Path, Utf8PathBuf};

pub use command::{BuildCommand, require_tool, run_command};
pub use macos::MacDriver;
pub use windows::WindowsDriver;

use crate::config::BuildConfig;
use crate::{Error, Result};

/// Everything a driver needs to locate and build one exporter
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    /// Project root (directory holding the `.jucer` file)
    pub root: &'a Utf8Path,
    /// Exporter target folder, relative to `root`
    pub target_folder: &'a str,
    /// Build configuration
    pub config: BuildConfig,
    /// Plugin base name
    pub plugin_name: &'a str,
}

/// Host platform with a build driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Platform {
    /// Visual Studio / MSBuild
    #[value(name = "windows", alias = "win")]
    Windows,
    /// Xcode / xcodebuild
    #[value(name = "macos", alias = "mac", alias = "darwin")]
    MacOs,
}

impl Platform {
    /// Platform of the running host
    pub fn detect() -> Result<Self> {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value to a platform
    pub fn from_os(os: &str) -> Result<Self> {
        match os {
            "windows" => Ok(Platform::Windows),
            "macos" => Ok(Platform::MacOs),
            other => Err(Error::UnsupportedPlatform {
                os: other.to_string(),
            }),
        }
    }

    /// Tag used in archive names (`win` / `mac`)
    pub fn tag(&self) -> &'static str {
        match self {
            Platform::Windows => WindowsDriver::TAG,
            Platform::MacOs => MacDriver::TAG,
        }
    }

    /// Exporter tag prefix used when no exporter is requested
    pub fn default_exporter_prefix(&self) -> &'static str {
        match self {
            Platform::Windows => WindowsDriver::EXPORTER_PREFIX,
            Platform::MacOs => MacDriver::EXPORTER_PREFIX,
        }
    }

    /// System VST3 directory, when it can be determined.
    ///
    /// `lookup` resolves environment variables.
    pub fn default_install_dir(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<Utf8PathBuf> {
        match self {
            Platform::Windows => WindowsDriver::default_install_dir(lookup),
            Platform::MacOs => Some(MacDriver::default_install_dir()),
        }
    }

    /// Where the toolchain leaves the built plugin
    pub fn artifact_path(&self, ctx: &BuildContext<'_>) -> Utf8PathBuf {
        match self {
            Platform::Windows => WindowsDriver::artifact_path(ctx),
            Platform::MacOs => MacDriver::artifact_path(ctx),
        }
    }

    /// Toolchain invocations, in order
    pub fn build_commands(&self, ctx: &BuildContext<'_>) -> Vec<BuildCommand> {
        match self {
            Platform::Windows => WindowsDriver::build_commands(ctx),
            Platform::MacOs => MacDriver::build_commands(ctx),
        }
    }

    /// Verify the toolchain is installed
    pub fn check_toolchain(&self) -> Result<()> {
        match self {
            Platform::Windows => WindowsDriver::check_toolchain(),
            Platform::MacOs => MacDriver::check_toolchain(),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Windows => write!(f, "Windows"),
            Platform::MacOs => write!(f, "macOS"),
        }
    }
}
