//! Xcode build driver

use camino::Utf8PathBuf;

use super::BuildContext;
use super::command::{BuildCommand, require_tool};
use crate::Result;

/// Builder for Xcode (macOS) exporters
pub struct MacDriver;

impl MacDriver {
    /// Platform tag used in archive names
    pub const TAG: &'static str = "mac";

    /// Exporter tag prefix for macOS Xcode projects
    pub const EXPORTER_PREFIX: &'static str = "XCODE_MAC";

    /// System-wide VST3 directory
    pub const INSTALL_DIR: &'static str = "/Library/Audio/Plug-Ins/VST3";

    const TOOL: &'static str = "xcodebuild";

    pub fn default_install_dir() -> Utf8PathBuf {
        Utf8PathBuf::from(Self::INSTALL_DIR)
    }

    /// `<root>/<targetFolder>/build/<config>/VST3/<name>.vst3`
    pub fn artifact_path(ctx: &BuildContext<'_>) -> Utf8PathBuf {
        ctx.root
            .join(ctx.target_folder)
            .join("build")
            .join(ctx.config.as_str())
            .join("VST3")
            .join(format!("{}.vst3", ctx.plugin_name))
    }

    /// One xcodebuild run of the `<name> - VST3` target, which pulls in the
    /// shared code target as a dependency
    pub fn build_commands(ctx: &BuildContext<'_>) -> Vec<BuildCommand> {
        let project = ctx
            .root
            .join(ctx.target_folder)
            .join(format!("{}.xcodeproj", ctx.plugin_name));

        vec![
            BuildCommand::new("Build VST3", Self::TOOL, ctx.root)
                .arg("-project")
                .arg(project.as_str())
                .arg("-target")
                .arg(format!("{} - VST3", ctx.plugin_name))
                .arg("-configuration")
                .arg(ctx.config.as_str())
                .arg("build"),
        ]
    }

    /// Fail fast when xcodebuild is not on PATH
    pub fn check_toolchain() -> Result<()> {
        require_tool(
            Self::TOOL,
            "Install Xcode and run `xcode-select --install` to set up the command line tools",
        )?;
        Ok(())
    }
}
