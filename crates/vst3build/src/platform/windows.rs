//! Visual Studio (MSBuild) build driver

use camino::Utf8PathBuf;

use super::BuildContext;
use super::command::{BuildCommand, require_tool};
use crate::Result;

/// Builder for Visual Studio exporters
pub struct WindowsDriver;

impl WindowsDriver {
    /// Platform tag used in archive names
    pub const TAG: &'static str = "win";

    /// Exporters whose tag starts with this are Visual Studio exporters
    pub const EXPORTER_PREFIX: &'static str = "VS";

    /// Environment variable holding the 64-bit Common Files directory
    pub const COMMON_FILES_ENV: &'static str = "CommonProgramW6432";

    const TOOL: &'static str = "msbuild";

    /// `%CommonProgramW6432%\VST3`, if the variable is set
    pub fn default_install_dir(lookup: impl Fn(&str) -> Option<String>) -> Option<Utf8PathBuf> {
        lookup(Self::COMMON_FILES_ENV)
            .filter(|dir| !dir.is_empty())
            .map(|dir| Utf8PathBuf::from(dir).join("VST3"))
    }

    /// `<root>/<targetFolder>/x64/<config>/VST3/<name>.vst3`
    pub fn artifact_path(ctx: &BuildContext<'_>) -> Utf8PathBuf {
        ctx.root
            .join(ctx.target_folder)
            .join("x64")
            .join(ctx.config.as_str())
            .join("VST3")
            .join(format!("{}.vst3", ctx.plugin_name))
    }

    /// MSBuild invocations: shared code first, then the VST3 wrapper
    pub fn build_commands(ctx: &BuildContext<'_>) -> Vec<BuildCommand> {
        let property = format!("/property:Configuration={},Platform=x64", ctx.config);

        [("Build shared code", "SharedCode"), ("Build VST3", "VST3")]
            .into_iter()
            .map(|(step, project)| {
                BuildCommand::new(step, Self::TOOL, ctx.root)
                    .arg(Self::vcxproj(ctx, project))
                    .arg(property.clone())
            })
            .collect()
    }

    /// Fail fast when MSBuild is not on PATH
    pub fn check_toolchain() -> Result<()> {
        require_tool(
            Self::TOOL,
            "Run from a Developer Command Prompt for Visual Studio, or add MSBuild to PATH",
        )?;
        Ok(())
    }

    fn vcxproj(ctx: &BuildContext<'_>, project: &str) -> String {
        format!(
            "{}\\{}_{}.vcxproj",
            ctx.target_folder.trim_end_matches(['/', '\\']).replace('/', "\\"),
            ctx.plugin_name,
            project
        )
    }
}
