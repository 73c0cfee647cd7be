//! Build orchestration
//!
//! This module ties the pieces together for one invocation:
//! - Resolves the exporter and the expected artifact path
//! - Runs the platform toolchain
//! - Copies the plugin to the VST3 directory
//! - Packs the distribution archive

use camino::{Utf8Path, Utf8PathBuf};

use crate::Result;
use crate::archive::{archive_name, make_archive};
use crate::config::{BuildConfig, Config};
use crate::descriptor::{Exporter, ProjectDescriptor};
use crate::exporter::select_exporter;
use crate::install::copy_to_install_dir;
use crate::platform::{BuildCommand, BuildContext, Platform};

/// Options for one build
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Build configuration
    pub config: BuildConfig,
    /// Requested exporter tag
    pub exporter: Option<String>,
    /// Copy the plugin to the VST3 directory after building
    pub copy_to_vst3_dir: bool,
    /// Pack a distribution archive after building
    pub distribute: bool,
    /// Show what would be done without doing it
    pub dry_run: bool,
}

/// Everything resolved before the first command runs
#[derive(Debug, Clone)]
pub struct BuildPlan {
    /// Selected exporter
    pub exporter: Exporter,
    /// Where the toolchain will leave the plugin
    pub artifact: Utf8PathBuf,
    /// Toolchain invocations, in order
    pub commands: Vec<BuildCommand>,
    /// VST3 directory, when copying was requested and the directory is known
    pub install_dir: Option<Utf8PathBuf>,
    /// Archive path, when distribution was requested
    pub archive: Option<Utf8PathBuf>,
}

/// Result of a build
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Plugin as produced by the toolchain
    pub artifact: Option<Utf8PathBuf>,
    /// Installed copy
    pub installed: Option<Utf8PathBuf>,
    /// Distribution archive
    pub archive: Option<Utf8PathBuf>,
}

/// Build pipeline for a single project on a single platform
pub struct Pipeline<'a> {
    root: &'a Utf8Path,
    config: &'a Config,
    project: &'a ProjectDescriptor,
    platform: Platform,
    env: fn(&str) -> Option<String>,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        root: &'a Utf8Path,
        config: &'a Config,
        project: &'a ProjectDescriptor,
        platform: Platform,
    ) -> Self {
        Self {
            root,
            config,
            project,
            platform,
            env: |key| std::env::var(key).ok(),
        }
    }

    /// Resolve environment variables through `env` instead of the process environment
    pub fn with_env(mut self, env: fn(&str) -> Option<String>) -> Self {
        self.env = env;
        self
    }

    /// Resolve exporter, paths and commands without touching anything
    pub fn plan(&self, options: &BuildOptions) -> Result<BuildPlan> {
        let exporter = select_exporter(
            &self.project.exporters,
            options.exporter.as_deref(),
            self.platform.default_exporter_prefix(),
        )?;
        tracing::info!("Using exporter {} for {}", exporter.tag, self.platform);

        if !exporter.configurations.is_empty()
            && !exporter
                .configurations
                .iter()
                .any(|c| c == options.config.as_str())
        {
            tracing::warn!(
                "Exporter {} does not declare a {} configuration (declared: {})",
                exporter.tag,
                options.config,
                exporter.configurations.join(", ")
            );
        }

        let ctx = BuildContext {
            root: self.root,
            target_folder: exporter.require_target_folder()?,
            config: options.config,
            plugin_name: &self.project.name,
        };

        let artifact = self.platform.artifact_path(&ctx);
        tracing::debug!("Expected build output: {}", artifact);

        let install_dir = if options.copy_to_vst3_dir {
            let dir = self
                .config
                .install
                .vst3_dir
                .clone()
                .or_else(|| self.platform.default_install_dir(self.env));
            if dir.is_none() {
                tracing::warn!(
                    "No default VST3 directory known for {}, skipping copy",
                    self.platform
                );
            }
            dir
        } else {
            None
        };

        let archive = options.distribute.then(|| {
            self.config.dist_dir(self.root).join(archive_name(
                &self.project.name,
                self.platform.tag(),
                &self.project.version,
            ))
        });

        Ok(BuildPlan {
            exporter: exporter.clone(),
            commands: self.platform.build_commands(&ctx),
            artifact,
            install_dir,
            archive,
        })
    }

    /// Plan, build, then run the post-build steps
    pub fn run(&self, options: &BuildOptions) -> Result<BuildReport> {
        let plan = self.plan(options)?;

        if options.dry_run {
            self.print_plan(&plan);
            return Ok(BuildReport::default());
        }

        tracing::info!("=====Build=====");
        self.platform.check_toolchain()?;
        for command in &plan.commands {
            crate::platform::run_command(command)?;
        }

        self.post_build(&plan)
    }

    /// Copy and archive the plugin described by `plan`
    pub fn post_build(&self, plan: &BuildPlan) -> Result<BuildReport> {
        let installed = match plan.install_dir {
            Some(ref dir) => Some(copy_to_install_dir(&plan.artifact, dir, &self.project.name)?),
            None => None,
        };

        let archive = match plan.archive {
            Some(ref archive) => {
                let dist_dir = archive.parent().unwrap_or(self.root);
                let file_name = archive.file_name().unwrap_or_default();
                Some(make_archive(&plan.artifact, dist_dir, file_name)?)
            }
            None => None,
        };

        tracing::info!("Build complete!");

        Ok(BuildReport {
            artifact: Some(plan.artifact.clone()),
            installed,
            archive,
        })
    }

    fn print_plan(&self, plan: &BuildPlan) {
        println!(
            "Would build {} v{} for {} with exporter {}",
            self.project.name, self.project.version, self.platform, plan.exporter.tag
        );
        println!("Commands:");
        for command in &plan.commands {
            println!("  - [{}] {}", command.cwd, command.display());
        }
        println!("Output: {}", plan.artifact);
        if let Some(ref dir) = plan.install_dir {
            println!("Copy to: {}", dir.join(format!("{}.vst3", self.project.name)));
        }
        if let Some(ref archive) = plan.archive {
            println!("Archive: {}", archive);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::fs;
    use tempfile::TempDir;

    const JUCER: &str = r#"<JUCERPROJECT name="MySynth" version="1.2.0">
  <EXPORTFORMATS>
    <XCODE_MAC targetFolder="Builds/MacOSX"/>
    <VS2022 targetFolder="Builds/VisualStudio2022">
      <CONFIGURATIONS>
        <CONFIGURATION name="Debug"/>
        <CONFIGURATION name="Release"/>
      </CONFIGURATIONS>
    </VS2022>
    <VS2019/>
  </EXPORTFORMATS>
</JUCERPROJECT>"#;

    fn project(root: &Utf8Path) -> ProjectDescriptor {
        ProjectDescriptor::from_str(JUCER, root.join("MySynth.jucer")).unwrap()
    }

    #[test]
    fn test_plan_windows_debug() {
        let root = Utf8Path::new("/work/MySynth");
        let config = Config::default();
        let project = project(root);
        let pipeline = Pipeline::new(root, &config, &project, Platform::Windows);

        let plan = pipeline
            .plan(&BuildOptions {
                config: BuildConfig::Debug,
                distribute: true,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(plan.exporter.tag, "VS2022");
        assert_eq!(
            plan.artifact,
            "/work/MySynth/Builds/VisualStudio2022/x64/Debug/VST3/MySynth.vst3"
        );
        assert_eq!(plan.commands.len(), 2);
        assert!(plan.install_dir.is_none());
        assert_eq!(
            plan.archive,
            Some(Utf8PathBuf::from("/work/MySynth/dist/MySynth_win_v1.2.0.zip"))
        );
    }

    #[test]
    fn test_plan_macos_uses_config_overrides() {
        let root = Utf8Path::new("/work/MySynth");
        let config = Config::parse(
            r#"
[install]
vst3_dir = "/Users/me/Library/Audio/Plug-Ins/VST3"

[dist]
dir = "releases"
"#,
        )
        .unwrap();
        let project = project(root);
        let pipeline = Pipeline::new(root, &config, &project, Platform::MacOs);

        let plan = pipeline
            .plan(&BuildOptions {
                copy_to_vst3_dir: true,
                distribute: true,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(plan.exporter.tag, "XCODE_MAC");
        assert_eq!(
            plan.artifact,
            "/work/MySynth/Builds/MacOSX/build/Release/VST3/MySynth.vst3"
        );
        assert_eq!(
            plan.install_dir,
            Some(Utf8PathBuf::from("/Users/me/Library/Audio/Plug-Ins/VST3"))
        );
        assert_eq!(
            plan.archive,
            Some(Utf8PathBuf::from("/work/MySynth/releases/MySynth_mac_v1.2.0.zip"))
        );
    }

    #[test]
    fn test_plan_exporter_without_target_folder() {
        let root = Utf8Path::new("/work/MySynth");
        let config = Config::default();
        let project = project(root);
        let pipeline = Pipeline::new(root, &config, &project, Platform::Windows);

        let err = pipeline
            .plan(&BuildOptions {
                exporter: Some("VS2019".to_string()),
                ..Default::default()
            })
            .unwrap_err();

        assert!(matches!(err, Error::InvalidDescriptor { .. }));
    }

    #[test]
    fn test_plan_no_exporter() {
        let root = Utf8Path::new("/work/Bare");
        let config = Config::default();
        let project = ProjectDescriptor::from_str(
            r#"<JUCERPROJECT name="Bare" version="0.1.0"><EXPORTFORMATS><LINUX_MAKE targetFolder="Builds/LinuxMakefile"/></EXPORTFORMATS></JUCERPROJECT>"#,
            root.join("Bare.jucer"),
        )
        .unwrap();
        let pipeline = Pipeline::new(root, &config, &project, Platform::MacOs);

        let err = pipeline.plan(&BuildOptions::default()).unwrap_err();
        assert!(matches!(err, Error::ExporterNotFound { .. }));
    }

    #[test]
    fn test_post_build_copies_and_archives() {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8Path::from_path(temp_dir.path()).unwrap();
        let config = Config::parse(&format!("[install]\nvst3_dir = '{}'\n", root.join("VST3"))).unwrap();
        let project = project(root);
        let pipeline = Pipeline::new(root, &config, &project, Platform::Windows);

        let plan = pipeline
            .plan(&BuildOptions {
                copy_to_vst3_dir: true,
                distribute: true,
                ..Default::default()
            })
            .unwrap();
        fs::create_dir_all(plan.artifact.parent().unwrap()).unwrap();
        fs::write(&plan.artifact, b"plugin").unwrap();

        let report = pipeline.post_build(&plan).unwrap();

        assert_eq!(report.installed, Some(root.join("VST3/MySynth.vst3")));
        assert_eq!(report.archive, Some(root.join("dist/MySynth_win_v1.2.0.zip")));
        assert!(root.join("VST3/MySynth.vst3").is_file());
        assert!(root.join("dist/MySynth_win_v1.2.0.zip").is_file());
    }

    #[test]
    fn test_post_build_without_flags_does_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8Path::from_path(temp_dir.path()).unwrap();
        let config = Config::default();
        let project = project(root);
        let pipeline = Pipeline::new(root, &config, &project, Platform::Windows);

        // artifact deliberately absent: neither step may look at it
        let plan = pipeline.plan(&BuildOptions::default()).unwrap();
        let report = pipeline.post_build(&plan).unwrap();

        assert!(report.installed.is_none());
        assert!(report.archive.is_none());
        assert!(!root.join("dist").exists());
    }

    #[test]
    fn test_copy_skipped_without_install_dir() {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8Path::from_path(temp_dir.path()).unwrap();
        let config = Config::default();
        let project = project(root);
        // CommonProgramW6432 unset and no [install] override
        let pipeline = Pipeline::new(root, &config, &project, Platform::Windows).with_env(|_| None);

        let plan = pipeline
            .plan(&BuildOptions {
                copy_to_vst3_dir: true,
                ..Default::default()
            })
            .unwrap();
        assert!(plan.install_dir.is_none());

        // artifact absent: the skipped copy step must not look for it
        let report = pipeline.post_build(&plan).unwrap();
        assert!(report.installed.is_none());
    }

    #[test]
    fn test_install_dir_from_environment() {
        let root = Utf8Path::new("/work/MySynth");
        let config = Config::default();
        let project = project(root);
        let pipeline = Pipeline::new(root, &config, &project, Platform::Windows)
            .with_env(|key| (key == "CommonProgramW6432").then(|| "C:/Program Files/Common Files".to_string()));

        let plan = pipeline
            .plan(&BuildOptions {
                copy_to_vst3_dir: true,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(
            plan.install_dir,
            Some(Utf8PathBuf::from("C:/Program Files/Common Files/VST3"))
        );
    }

    #[test]
    fn test_post_build_missing_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8Path::from_path(temp_dir.path()).unwrap();
        let config = Config::parse(&format!("[install]\nvst3_dir = '{}'\n", root.join("VST3"))).unwrap();
        let project = project(root);
        let pipeline = Pipeline::new(root, &config, &project, Platform::Windows);

        let plan = pipeline
            .plan(&BuildOptions {
                copy_to_vst3_dir: true,
                ..Default::default()
            })
            .unwrap();
        let err = pipeline.post_build(&plan).unwrap_err();

        assert!(matches!(err, Error::ArtifactMissing { .. }));
    }
}
