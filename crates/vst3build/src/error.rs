//! Error types for vst3build

// This warning is a false positive from thiserror macro expansion
#![allow(unused_assignments)]

use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for vst3build operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for vst3build
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// XML parsing error
    #[error("Failed to parse XML: {0}")]
    XmlParse(#[from] quick_xml::Error),

    /// Zip archive error
    #[error("Failed to write archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[help]
        help: String,
    },

    /// No `.jucer` file in the project root
    #[error("Can not find *.jucer file under: {dir}")]
    #[diagnostic(help("Run vst3build from the project root or pass --project <DIR>"))]
    DescriptorNotFound { dir: Utf8PathBuf },

    /// The descriptor was found but is missing required data
    #[error("Invalid project descriptor: {message}")]
    InvalidDescriptor {
        message: String,
        #[help]
        help: String,
    },

    /// No exporter could be resolved
    #[error("Exporter not found: {message}")]
    ExporterNotFound {
        message: String,
        #[help]
        help: String,
    },

    /// The native toolchain is not on PATH
    #[error("Toolchain not found: {tool}")]
    ToolchainNotFound {
        tool: String,
        #[help]
        help: String,
    },

    /// A toolchain invocation exited unsuccessfully
    #[error("Build command failed: {message}")]
    BuildCommandFailed {
        message: String,
        #[help]
        help: String,
    },

    /// The toolchain reported success but the plugin is not where it should be
    #[error("Can not find build output: {path}")]
    #[diagnostic(help("Check the build log; the toolchain may have written the plugin elsewhere"))]
    ArtifactMissing { path: Utf8PathBuf },

    /// Host operating system has no build driver
    #[error("Unsupported platform: {os}")]
    #[diagnostic(help("Only Windows (MSBuild) and macOS (Xcode) builds are supported"))]
    UnsupportedPlatform { os: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Create an invalid descriptor error
    pub fn invalid_descriptor(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Create an exporter-not-found error
    pub fn exporter_not_found(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::ExporterNotFound {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Create a toolchain-not-found error
    pub fn toolchain_not_found(tool: impl Into<String>, help: impl Into<String>) -> Self {
        Self::ToolchainNotFound {
            tool: tool.into(),
            help: help.into(),
        }
    }

    /// Create a build command error
    pub fn build_command(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::BuildCommandFailed {
            message: message.into(),
            help: help.into(),
        }
    }
}
