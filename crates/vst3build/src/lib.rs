//! vst3build - JUCE VST3 plugin build tool
//!
//! This crate provides both a library and CLI for vst3build, including:
//! - Project descriptor (`.jucer`) discovery and parsing
//! - Exporter selection per platform
//! - Toolchain drivers (MSBuild on Windows, xcodebuild on macOS)
//! - Installing the plugin into the system VST3 directory
//! - Versioned distribution archives

pub mod archive;
pub mod commands;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod exporter;
pub mod install;
pub mod pipeline;
pub mod platform;

pub use error::{Error, Result};
