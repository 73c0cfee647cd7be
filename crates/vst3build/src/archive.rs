//! Distribution archives
//!
//! The built plugin is zipped as `<name>_<platform>_v<version>.zip` with the
//! plugin itself (file or bundle) at the archive root.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs::File;
use std::io;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::{Error, Result};

/// `<name>_<platform_tag>_v<version>.zip`
pub fn archive_name(plugin_name: &str, platform_tag: &str, version: &str) -> String {
    format!("{}_{}_v{}.zip", plugin_name, platform_tag, version)
}

/// Zip `artifact` into `dist_dir/archive_name`, overwriting an existing archive.
///
/// Entries are rooted at the artifact's file name, so unpacking the archive
/// yields `<name>.vst3` directly.
pub fn make_archive(artifact: &Utf8Path, dist_dir: &Utf8Path, archive_name: &str) -> Result<Utf8PathBuf> {
    tracing::info!("=====Make archive=====");

    if !artifact.exists() {
        return Err(Error::ArtifactMissing {
            path: artifact.to_path_buf(),
        });
    }

    let base_name = artifact.file_name().ok_or_else(|| Error::ArtifactMissing {
        path: artifact.to_path_buf(),
    })?;
    let parent = artifact.parent().unwrap_or(Utf8Path::new("."));

    std::fs::create_dir_all(dist_dir)?;
    let output = dist_dir.join(archive_name);
    tracing::info!("creating '{}' and adding '{}' to it", output, base_name);

    let mut zip = ZipWriter::new(File::create(&output)?);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    if artifact.is_dir() {
        for entry in WalkDir::new(artifact).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| io::Error::other(format!("Failed to walk {}: {}", artifact, e)))?;
            let path = Utf8Path::from_path(entry.path()).ok_or_else(|| {
                io::Error::other(format!("Path is not valid UTF-8: {:?}", entry.path()))
            })?;
            let name = entry_name(path, parent)?;

            if entry.file_type().is_dir() {
                tracing::debug!("adding '{}/'", name);
                zip.add_directory(name, options)?;
            } else {
                tracing::debug!("adding '{}'", name);
                zip.start_file(name, file_options(path, options)?)?;
                io::copy(&mut File::open(path)?, &mut zip)?;
            }
        }
    } else {
        tracing::debug!("adding '{}'", base_name);
        zip.start_file(base_name, file_options(artifact, options)?)?;
        io::copy(&mut File::open(artifact)?, &mut zip)?;
    }

    zip.finish()?;
    tracing::info!("Archive written to {}", output);

    Ok(output)
}

/// Archive entry name of `path` relative to `base`, always with `/` separators
fn entry_name(path: &Utf8Path, base: &Utf8Path) -> Result<String> {
    let rel = path
        .strip_prefix(base)
        .map_err(|_| io::Error::other(format!("{} is not under {}", path, base)))?;

    Ok(rel
        .components()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join("/"))
}

#[cfg(unix)]
fn file_options(path: &Utf8Path, options: FileOptions) -> Result<FileOptions> {
    use std::os::unix::fs::PermissionsExt;
    let mode = std::fs::metadata(path)?.permissions().mode();
    Ok(options.unix_permissions(mode & 0o777))
}

#[cfg(not(unix))]
fn file_options(_path: &Utf8Path, options: FileOptions) -> Result<FileOptions> {
    Ok(options)
}
