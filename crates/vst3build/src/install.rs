//! Copying the built plugin into the system VST3 directory

use camino::{Utf8Path, Utf8PathBuf};
use walkdir::WalkDir;

use crate::{Error, Result};

/// Copy `artifact` to `<install_dir>/<plugin_name>.vst3`, replacing whatever is there.
///
/// `install_dir` is created if needed. A missing artifact means the build did
/// not produce what the toolchain claimed, and is an [`Error::ArtifactMissing`].
pub fn copy_to_install_dir(
    artifact: &Utf8Path,
    install_dir: &Utf8Path,
    plugin_name: &str,
) -> Result<Utf8PathBuf> {
    tracing::info!("=====Copy to vst3 dir=====");
    tracing::info!("target dir: {}", install_dir);
    std::fs::create_dir_all(install_dir)?;

    if !artifact.exists() {
        return Err(Error::ArtifactMissing {
            path: artifact.to_path_buf(),
        });
    }

    let dst = install_dir.join(format!("{}.vst3", plugin_name));

    if is_same_path(artifact, &dst)? {
        tracing::info!("{} is already in place, nothing to copy", dst);
        return Ok(dst);
    }

    if artifact.is_dir() {
        // bundle layout: replace the whole bundle so stale files don't survive
        if dst.is_dir() {
            std::fs::remove_dir_all(&dst)?;
        } else if dst.exists() {
            std::fs::remove_file(&dst)?;
        }
        copy_dir_recursive(artifact, &dst)?;
    } else {
        if dst.is_dir() {
            std::fs::remove_dir_all(&dst)?;
        }
        std::fs::copy(artifact, &dst)?;
    }

    tracing::info!("Copy file: {} => {}", artifact, dst);
    Ok(dst)
}

/// Whether `a` and `b` name the same existing file or directory
fn is_same_path(a: &Utf8Path, b: &Utf8Path) -> Result<bool> {
    if !b.exists() {
        return Ok(false);
    }
    Ok(a.canonicalize_utf8()? == b.canonicalize_utf8()?)
}

/// Recursively copy a directory
pub fn copy_dir_recursive(src: &Utf8Path, dst: &Utf8Path) -> Result<()> {
    std::fs::create_dir_all(dst)?;

    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.map_err(|e| std::io::Error::other(format!("Failed to walk {}: {}", src, e)))?;

        let src_path = Utf8Path::from_path(entry.path()).ok_or_else(|| {
            std::io::Error::other(format!("Path is not valid UTF-8: {:?}", entry.path()))
        })?;

        let rel_path = src_path
            .strip_prefix(src)
            .map_err(|_| std::io::Error::other(format!("{} is not under {}", src_path, src)))?;

        let dst_path = dst.join(rel_path);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dst_path)?;
        } else if entry.file_type().is_symlink() {
            copy_symlink(src_path, &dst_path)?;
        } else {
            if let Some(parent) = dst_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(src_path, &dst_path)?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Utf8Path, dst: &Utf8Path) -> Result<()> {
    let target = std::fs::read_link(src)?;
    if dst.exists() || dst.is_symlink() {
        std::fs::remove_file(dst)?;
    }
    std::os::unix::fs::symlink(target, dst)?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(src: &Utf8Path, dst: &Utf8Path) -> Result<()> {
    // follow the link; Windows symlinks need elevated rights to recreate
    if src.is_dir() {
        copy_dir_recursive(&src.canonicalize_utf8()?, dst)
    } else {
        std::fs::copy(src, dst)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn utf8(dir: &TempDir) -> &Utf8Path {
        Utf8Path::from_path(dir.path()).unwrap()
    }

    #[test]
    fn test_copy_file_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let root = utf8(&temp_dir);
        let artifact = root.join("build/x64/Release/VST3/Foo.vst3");
        fs::create_dir_all(artifact.parent().unwrap()).unwrap();
        fs::write(&artifact, b"plugin").unwrap();

        let install_dir = root.join("Common Files/VST3");
        let dst = copy_to_install_dir(&artifact, &install_dir, "Foo").unwrap();

        assert_eq!(dst, install_dir.join("Foo.vst3"));
        assert_eq!(fs::read(&dst).unwrap(), b"plugin");
    }

    #[test]
    fn test_copy_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let root = utf8(&temp_dir);
        let artifact = root.join("Foo.vst3");
        fs::write(&artifact, b"new").unwrap();

        let install_dir = root.join("VST3");
        fs::create_dir_all(&install_dir).unwrap();
        fs::write(install_dir.join("Foo.vst3"), b"old").unwrap();

        let dst = copy_to_install_dir(&artifact, &install_dir, "Foo").unwrap();
        assert_eq!(fs::read(dst).unwrap(), b"new");
    }

    #[test]
    fn test_copy_renames_to_plugin_name() {
        let temp_dir = TempDir::new().unwrap();
        let root = utf8(&temp_dir);
        let artifact = root.join("output.bin");
        fs::write(&artifact, b"x").unwrap();

        let dst = copy_to_install_dir(&artifact, &root.join("VST3"), "Bar").unwrap();
        assert_eq!(dst.file_name(), Some("Bar.vst3"));
    }

    #[test]
    fn test_copy_bundle_replaces_stale_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = utf8(&temp_dir);
        let artifact = root.join("build/Foo.vst3");
        fs::create_dir_all(artifact.join("Contents/MacOS")).unwrap();
        fs::write(artifact.join("Contents/MacOS/Foo"), b"binary").unwrap();
        fs::write(artifact.join("Contents/Info.plist"), b"<plist/>").unwrap();

        let install_dir = root.join("VST3");
        fs::create_dir_all(install_dir.join("Foo.vst3/Contents")).unwrap();
        fs::write(install_dir.join("Foo.vst3/Contents/stale.txt"), b"old").unwrap();

        let dst = copy_to_install_dir(&artifact, &install_dir, "Foo").unwrap();

        assert_eq!(fs::read(dst.join("Contents/MacOS/Foo")).unwrap(), b"binary");
        assert!(dst.join("Contents/Info.plist").is_file());
        assert!(!dst.join("Contents/stale.txt").exists());
    }

    #[test]
    fn test_copy_onto_itself_keeps_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = utf8(&temp_dir);
        let artifact = root.join("Foo.vst3");
        fs::write(&artifact, b"plugin").unwrap();

        let dst = copy_to_install_dir(&artifact, root, "Foo").unwrap();

        assert_eq!(dst, artifact);
        assert_eq!(fs::read(&artifact).unwrap(), b"plugin");
    }

    #[test]
    fn test_copy_onto_itself_keeps_bundle() {
        let temp_dir = TempDir::new().unwrap();
        let root = utf8(&temp_dir);
        let artifact = root.join("VST3/Foo.vst3");
        fs::create_dir_all(artifact.join("Contents")).unwrap();
        fs::write(artifact.join("Contents/Info.plist"), b"<plist/>").unwrap();

        // same directory reached through a different spelling
        let install_dir = root.join("VST3/../VST3");
        copy_to_install_dir(&artifact, &install_dir, "Foo").unwrap();

        assert_eq!(fs::read(artifact.join("Contents/Info.plist")).unwrap(), b"<plist/>");
    }

    #[test]
    fn test_missing_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let root = utf8(&temp_dir);
        let install_dir = root.join("VST3");

        let err = copy_to_install_dir(&root.join("missing.vst3"), &install_dir, "Foo").unwrap_err();

        assert!(matches!(err, Error::ArtifactMissing { .. }));
        // install dir is created before the artifact check
        assert!(install_dir.is_dir());
    }
}
