//! Project descriptor discovery and parsing
//!
//! A JUCE project is described by a single `.jucer` XML file in the project
//! root. Only the parts needed to drive a build are read: the project name and
//! version from the root element, and the exporters listed under
//! `EXPORTFORMATS`.

use camino::{Utf8Path, Utf8PathBuf};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::{Error, Result};

/// Descriptor file extension
pub const DESCRIPTOR_EXTENSION: &str = "jucer";

/// Element holding the exporter list
const EXPORT_FORMATS: &[u8] = b"EXPORTFORMATS";

/// Version assumed when the root element has none
const DEFAULT_VERSION: &str = "1.0.0";

/// A build target configuration for one IDE/toolchain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exporter {
    /// Element name, e.g. `VS2022` or `XCODE_MAC`
    pub tag: String,

    /// Folder (relative to the project root) the exporter writes its IDE project to
    pub target_folder: Option<String>,

    /// Names of the build configurations the exporter declares
    pub configurations: Vec<String>,
}

impl Exporter {
    /// Target folder, or an error naming the exporter when it has none
    pub fn require_target_folder(&self) -> Result<&str> {
        self.target_folder.as_deref().ok_or_else(|| {
            Error::invalid_descriptor(
                format!("Exporter '{}' has no targetFolder attribute", self.tag),
                "Re-save the project in Projucer so the exporter gets a target folder",
            )
        })
    }
}

/// Parsed `.jucer` project
#[derive(Debug, Clone)]
pub struct ProjectDescriptor {
    /// Plugin base name
    pub name: String,

    /// Project version
    pub version: String,

    /// Path to the descriptor file
    pub path: Utf8PathBuf,

    /// Exporters in document order
    pub exporters: Vec<Exporter>,
}

impl ProjectDescriptor {
    /// Locate the descriptor in `root` and parse it
    pub fn discover(root: &Utf8Path) -> Result<Self> {
        let path = find_descriptor(root)?;
        tracing::info!("Target juce project: {}", path);
        Self::from_path(&path)
    }

    /// Parse a descriptor file
    pub fn from_path(path: &Utf8Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content, path.to_path_buf())
    }

    /// Parse a descriptor from XML content
    pub fn from_str(content: &str, path: Utf8PathBuf) -> Result<Self> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut name = None;
        let mut version = None;
        let mut exporters: Vec<Exporter> = Vec::new();

        // depth 1 is the root element, 2 its children, 3 the exporters
        let mut depth = 0usize;
        let mut in_export_formats = false;
        let mut seen_root = false;

        loop {
            let (element, is_empty) = match reader.read_event()? {
                Event::Start(e) => (e, false),
                Event::Empty(e) => (e, true),
                Event::End(_) => {
                    if depth == 2 {
                        in_export_formats = false;
                    }
                    depth = depth.saturating_sub(1);
                    continue;
                }
                Event::Eof => break,
                _ => continue,
            };

            depth += 1;

            match depth {
                1 if !seen_root => {
                    seen_root = true;
                    name = attribute(&element, b"name")?;
                    version = attribute(&element, b"version")?;
                }
                2 => in_export_formats = element.name().as_ref() == EXPORT_FORMATS && !is_empty,
                3 if in_export_formats => exporters.push(Exporter {
                    tag: String::from_utf8_lossy(element.name().as_ref()).into_owned(),
                    target_folder: attribute(&element, b"targetFolder")?,
                    configurations: Vec::new(),
                }),
                5 if in_export_formats && element.name().as_ref() == b"CONFIGURATION" => {
                    if let (Some(exporter), Some(config_name)) =
                        (exporters.last_mut(), attribute(&element, b"name")?)
                    {
                        exporter.configurations.push(config_name);
                    }
                }
                _ => {}
            }

            if is_empty {
                depth -= 1;
                if depth == 1 {
                    in_export_formats = false;
                }
            }
        }

        let name = name.filter(|n| !n.is_empty()).ok_or_else(|| {
            Error::invalid_descriptor(
                format!("{} has no project name", path),
                "The root element must carry a non-empty 'name' attribute",
            )
        })?;

        let version = version.unwrap_or_else(|| {
            tracing::warn!("{} has no version attribute, assuming {}", path, DEFAULT_VERSION);
            DEFAULT_VERSION.to_string()
        });

        Ok(ProjectDescriptor {
            name,
            version,
            path,
            exporters,
        })
    }

    /// First exporter with exactly this tag
    pub fn exporter(&self, tag: &str) -> Option<&Exporter> {
        self.exporters.iter().find(|e| e.tag == tag)
    }

    /// All exporter tags in document order
    pub fn exporter_tags(&self) -> Vec<&str> {
        self.exporters.iter().map(|e| e.tag.as_str()).collect()
    }
}

/// Find the `.jucer` file in `root` (non-recursive).
///
/// Matches are sorted by file name; the first one wins.
pub fn find_descriptor(root: &Utf8Path) -> Result<Utf8PathBuf> {
    let mut matches: Vec<Utf8PathBuf> = root
        .read_dir_utf8()
        .map_err(|_| Error::DescriptorNotFound {
            dir: root.to_path_buf(),
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(DESCRIPTOR_EXTENSION))
                && path.is_file()
        })
        .collect();

    matches.sort();

    let mut matches = matches.into_iter();
    let first = matches.next().ok_or_else(|| Error::DescriptorNotFound {
        dir: root.to_path_buf(),
    })?;

    let others: Vec<_> = matches.collect();
    if !others.is_empty() {
        tracing::warn!(
            "Found {} descriptor files, using {} (ignored: {:?})",
            others.len() + 1,
            first,
            others
        );
    }

    Ok(first)
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}
