//! Exporter selection
//!
//! An explicitly requested exporter wins when it exists. Otherwise the first
//! exporter whose tag starts with the platform prefix is used.

use crate::descriptor::Exporter;
use crate::{Error, Result};

/// Pick the exporter to build with.
///
/// A requested tag that is not present is not an error on its own: selection
/// falls back to the platform prefix, and only fails when that finds nothing
/// too.
pub fn select_exporter<'a>(
    exporters: &'a [Exporter],
    requested: Option<&str>,
    default_prefix: &str,
) -> Result<&'a Exporter> {
    if let Some(tag) = requested {
        if let Some(exporter) = exporters.iter().find(|e| e.tag == tag) {
            tracing::debug!("Using requested exporter {}", exporter.tag);
            return Ok(exporter);
        }
        tracing::warn!(
            "Exporter '{}' not found (available: {}), falling back to the first '{}*' exporter",
            tag,
            available(exporters),
            default_prefix
        );
    }

    exporters
        .iter()
        .find(|e| e.tag.starts_with(default_prefix))
        .inspect(|e| tracing::debug!("Using default exporter {}", e.tag))
        .ok_or_else(|| {
            Error::exporter_not_found(
                format!("Can not find a '{}*' exporter", default_prefix),
                format!(
                    "Available exporters: {}. Add one in Projucer or pass --exporter <TAG>",
                    available(exporters)
                ),
            )
        })
}

fn available(exporters: &[Exporter]) -> String {
    if exporters.is_empty() {
        "(none)".to_string()
    } else {
        exporters
            .iter()
            .map(|e| e.tag.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
