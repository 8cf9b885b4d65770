//! `lumpvfs extract`

use crate::output::{format_size, print_json};
use crate::{OutputFormat, Sources};
use anyhow::Context;
use lumpvfs_directory::{DirectoryConfig, DirectoryError, Namespace};
use serde::Serialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Serialize)]
struct Extracted<'a> {
    name: String,
    path: Option<&'a str>,
    namespace: Namespace,
    size: usize,
    crc32: String,
    output: String,
}

/// Extract one record to `out`
pub fn handle(
    sources: &Sources,
    name: &str,
    by_path: bool,
    namespace: Option<Namespace>,
    out: &Path,
    config: DirectoryConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let directory = sources.load(config)?;

    let handle = if by_path {
        directory
            .lookup_path(name, namespace)
            .ok_or_else(|| DirectoryError::NotFound {
                name: name.to_string(),
                namespace,
            })?
    } else {
        directory.get_num_for_name(name, namespace)?
    };

    directory
        .extract_to(handle, out)
        .with_context(|| format!("Failed to extract {name} to {}", out.display()))?;

    let record = directory.record(handle)?;
    info!("Extracted {} to {}", record.display_name(), out.display());

    let extracted = Extracted {
        name: record.name().as_str(),
        path: record.path(),
        namespace: record.namespace(),
        size: record.size(),
        crc32: format!("{:08x}", directory.checksum(handle)?),
        output: out.display().to_string(),
    };
    match format {
        OutputFormat::Json => print_json(&extracted)?,
        OutputFormat::Text => println!(
            "Wrote {} ({}, {}, crc32 {}) to {}",
            extracted.name,
            extracted.namespace,
            format_size(extracted.size),
            extracted.crc32,
            extracted.output
        ),
    }
    Ok(())
}
