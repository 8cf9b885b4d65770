//! `lumpvfs list`

use crate::output::{align_right, create_table, format_size, print_json};
use crate::{OutputFormat, Sources};
use lumpvfs_directory::{DirectoryConfig, Namespace, RecordHandle, ResourceDirectory};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ListedRecord {
    index: usize,
    name: String,
    path: Option<String>,
    namespace: Namespace,
    size: usize,
    source: u32,
    backing: String,
    shadowed: bool,
}

fn collect(
    directory: &ResourceDirectory,
    namespace: Option<Namespace>,
    all: bool,
) -> anyhow::Result<Vec<ListedRecord>> {
    let handles: Vec<RecordHandle> = match (namespace, all) {
        (Some(ns), false) => directory.enumerate(ns).collect(),
        _ => directory
            .iter()
            .filter(|(_, record)| namespace.is_none_or(|ns| record.namespace() == ns))
            .map(|(handle, _)| handle)
            .collect(),
    };

    let mut listed = Vec::with_capacity(handles.len());
    for handle in handles {
        let shadowed = directory.is_shadowed(handle)?;
        if shadowed && !all {
            continue;
        }
        let record = directory.record(handle)?;
        listed.push(ListedRecord {
            index: handle.index(),
            name: record.name().as_str(),
            path: record.path().map(str::to_string),
            namespace: record.namespace(),
            size: record.size(),
            source: record.source().0,
            backing: format!("{:?}", record.backing_kind()),
            shadowed,
        });
    }
    Ok(listed)
}

/// List records of the loaded containers
pub fn handle(
    sources: &Sources,
    namespace: Option<Namespace>,
    all: bool,
    config: DirectoryConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let directory = sources.load(config)?;
    let listed = collect(&directory, namespace, all)?;

    match format {
        OutputFormat::Json => print_json(&listed)?,
        OutputFormat::Text => {
            if listed.is_empty() {
                println!("No records found");
                return Ok(());
            }
            let mut table = create_table(&["#", "Name", "Namespace", "Size", "Source", "Path"]);
            for record in &listed {
                let name = if record.shadowed {
                    format!("{} (shadowed)", record.name)
                } else {
                    record.name.clone()
                };
                table.add_row(vec![
                    record.index.to_string(),
                    name,
                    record.namespace.to_string(),
                    format_size(record.size),
                    record.source.to_string(),
                    record.path.clone().unwrap_or_default(),
                ]);
            }
            align_right(&mut table, &[0, 3, 4]);
            println!("{table}");
            println!("{} records", listed.len());
        }
    }
    Ok(())
}
