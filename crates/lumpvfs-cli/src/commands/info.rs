//! `lumpvfs info`

use crate::output::{align_right, create_table, format_size, print_json};
use crate::{OutputFormat, Sources};
use lumpvfs_directory::{DirectoryConfig, Namespace};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ContainerSummary {
    source: u32,
    kind: String,
    role: Option<String>,
    name: String,
    records: usize,
}

#[derive(Debug, Serialize)]
struct Summary {
    containers: Vec<ContainerSummary>,
    records: usize,
    namespaces: Vec<(Namespace, usize)>,
    base_source: Option<u32>,
}

/// Show loaded containers and per-namespace counts
pub fn handle(
    sources: &Sources,
    config: DirectoryConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let directory = sources.load(config)?;
    let diagnostics = directory.diagnostics();

    let summary = Summary {
        containers: diagnostics
            .containers
            .iter()
            .map(|info| ContainerSummary {
                source: info.source.0,
                kind: info.kind.to_string(),
                role: info.role.map(|role| format!("{role:?}")),
                name: info.name.clone(),
                records: info.record_count,
            })
            .collect(),
        records: directory.len(),
        namespaces: Namespace::ALL
            .into_iter()
            .map(|ns| (ns, directory.enumerate(ns).count()))
            .filter(|&(_, count)| count > 0)
            .collect(),
        base_source: diagnostics.base_source.map(|source| source.0),
    };

    match format {
        OutputFormat::Json => print_json(&summary)?,
        OutputFormat::Text => {
            let mut table = create_table(&["Source", "Kind", "Role", "Records", "Name"]);
            for container in &summary.containers {
                table.add_row(vec![
                    container.source.to_string(),
                    container.kind.clone(),
                    container.role.clone().unwrap_or_else(|| "-".to_string()),
                    container.records.to_string(),
                    container.name.clone(),
                ]);
            }
            align_right(&mut table, &[0, 3]);
            println!("{table}");

            let mut namespaces = create_table(&["Namespace", "Visible records"]);
            for (ns, count) in &summary.namespaces {
                namespaces.add_row(vec![ns.to_string(), count.to_string()]);
            }
            align_right(&mut namespaces, &[1]);
            println!("{namespaces}");

            let stats = directory.stats();
            println!(
                "{} containers, {} records ({} total bytes)",
                stats.container_count,
                stats.record_count,
                format_size(directory.iter().map(|(_, record)| record.size()).sum())
            );
        }
    }
    Ok(())
}
