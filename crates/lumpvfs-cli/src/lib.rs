//! lumpvfs command-line library
//!
//! Argument types and command handlers for the `lumpvfs` binary.

pub mod commands;
pub mod output;

use clap::{Args, Subcommand, ValueEnum};
use lumpvfs_directory::{AddOptions, DirectoryConfig, Namespace, ResourceDirectory};
use std::path::PathBuf;
use tracing::debug;

pub use crate::commands::{
    extract::handle as handle_extract, info::handle as handle_info, list::handle as handle_list,
};

/// Output format for command results
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human readable tables
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Containers to load, in load order
#[derive(Args, Debug, Clone)]
pub struct Sources {
    /// Container paths; later containers shadow earlier ones
    #[arg(required = true)]
    pub containers: Vec<PathBuf>,

    /// Try default extensions and search paths for missing containers
    #[arg(long)]
    pub inexact: bool,

    /// Extra directory searched for containers (repeatable)
    #[arg(long = "search-path", env = "LUMPVFS_PATH")]
    pub search_paths: Vec<PathBuf>,
}

impl Sources {
    /// Build a directory from these sources
    pub fn load(&self, config: DirectoryConfig) -> anyhow::Result<ResourceDirectory> {
        let config = self
            .search_paths
            .iter()
            .fold(config, |config, path| config.with_search_path(path));
        let mut directory = ResourceDirectory::with_config(config)?;

        let options = if self.inexact {
            AddOptions::new().inexact()
        } else {
            AddOptions::new()
        };
        for path in &self.containers {
            let source = directory.add_container(path, &options)?;
            debug!("Loaded {} as {}", path.display(), source);
        }
        Ok(directory)
    }
}

/// lumpvfs subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List records
    List {
        #[command(flatten)]
        sources: Sources,

        /// Only this namespace
        #[arg(short, long)]
        namespace: Option<Namespace>,

        /// Include records shadowed by later containers
        #[arg(short, long)]
        all: bool,
    },

    /// Show loaded containers and record counts
    Info {
        #[command(flatten)]
        sources: Sources,
    },

    /// Write one record's bytes to a file
    Extract {
        #[command(flatten)]
        sources: Sources,

        /// Short name, or full path with `--path`
        #[arg(short = 'N', long)]
        name: String,

        /// Destination file
        #[arg(short = 'O', long)]
        out: PathBuf,

        /// Restrict the lookup to one namespace
        #[arg(short, long)]
        namespace: Option<Namespace>,

        /// Treat NAME as a full container path
        #[arg(long)]
        path: bool,
    },
}
