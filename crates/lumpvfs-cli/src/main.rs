use clap::Parser;
use lumpvfs_cli::{Commands, OutputFormat, commands};
use lumpvfs_directory::DirectoryConfig;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "lumpvfs",
    about = "Inspect and extract records from WAD, zip and loose-directory containers",
    version,
    author,
    long_about = "Loads containers in the order given, merges them into one resource directory \
                  where later containers shadow earlier ones, and lists or extracts the \
                  resulting records."
)]
struct Cli {
    /// Set the logging level
    #[arg(short, long, value_enum, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Path to a JSON directory configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, value_enum, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(Level::from(cli.log_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => DirectoryConfig::from_file(path)?,
        None => DirectoryConfig::default(),
    };

    match cli.command {
        Commands::List {
            sources,
            namespace,
            all,
        } => commands::list::handle(&sources, namespace, all, config, cli.format)?,
        Commands::Info { sources } => commands::info::handle(&sources, config, cli.format)?,
        Commands::Extract {
            sources,
            name,
            out,
            namespace,
            path,
        } => commands::extract::handle(&sources, &name, path, namespace, &out, config, cli.format)?,
    }

    Ok(())
}
