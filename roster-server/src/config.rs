//! Server configuration
//!
//! Resolution order for every setting: CLI flag (or its environment
//! variable), then the TOML file, then compiled defaults.

use clap::Parser;
use roster_common::config::{CompiledDefaults, RootFolderResolver, TomlConfig};
use std::path::PathBuf;

/// Module name used for the TOML file (`<config_dir>/roster/roster-server.toml`)
pub const MODULE_NAME: &str = "roster-server";

/// Command-line arguments for roster-server
#[derive(Parser, Debug, Default, Clone)]
#[command(name = "roster-server")]
#[command(about = "Classroom portal back end: roster import and student records")]
#[command(version)]
pub struct Cli {
    /// Folder holding roster.db and the uploads folder
    #[arg(long, env = "ROSTER_ROOT_FOLDER")]
    pub root_folder: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "ROSTER_PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long = "bind", env = "ROSTER_BIND")]
    pub bind_address: Option<String>,

    /// Largest accepted upload, in bytes
    #[arg(long, env = "ROSTER_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: Option<u64>,

    /// Create the database schema and exit
    #[arg(long)]
    pub init_db: bool,
}

/// Fully resolved server settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub root_folder: PathBuf,
    pub port: u16,
    pub bind_address: String,
    pub max_upload_bytes: u64,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl ServerConfig {
    pub fn resolve_with(cli: &Cli, toml: &TomlConfig) -> Self {
        let defaults = CompiledDefaults::for_current_platform();

        let root_folder = RootFolderResolver::new(MODULE_NAME)
            .with_cli_arg(cli.root_folder.clone())
            .with_toml_config(toml)
            .resolve();

        Self {
            root_folder,
            port: cli.port.or(toml.port).unwrap_or(defaults.port),
            bind_address: cli
                .bind_address
                .clone()
                .or_else(|| toml.bind_address.clone())
                .unwrap_or(defaults.bind_address),
            max_upload_bytes: cli
                .max_upload_bytes
                .or(toml.max_upload_bytes)
                .unwrap_or(defaults.max_upload_bytes),
            cors_origins: toml.cors_origins.clone().unwrap_or(defaults.cors_origins),
            log_level: if toml.logging.level.trim().is_empty() {
                defaults.log_level
            } else {
                toml.logging.level.clone()
            },
            log_file: toml.logging.file.clone().or(defaults.log_file),
        }
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
