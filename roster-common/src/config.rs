//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration is layered. Highest priority first:
//! 1. Command-line argument
//! 2. Environment variable (`ROSTER_ROOT_FOLDER`, then `ROSTER_ROOT`)
//! 3. TOML config file (`<config_dir>/roster/<module>.toml`)
//! 4. OS-dependent compiled default
//!
//! A missing or unreadable TOML file is never fatal: a warning is logged
//! and compiled defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Primary environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "ROSTER_ROOT_FOLDER";

/// Alternate environment variable naming the root folder
pub const ROOT_ENV: &str = "ROSTER_ROOT";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "roster.db";

/// Temporary upload directory name inside the root folder
pub const UPLOADS_DIR_NAME: &str = "uploads";

/// Compiled fallback values used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub port: u16,
    pub bind_address: String,
    pub max_upload_bytes: u64,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl CompiledDefaults {
    /// Defaults for the platform this binary was built for
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            port: 3001,
            bind_address: "127.0.0.1".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
            cors_origins: vec![
                "http://localhost:8080".to_string(),
                "http://localhost:3000".to_string(),
            ],
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

/// Bootstrap configuration loaded from TOML
///
/// Every field is optional; absent values fall through to the next
/// resolution tier.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub bind_address: Option<String>,

    /// Largest accepted spreadsheet upload, in bytes
    #[serde(default)]
    pub max_upload_bytes: Option<u64>,

    /// Origins allowed by the CORS layer
    #[serde(default)]
    pub cors_origins: Option<Vec<String>>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Path of the TOML file for a module, if a config directory exists on this platform
pub fn config_file_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("roster").join(format!("{}.toml", module_name)))
}

/// Parse a TOML config file
pub fn load_toml_config_from(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Load the module's TOML config
///
/// A missing file yields defaults. An unreadable or invalid file yields
/// defaults plus the error, so a caller can report it once logging is up.
pub fn read_toml_config(module_name: &str) -> (TomlConfig, Option<Error>) {
    match config_file_path(module_name) {
        Some(path) if path.exists() => match load_toml_config_from(&path) {
            Ok(config) => (config, None),
            Err(e) => (TomlConfig::default(), Some(e)),
        },
        Some(path) => {
            debug!("Config file not found: {}", path.display());
            (TomlConfig::default(), None)
        }
        None => (TomlConfig::default(), None),
    }
}

/// Resolves the root folder holding the database and upload directory
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    toml_root: Option<Option<PathBuf>>,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
            toml_root: None,
        }
    }

    /// Highest-priority override from the command line
    pub fn with_cli_arg(mut self, cli_arg: Option<PathBuf>) -> Self {
        self.cli_arg = cli_arg;
        self
    }

    /// Use an already-loaded TOML config instead of reading the file again
    pub fn with_toml_config(mut self, config: &TomlConfig) -> Self {
        self.toml_root = Some(config.root_folder.clone());
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        for var in [ROOT_FOLDER_ENV, ROOT_ENV] {
            if let Ok(path) = std::env::var(var) {
                if !path.trim().is_empty() {
                    return PathBuf::from(path);
                }
            }
        }

        let toml_root = match &self.toml_root {
            Some(root) => root.clone(),
            None => {
                let (config, problem) = read_toml_config(&self.module_name);
                if let Some(e) = problem {
                    warn!("{} (using compiled defaults)", e);
                }
                config.root_folder
            }
        };
        if let Some(path) = toml_root {
            return path;
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Creates the root folder layout and derives paths inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder and its upload directory if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        std::fs::create_dir_all(self.uploads_dir())?;
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.root_folder.join(UPLOADS_DIR_NAME)
    }
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/roster (or /var/lib/roster for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("roster"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/roster"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/roster
        dirs::data_dir()
            .map(|d| d.join("roster"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/roster"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\roster
        dirs::data_local_dir()
            .map(|d| d.join("roster"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\roster"))
    } else {
        PathBuf::from("./roster_data")
    }
}
