//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Service configuration loaded from the TOML config file (with
/// environment-variable overrides applied by the binary).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ServiceConfig {
    /// Address the HTTP server binds to, e.g. "127.0.0.1:5730"
    pub bind_addr: Option<String>,
    /// Delivery endpoint the webhook notifier POSTs notifications to.
    /// When absent, notifications are logged only.
    pub notify_url: Option<String>,
    /// Root folder override (lowest-priority source besides the default)
    pub root_folder: Option<String>,
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>, env_var_name: &str) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = find_config_file() {
        if let Ok(config) = load_service_config(&config_path) {
            if let Some(root_folder) = config.root_folder {
                return PathBuf::from(root_folder);
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Load and parse the service TOML config file
pub fn load_service_config(path: &Path) -> Result<ServiceConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}

/// Load the service config from the default location, or defaults when
/// no config file exists.
pub fn load_default_service_config() -> ServiceConfig {
    match find_config_file() {
        Ok(path) => load_service_config(&path).unwrap_or_default(),
        Err(_) => ServiceConfig::default(),
    }
}

/// Get default configuration file path for the platform
fn find_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/koimatch/config.toml first, then /etc/koimatch/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("koimatch").join("config.toml"));
        let system_config = PathBuf::from("/etc/koimatch/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    }

    let config_path = dirs::config_dir()
        .map(|d| d.join("koimatch").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if config_path.exists() {
        Ok(config_path)
    } else {
        Err(Error::Config(format!(
            "Config file not found: {:?}",
            config_path
        )))
    }
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("koimatch"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/koimatch"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("koimatch"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/koimatch"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("koimatch"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\koimatch"))
    } else {
        PathBuf::from("./koimatch_data")
    }
}

/// Database file path within the root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join("koimatch.db")
}
