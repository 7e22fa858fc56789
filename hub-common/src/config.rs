//! Configuration loading and data folder resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Database file name inside the data folder
pub const DB_FILE_NAME: &str = "handyhub.db";

/// Data folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_folder(cli_arg: Option<&str>, env_var_name: &str) -> PathBuf {
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
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(data_folder) = config.get("data_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(data_folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_data_folder()
}

/// Full path of the SQLite database inside a data folder
pub fn database_path(data_folder: &std::path::Path) -> PathBuf {
    data_folder.join(DB_FILE_NAME)
}

/// Locate the configuration file for the platform
fn find_config_file() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("handyhub").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/handyhub/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

/// OS-dependent default data folder path
fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("handyhub"))
        .unwrap_or_else(|| PathBuf::from("./handyhub_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_arg_takes_priority() {
        let folder = resolve_data_folder(Some("/tmp/hub-test"), "HANDYHUB_UNSET_VAR");
        assert_eq!(folder, PathBuf::from("/tmp/hub-test"));
    }

    #[test]
    fn test_database_path_appends_file_name() {
        let path = database_path(std::path::Path::new("/var/lib/handyhub"));
        assert_eq!(path, PathBuf::from("/var/lib/handyhub/handyhub.db"));
    }
}
