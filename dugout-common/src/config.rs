//! Configuration loading and root folder resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Database file name inside the root folder
const DATABASE_FILE: &str = "dugout.db";

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `DUGOUT_ROOT` environment variable
/// 3. TOML config file (`root_folder` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var("DUGOUT_ROOT") {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml_content.parse::<toml::Value>() {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(root_folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Create the root folder if it does not exist yet
pub fn ensure_root_folder(root: &std::path::Path) -> Result<()> {
    std::fs::create_dir_all(root)?;
    Ok(())
}

/// Path of the SQLite database inside the root folder
pub fn database_path(root: &std::path::Path) -> PathBuf {
    root.join(DATABASE_FILE)
}

/// OCR collaborator settings
///
/// The read/analyze endpoint and subscription key of the external OCR
/// service. Both must be present for image ingestion to be available;
/// the service still starts without them (queries keep working).
#[derive(Debug, Clone)]
pub struct OcrSettings {
    pub endpoint: String,
    pub api_key: String,
}

impl OcrSettings {
    /// Resolve OCR settings from environment, falling back to the TOML
    /// config file (`[ocr]` table with `endpoint` / `api_key` keys).
    pub fn resolve() -> Result<Self> {
        let env_endpoint = std::env::var("DUGOUT_OCR_ENDPOINT").ok();
        let env_key = std::env::var("DUGOUT_OCR_KEY").ok();

        if let (Some(endpoint), Some(api_key)) = (env_endpoint.clone(), env_key.clone()) {
            return Ok(Self { endpoint, api_key });
        }

        let config_path = locate_config_file()?;
        let toml_content = std::fs::read_to_string(&config_path)?;
        let config = toml_content
            .parse::<toml::Value>()
            .map_err(|e| Error::Config(format!("Invalid config file: {}", e)))?;

        let ocr = config
            .get("ocr")
            .ok_or_else(|| Error::Config("No [ocr] section in config file".to_string()))?;

        let endpoint = env_endpoint
            .or_else(|| ocr.get("endpoint").and_then(|v| v.as_str()).map(String::from))
            .ok_or_else(|| Error::Config("OCR endpoint not configured".to_string()))?;
        let api_key = env_key
            .or_else(|| ocr.get("api_key").and_then(|v| v.as_str()).map(String::from))
            .ok_or_else(|| Error::Config("OCR API key not configured".to_string()))?;

        Ok(Self { endpoint, api_key })
    }
}

/// Get default configuration file path for the platform
fn locate_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/dugout/config.toml first, then /etc/dugout/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("dugout").join("config.toml"));
        let system_config = PathBuf::from("/etc/dugout/config.toml");

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
        .map(|d| d.join("dugout").join("config.toml"))
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
            .map(|d| d.join("dugout"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/dugout"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("dugout"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/dugout"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("dugout"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\dugout"))
    } else {
        PathBuf::from("./dugout_data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_arg_takes_priority() {
        let root = resolve_root_folder(Some("/tmp/dugout-test"));
        assert_eq!(root, PathBuf::from("/tmp/dugout-test"));
    }

    #[test]
    fn test_database_path_joins_file_name() {
        let root = PathBuf::from("/tmp/dugout-test");
        assert_eq!(
            database_path(&root),
            PathBuf::from("/tmp/dugout-test/dugout.db")
        );
    }

    #[test]
    fn test_ensure_root_folder_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("root");
        ensure_root_folder(&root).unwrap();
        assert!(root.is_dir());
    }
}
