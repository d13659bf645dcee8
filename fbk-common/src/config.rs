//! Configuration loading and root folder resolution
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (handled by each binary)
//! 2. Environment variable
//! 3. TOML config file (`~/.config/fbk/<module>.toml`)
//! 4. OS-dependent compiled default
//!
//! A missing or unreadable config file never aborts startup; the module logs a
//! warning and continues with defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Primary environment variable for the root folder
pub const ENV_ROOT_FOLDER: &str = "FBK_ROOT_FOLDER";
/// Alternative environment variable for the root folder
pub const ENV_ROOT: &str = "FBK_ROOT";
/// Language model account identifier override
pub const ENV_LLM_ACCOUNT_ID: &str = "FBK_LLM_ACCOUNT_ID";
/// Language model API token override
pub const ENV_LLM_API_TOKEN: &str = "FBK_LLM_API_TOKEN";
/// Language model base URL override
pub const ENV_LLM_BASE_URL: &str = "FBK_LLM_BASE_URL";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "fbk.db";

/// Compiled-in defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            log_level: "info".to_string(),
        }
    }
}

fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("fbk"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/fbk"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("fbk"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/fbk"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("fbk"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\fbk"))
    } else {
        PathBuf::from("./fbk_data")
    }
}

/// Logging section of the TOML config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// HTTP listener section of the TOML config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5730
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Language model gateway section of the TOML config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model used for structured analysis (message mode)
    #[serde(default = "default_analysis_model")]
    pub analysis_model: String,
    /// Model used for rolling summaries (prompt mode)
    #[serde(default = "default_summary_model")]
    pub summary_model: String,
    /// Deadline for a single model call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.cloudflare.com/client/v4".to_string()
}

fn default_analysis_model() -> String {
    "@cf/meta/llama-3-8b-instruct".to_string()
}

fn default_summary_model() -> String {
    "@cf/meta/llama-3.1-8b-instruct".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            account_id: None,
            api_token: None,
            base_url: default_base_url(),
            analysis_model: default_analysis_model(),
            summary_model: default_summary_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl LlmConfig {
    /// Override credentials and endpoint from the environment
    pub fn apply_env_overrides(&mut self) {
        if let Some(value) = env_value(ENV_LLM_ACCOUNT_ID) {
            self.account_id = Some(value);
        }
        if let Some(value) = env_value(ENV_LLM_API_TOKEN) {
            self.api_token = Some(value);
        }
        if let Some(value) = env_value(ENV_LLM_BASE_URL) {
            self.base_url = value;
        }
    }

    /// Account id, or a configuration error naming every place it can be set
    pub fn require_account_id(&self) -> Result<&str> {
        self.account_id
            .as_deref()
            .filter(|v| is_configured(v))
            .ok_or_else(|| {
                Error::Config(format!(
                    "Language model account id not configured. Set {} or [llm] account_id in the TOML config",
                    ENV_LLM_ACCOUNT_ID
                ))
            })
    }

    /// API token, or a configuration error naming every place it can be set
    pub fn require_api_token(&self) -> Result<&str> {
        self.api_token
            .as_deref()
            .filter(|v| is_configured(v))
            .ok_or_else(|| {
                Error::Config(format!(
                    "Language model API token not configured. Set {} or [llm] api_token in the TOML config",
                    ENV_LLM_API_TOKEN
                ))
            })
    }
}

/// Module TOML config file contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_folder: Option<PathBuf>,
    /// Number of most recent records fed to the rolling summary
    #[serde(default = "default_summary_window")]
    pub summary_window: u32,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

fn default_summary_window() -> u32 {
    20
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            summary_window: default_summary_window(),
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }
}

/// Resolves the root folder and module config for one FBK module
pub struct RootFolderResolver {
    module_name: String,
}

impl RootFolderResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
        }
    }

    /// Resolve the root folder (environment → TOML → compiled default)
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = env_value(ENV_ROOT_FOLDER) {
            return PathBuf::from(path);
        }
        if let Some(path) = env_value(ENV_ROOT) {
            return PathBuf::from(path);
        }

        if let Some(path) = self.load_config().root_folder {
            return path;
        }

        CompiledDefaults::for_current_platform().root_folder
    }

    /// Load the module TOML config, falling back to defaults when missing or invalid
    pub fn load_config(&self) -> TomlConfig {
        let Some(path) = self.config_file_path() else {
            return TomlConfig::default();
        };

        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return TomlConfig::default();
        }

        match TomlConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                TomlConfig::default()
            }
        }
    }

    /// `~/.config/fbk/<module>.toml` on every platform `dirs` knows about
    pub fn config_file_path(&self) -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("fbk").join(format!("{}.toml", self.module_name)))
    }
}

/// Prepares the resolved root folder for use
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder (and parents) if missing; idempotent
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }
}

/// A setting counts as configured when it is not blank
pub fn is_configured(value: &str) -> bool {
    !value.trim().is_empty()
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| is_configured(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_configured() {
        assert!(is_configured("abc"));
        assert!(!is_configured(""));
        assert!(!is_configured("   \t"));
    }

    #[test]
    fn test_llm_defaults_use_distinct_models() {
        let llm = LlmConfig::default();
        assert_eq!(llm.analysis_model, "@cf/meta/llama-3-8b-instruct");
        assert_eq!(llm.summary_model, "@cf/meta/llama-3.1-8b-instruct");
        assert_eq!(llm.timeout_secs, 30);
    }

    #[test]
    fn test_require_api_token_rejects_blank() {
        let llm = LlmConfig {
            api_token: Some("  ".to_string()),
            ..LlmConfig::default()
        };
        assert!(matches!(llm.require_api_token(), Err(Error::Config(_))));
    }
}
