use crate::core::repository::{StoreKeys, DEFAULT_DATA_KEY, DEFAULT_OVERRIDES_KEY};
use crate::utils::error::{LeaderboardError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_one_of, validate_path, validate_range,
    validate_required_field, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

pub const DEFAULT_CONFIG_FILE: &str = "leaderboard.toml";
pub const EXPORT_FORMATS: [&str; 3] = ["csv", "tsv", "json"];

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub admin: AdminConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    File,
    Rest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub directory: Option<String>,
    pub url: Option<String>,
    pub token: Option<String>,
    pub timeout_seconds: u64,
    /// Mirror the REST store in memory and keep serving when it is down.
    pub fallback: bool,
    pub data_key: String,
    pub overrides_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::File,
            directory: Some("./data".to_string()),
            url: None,
            token: None,
            timeout_seconds: 10,
            fallback: true,
            data_key: DEFAULT_DATA_KEY.to_string(),
            overrides_key: DEFAULT_OVERRIDES_KEY.to_string(),
        }
    }
}

impl StoreConfig {
    pub fn keys(&self) -> StoreKeys {
        StoreKeys {
            participants: self.data_key.clone(),
            overrides: self.overrides_key.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Required in `X-Access-Code` on write routes when set.
    pub access_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_path: String,
    pub formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: "./output".to_string(),
            formats: vec!["csv".to_string(), "json".to_string()],
            compression: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    #[serde(default = "default_archive_name")]
    pub filename: String,
}

fn default_archive_name() -> String {
    "leaderboard.zip".to_string()
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LeaderboardError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| LeaderboardError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// An explicit path must exist; otherwise `leaderboard.toml` is used when
    /// present and built-in defaults when not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                tracing::info!("Loading configuration from {}", path.display());
                Self::from_file(path)
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                tracing::info!("Loading configuration from {}", DEFAULT_CONFIG_FILE);
                Self::from_file(DEFAULT_CONFIG_FILE)
            }
            None => {
                tracing::debug!("No configuration file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// 替換環境變數 (例如 ${KV_REST_API_TOKEN})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("server.bind", &self.server.bind)?;
        validate_range("server.port", self.server.port, 1, u16::MAX)?;

        match self.store.backend {
            StoreBackend::Memory => {}
            StoreBackend::File => {
                let directory = validate_required_field("store.directory", &self.store.directory)?;
                validate_path("store.directory", directory)?;
            }
            StoreBackend::Rest => {
                let url = validate_required_field("store.url", &self.store.url)?;
                validate_url("store.url", url)?;
                validate_range("store.timeout_seconds", self.store.timeout_seconds, 1, 300)?;
            }
        }
        validate_non_empty_string("store.data_key", &self.store.data_key)?;
        validate_non_empty_string("store.overrides_key", &self.store.overrides_key)?;
        if self.store.data_key == self.store.overrides_key {
            return Err(LeaderboardError::InvalidConfigValueError {
                field: "store.overrides_key".to_string(),
                value: self.store.overrides_key.clone(),
                reason: "must differ from store.data_key".to_string(),
            });
        }

        if let Some(code) = &self.admin.access_code {
            validate_non_empty_string("admin.access_code", code)?;
        }

        validate_path("export.output_path", &self.export.output_path)?;
        validate_one_of("export.formats", &self.export.formats, &EXPORT_FORMATS)?;
        if let Some(compression) = &self.export.compression {
            if compression.enabled {
                validate_path("export.compression.filename", &compression.filename)?;
            }
        }

        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[server]
bind = "127.0.0.1"
port = 8080
cors_origins = ["https://gcsl.example.com"]

[store]
backend = "rest"
url = "https://sharp-condor.upstash.io"
token = "abc"
data_key = "gcsl-data"
overrides_key = "gcsl-fixed-rankings"

[admin]
access_code = "letmein"

[export]
output_path = "./out"
formats = ["csv", "tsv"]

[export.compression]
enabled = true
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.backend, StoreBackend::Rest);
        assert!(config.store.fallback);
        assert_eq!(config.admin.access_code.as_deref(), Some("letmein"));
        assert_eq!(
            config.export.compression.as_ref().unwrap().filename,
            "leaderboard.zip"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.store.backend, StoreBackend::File);
        assert_eq!(config.store.keys(), StoreKeys::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("GCSL_TEST_KV_TOKEN", "from-env");

        let toml_content = r#"
[store]
backend = "rest"
url = "https://kv.example.com"
token = "${GCSL_TEST_KV_TOKEN}"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.store.token.as_deref(), Some("from-env"));

        std::env::remove_var("GCSL_TEST_KV_TOKEN");
    }

    #[test]
    fn test_rest_backend_requires_url() {
        let config = AppConfig::from_toml_str("[store]\nbackend = \"rest\"\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(LeaderboardError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_config_validation_rejects_bad_values() {
        let bad_format = AppConfig::from_toml_str("[export]\nformats = [\"xlsx\"]\n").unwrap();
        assert!(bad_format.validate().is_err());

        let same_keys =
            AppConfig::from_toml_str("[store]\ndata_key = \"k\"\noverrides_key = \"k\"\n").unwrap();
        assert!(same_keys.validate().is_err());

        let blank_code = AppConfig::from_toml_str("[admin]\naccess_code = \"  \"\n").unwrap();
        assert!(blank_code.validate().is_err());
    }

    #[test]
    fn test_unknown_backend_is_parse_error() {
        assert!(matches!(
            AppConfig::from_toml_str("[store]\nbackend = \"sqlite\"\n"),
            Err(LeaderboardError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nport = 4100\n")
            .unwrap();

        let config = AppConfig::load(Some(temp_file.path())).unwrap();
        assert_eq!(config.server.port, 4100);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        assert!(AppConfig::load(Some(Path::new("/nonexistent/leaderboard.toml"))).is_err());
    }
}
