#[cfg(feature = "cli")]
pub mod cli;

use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_identifier, validate_not_placeholder, validate_range, validate_required,
    validate_url, Validate,
};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "report-config.toml";
const ZENDESK_PLACEHOLDER_DOMAIN: &str = "your_domain_here";
const ZENDESK_PLACEHOLDER_EMAIL: &str = "email@example.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub reports: ReportToggles,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub appfigures: AppfiguresConfig,
    #[serde(default)]
    pub zendesk: ZendeskConfig,
}

/// 要產生哪些報表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportToggles {
    #[serde(default)]
    pub appfigures: bool,
    #[serde(default)]
    pub zendesk: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    #[serde(default = "default_appfigures_table")]
    pub appfigures_table: String,
    #[serde(default = "default_zendesk_table")]
    pub zendesk_table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppfiguresConfig {
    #[serde(default = "default_appfigures_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub client_key: String,
    #[serde(default)]
    pub client_secret: String,
    pub access_token: Option<String>,
    pub access_token_secret: Option<String>,
    /// 只有長度相符的 access token 才會被視為有效
    #[serde(default = "default_access_token_length")]
    pub access_token_length: usize,
    #[serde(default = "default_starting_year")]
    pub starting_year: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZendeskConfig {
    #[serde(default = "default_zendesk_url")]
    pub url: String,
    #[serde(default = "default_zendesk_email")]
    pub email: String,
    #[serde(default)]
    pub api_token: String,
}

fn default_appfigures_table() -> String {
    "appfiguresdata".to_string()
}
fn default_zendesk_table() -> String {
    "zendeskdata".to_string()
}
fn default_appfigures_base_url() -> String {
    "https://api.appfigures.com/v2".to_string()
}
fn default_access_token_length() -> usize {
    16
}
fn default_starting_year() -> i32 {
    2011
}
fn default_zendesk_url() -> String {
    format!(
        "https://{}.zendesk.com/api/v2/ticket_metrics.json?page=1",
        ZENDESK_PLACEHOLDER_DOMAIN
    )
}
fn default_zendesk_email() -> String {
    ZENDESK_PLACEHOLDER_EMAIL.to_string()
}

impl Default for AppfiguresConfig {
    fn default() -> Self {
        Self {
            base_url: default_appfigures_base_url(),
            client_key: String::new(),
            client_secret: String::new(),
            access_token: None,
            access_token_secret: None,
            access_token_length: default_access_token_length(),
            starting_year: default_starting_year(),
        }
    }
}

impl Default for ZendeskConfig {
    fn default() -> Self {
        Self {
            url: default_zendesk_url(),
            email: default_zendesk_email(),
            api_token: String::new(),
        }
    }
}

impl ReportConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| EtlError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ZENDESK_API_TOKEN})；未設定的變數視為空字串
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .to_string()
    }

    pub fn any_report_enabled(&self) -> bool {
        self.reports.appfigures || self.reports.zendesk
    }

    fn validate_database(&self) -> Result<()> {
        validate_required("database.path", &self.database.path.to_string_lossy())?;
        validate_identifier("database.appfigures_table", &self.database.appfigures_table)?;
        validate_identifier("database.zendesk_table", &self.database.zendesk_table)?;
        Ok(())
    }

    fn validate_appfigures(&self) -> Result<()> {
        let cfg = &self.appfigures;
        validate_required("appfigures.client_key", &cfg.client_key)?;
        validate_required("appfigures.client_secret", &cfg.client_secret)?;
        validate_url("appfigures.base_url", &cfg.base_url)?;

        let current_year = chrono::Local::now().year();
        validate_range("appfigures.starting_year", cfg.starting_year, 1970, current_year)?;
        Ok(())
    }

    fn validate_zendesk(&self) -> Result<()> {
        let cfg = &self.zendesk;
        validate_url("zendesk.url", &cfg.url)?;
        validate_not_placeholder("zendesk.url", &cfg.url, ZENDESK_PLACEHOLDER_DOMAIN)?;
        validate_required("zendesk.email", &cfg.email)?;
        validate_not_placeholder("zendesk.email", &cfg.email, ZENDESK_PLACEHOLDER_EMAIL)?;
        validate_required("zendesk.api_token", &cfg.api_token)?;
        Ok(())
    }
}

impl Validate for ReportConfig {
    fn validate(&self) -> Result<()> {
        self.validate_database()?;
        if self.reports.appfigures {
            self.validate_appfigures()?;
        }
        if self.reports.zendesk {
            self.validate_zendesk()?;
        }
        Ok(())
    }
}
