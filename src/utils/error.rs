use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Database connection failed: {message}")]
    ConnectionError { message: String },

    #[error("Table '{table}' could not be created: {message}")]
    SchemaError { table: String, message: String },

    #[error("HTTP {status} from {url}")]
    TransportError { status: u16, url: String },

    #[error("Insert into '{table}' failed at row {row}: {message}")]
    InsertError {
        table: String,
        row: i64,
        message: String,
    },

    #[error("Product {product_id} is not in the product catalog")]
    CatalogError { product_id: i64 },

    #[error("Unexpected response shape: {message}")]
    DecodeError { message: String },

    #[error("OAuth authorization failed: {message}")]
    AuthError { message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Console prompt failed: {0}")]
    PromptError(#[from] dialoguer::Error),
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Connectivity,
    Schema,
    Transport,
    Persistence,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 設定不完整，未觸及任何外部資源
    Low,
    /// 只影響單一報表
    Medium,
    /// 中止整個執行
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            EtlError::ConnectionError { .. } | EtlError::IoError(_) => ErrorCategory::Connectivity,
            EtlError::SchemaError { .. } => ErrorCategory::Schema,
            EtlError::TransportError { .. }
            | EtlError::ApiError(_)
            | EtlError::AuthError { .. }
            | EtlError::PromptError(_) => ErrorCategory::Transport,
            EtlError::InsertError { .. } | EtlError::DatabaseError(_) => {
                ErrorCategory::Persistence
            }
            EtlError::CatalogError { .. }
            | EtlError::DecodeError { .. }
            | EtlError::SerializationError(_) => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::Low,
            ErrorCategory::Schema => ErrorSeverity::Medium,
            ErrorCategory::Transport | ErrorCategory::Persistence | ErrorCategory::Data => {
                ErrorSeverity::High
            }
            ErrorCategory::Connectivity => ErrorSeverity::Critical,
        }
    }

    /// 只有建表失敗會跳過該報表，其餘錯誤都中止整個執行
    pub fn skips_report(&self) -> bool {
        matches!(self, EtlError::SchemaError { .. })
    }

    /// 設定錯誤與 HTTP 失敗直接結束 (0)；連線、建表、寫入與資料錯誤為 1
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Transport => 0,
            _ => 1,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => {
                "Fill in the missing values in the configuration file and run again"
            }
            EtlError::ConnectionError { .. } | EtlError::IoError(_) => {
                "Make sure the database path is correct and writable"
            }
            EtlError::SchemaError { .. } => "Check the table name and database permissions",
            EtlError::TransportError { status: 401 | 403, .. } | EtlError::AuthError { .. } => {
                "Check the API credentials; for Appfigures clear the stored access token to re-authorize"
            }
            EtlError::TransportError { .. } | EtlError::ApiError(_) => {
                "Check network connectivity and the API endpoint, then run again"
            }
            EtlError::InsertError { .. } | EtlError::DatabaseError(_) => {
                "The table is replaced on every run; fix the database problem and run again"
            }
            EtlError::CatalogError { .. } => {
                "The product listing and sales report disagree; run again once the API is consistent"
            }
            EtlError::DecodeError { .. } | EtlError::SerializationError(_) => {
                "The API returned an unexpected payload; check the endpoint URL"
            }
            EtlError::PromptError(_) => "Run from an interactive terminal to complete authorization",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::MissingConfigError { field } => {
                format!("The {} setting is missing! Please make sure it has been added to the config file.", field)
            }
            EtlError::ConnectionError { .. } => {
                "Something went wrong while trying to connect to the database!".to_string()
            }
            EtlError::SchemaError { table, .. } => {
                format!("The {} table could not be generated. Aborting...", table)
            }
            EtlError::TransportError { status, .. } => {
                format!("Status: {} Problem with the request. Exiting.", status)
            }
            EtlError::InsertError { table, .. } => {
                format!("There was an issue adding in data to the {} table. Aborting...", table)
            }
            other => other.to_string(),
        }
    }
}
