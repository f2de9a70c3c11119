use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Improperly configured: {message}")]
    ImproperlyConfigured { message: String },

    #[error("Database connection failed: {message}")]
    ConnectionError { message: String },

    #[error("Failed to write to collection '{collection}': {message}")]
    WriteError { collection: String, message: String },

    #[error("Document query failed: {message}")]
    QueryError { message: String },

    #[error("Failed to read document: {message}")]
    DocumentError { message: String },

    #[error("Crawler '{crawler}' failed on {link}: {message}")]
    CrawlError {
        crawler: String,
        link: String,
        message: String,
    },

    #[error("HTTP {status} returned by {url}")]
    HttpStatusError { url: String, status: u16 },

    #[error("Command '{command}' failed: {message}")]
    CommandError { command: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Storage,
    Extraction,
    Processing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::ImproperlyConfigured { .. }
            | EtlError::UrlError(_) => ErrorCategory::Configuration,
            EtlError::ApiError(_) | EtlError::HttpStatusError { .. } => ErrorCategory::Network,
            EtlError::ConnectionError { .. }
            | EtlError::WriteError { .. }
            | EtlError::QueryError { .. }
            | EtlError::DocumentError { .. }
            | EtlError::ZipError(_) => ErrorCategory::Storage,
            EtlError::CrawlError { .. } => ErrorCategory::Extraction,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::ProcessingError { .. } => ErrorCategory::Processing,
            EtlError::IoError(_) | EtlError::CommandError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::ApiError(_)
            | EtlError::HttpStatusError { .. }
            | EtlError::CrawlError { .. }
            | EtlError::ConnectionError { .. } => ErrorSeverity::Medium,
            EtlError::IoError(_) | EtlError::CommandError { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.severity() == ErrorSeverity::Medium
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the run config and settings (.env, environment variables or the settings secret file)"
            }
            ErrorCategory::Network => "Check network access to the crawled sites and retry",
            ErrorCategory::Storage => {
                "Check DATABASE_PATH is writable and no other process holds the database open"
            }
            ErrorCategory::Extraction => "The page layout may have changed; retry or drop the link",
            ErrorCategory::Processing => "Inspect the crawled data for unexpected content",
            ErrorCategory::System => {
                "Check disk space, permissions and that git is installed and on PATH"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Could not reach a remote site: {}", self),
            ErrorCategory::Storage => format!("Document store problem: {}", self),
            ErrorCategory::Extraction => format!("Crawling failed: {}", self),
            ErrorCategory::Processing => format!("Data processing failed: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

impl From<toml::de::Error> for EtlError {
    fn from(e: toml::de::Error) -> Self {
        EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        }
    }
}

impl From<toml::ser::Error> for EtlError {
    fn from(e: toml::ser::Error) -> Self {
        EtlError::ConfigError {
            message: format!("TOML serialization error: {}", e),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
