use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_identifier, validate_non_empty_string, validate_path, validate_positive_number,
    Validate,
};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_SECRET_FILE: &str = "settings.secret.toml";

const DATABASE_PATH: &str = "DATABASE_PATH";
const DATABASE_NAME: &str = "DATABASE_NAME";
const HTTP_TIMEOUT_SECONDS: &str = "HTTP_TIMEOUT_SECONDS";
const USER_AGENT: &str = "USER_AGENT";
const GITHUB_IGNORE: &str = "GITHUB_IGNORE";

/// Application settings.
///
/// Resolved from the settings secret file when one exists, otherwise from
/// defaults overridden by environment variables (`.env` included, loaded by
/// the binary at start-up).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_path: String,
    pub database_name: String,
    pub http_timeout_seconds: u64,
    pub user_agent: String,
    pub github_ignore: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: "./data".to_string(),
            database_name: "llm-twin".to_string(),
            http_timeout_seconds: 30,
            user_agent: concat!("llm-twin-etl/", env!("CARGO_PKG_VERSION")).to_string(),
            github_ignore: [".git", ".toml", ".lock", ".png"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Settings {
    /// 由任意鍵值來源（環境變數、密鑰檔）組出設定，缺少的鍵使用預設值
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(value) = lookup(DATABASE_PATH) {
            settings.database_path = value;
        }
        if let Some(value) = lookup(DATABASE_NAME) {
            settings.database_name = value;
        }
        if let Some(value) = lookup(HTTP_TIMEOUT_SECONDS) {
            settings.http_timeout_seconds =
                value
                    .trim()
                    .parse()
                    .map_err(|e| EtlError::InvalidConfigValueError {
                        field: HTTP_TIMEOUT_SECONDS.to_string(),
                        value: value.clone(),
                        reason: format!("not a number: {}", e),
                    })?;
        }
        if let Some(value) = lookup(USER_AGENT) {
            settings.user_agent = value;
        }
        if let Some(value) = lookup(GITHUB_IGNORE) {
            settings.github_ignore = parse_list(&value);
        }

        Ok(settings)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_secret_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let values: HashMap<String, String> = toml::from_str(&content)?;
        Self::from_lookup(|key| values.get(key).cloned())
    }

    /// Loads settings from the secret file, falling back to the environment.
    pub fn load<P: AsRef<Path>>(secret_path: P) -> Result<Self> {
        let secret_path = secret_path.as_ref();
        tracing::info!("Loading settings from secret store: {}", secret_path.display());

        let settings = if secret_path.exists() {
            match Self::from_secret_file(secret_path) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!(
                        "Failed to read the settings secret ({}). Defaulting to environment variables and .env file.",
                        e
                    );
                    Self::from_env()?
                }
            }
        } else {
            tracing::warn!(
                "Settings secret not found. Defaulting to environment variables and .env file."
            );
            Self::from_env()?
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Every setting rendered as a string, keyed by its environment variable name.
    pub fn to_values(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (DATABASE_PATH.to_string(), self.database_path.clone()),
            (DATABASE_NAME.to_string(), self.database_name.clone()),
            (
                HTTP_TIMEOUT_SECONDS.to_string(),
                self.http_timeout_seconds.to_string(),
            ),
            (USER_AGENT.to_string(), self.user_agent.clone()),
            (GITHUB_IGNORE.to_string(), self.github_ignore.join(",")),
        ])
    }

    /// Writes the settings secret. An existing secret is never overwritten;
    /// returns whether the file was written.
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<bool> {
        let path = path.as_ref();
        if path.exists() {
            tracing::warn!(
                "Secret '{}' already exists. Delete it manually before trying to recreate it.",
                path.display()
            );
            return Ok(false);
        }

        let content = toml::to_string(&self.to_values())?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;

        tracing::info!("Settings exported to {}", path.display());
        Ok(true)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_path("database_path", &self.database_path)?;
        validate_identifier("database_name", &self.database_name)?;
        validate_positive_number("http_timeout_seconds", self.http_timeout_seconds, 1)?;
        validate_non_empty_string("user_agent", &self.user_agent)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(|_| None).unwrap();

        assert_eq!(settings.database_name, "llm-twin");
        assert_eq!(settings.http_timeout(), Duration::from_secs(30));
        assert_eq!(settings.github_ignore, vec![".git", ".toml", ".lock", ".png"]);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_lookup_overrides() {
        let values = HashMap::from([
            ("DATABASE_NAME", "twin-test"),
            ("HTTP_TIMEOUT_SECONDS", " 5 "),
            ("GITHUB_IGNORE", ".git, .svg,,"),
        ]);
        let settings =
            Settings::from_lookup(|key| values.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(settings.database_name, "twin-test");
        assert_eq!(settings.http_timeout_seconds, 5);
        assert_eq!(settings.github_ignore, vec![".git", ".svg"]);
        assert_eq!(settings.database_path, "./data");
    }

    #[test]
    fn test_invalid_timeout() {
        let result = Settings::from_lookup(|key| {
            (key == "HTTP_TIMEOUT_SECONDS").then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_export_then_load_from_secret() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secrets").join("settings.toml");

        let mut settings = Settings::default();
        settings.database_name = "exported".to_string();
        settings.http_timeout_seconds = 12;

        assert!(settings.export(&path).unwrap());
        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_export_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "DATABASE_NAME = \"keep\"\n").unwrap();

        assert!(!Settings::default().export(&path).unwrap());
        assert_eq!(Settings::from_secret_file(&path).unwrap().database_name, "keep");
    }

    #[test]
    fn test_invalid_database_name_fails_validation() {
        let mut settings = Settings::default();
        settings.database_name = "../../etc".to_string();
        assert!(settings.validate().is_err());
    }
}
