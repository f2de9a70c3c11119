use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_non_empty_list, validate_non_empty_string, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Run configuration of the digital data ETL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtlRunConfig {
    pub parameters: EtlParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtlParameters {
    pub user_full_name: String,
    pub links: Vec<String>,
}

impl EtlRunConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${AUTHOR_NAME})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn user_full_name(&self) -> &str {
        &self.parameters.user_full_name
    }

    pub fn links(&self) -> &[String] {
        &self.parameters.links
    }
}

impl Validate for EtlRunConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("parameters.user_full_name", &self.parameters.user_full_name)?;
        validate_non_empty_list("parameters.links", &self.parameters.links)?;
        for link in &self.parameters.links {
            validate_url("parameters.links", link)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_run_config() {
        let toml_content = r#"
[parameters]
user_full_name = "Jane Doe"
links = [
    "https://medium.com/@jane/first-post",
    "https://github.com/jane/twin",
]
"#;

        let config = EtlRunConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.user_full_name(), "Jane Doe");
        assert_eq!(config.links().len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_TWIN_AUTHOR", "Maxime Labonne");

        let toml_content = r#"
[parameters]
user_full_name = "${TEST_TWIN_AUTHOR}"
links = ["https://example.com/post"]
"#;

        let config = EtlRunConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.user_full_name(), "Maxime Labonne");

        std::env::remove_var("TEST_TWIN_AUTHOR");
    }

    #[test]
    fn test_unset_variable_is_kept() {
        let toml_content = r#"
[parameters]
user_full_name = "${TEST_TWIN_UNSET_VARIABLE}"
links = ["https://example.com/post"]
"#;

        let config = EtlRunConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.user_full_name(), "${TEST_TWIN_UNSET_VARIABLE}");
    }

    #[test]
    fn test_validation_rejects_bad_links() {
        let toml_content = r#"
[parameters]
user_full_name = "Jane Doe"
links = ["https://example.com/ok", "not-a-url"]
"#;

        let config = EtlRunConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_empty_inputs() {
        let toml_content = r#"
[parameters]
user_full_name = "  "
links = []
"#;

        let config = EtlRunConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[parameters]\nuser_full_name = \"File User\"\nlinks = [\"https://example.com\"]\n")
            .unwrap();

        let config = EtlRunConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.user_full_name(), "File User");
    }

    #[test]
    fn test_malformed_toml() {
        assert!(EtlRunConfig::from_toml_str("[parameters\nuser_full_name = 1").is_err());
    }
}
