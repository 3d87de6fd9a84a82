/// Configuration loading from TOML file
use std::path::Path;

use crate::error::{OddsError, Result};
use crate::types::Config;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| OddsError::ConfigError(format!("Failed to read config file: {}", e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| OddsError::ConfigError(format!("Failed to parse config: {}", e)))?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_config(config: &Config) -> Result<()> {
    if !config.api_url.starts_with("http") {
        return Err(OddsError::ConfigError(format!(
            "Invalid api_url: {}",
            config.api_url
        )));
    }

    if config.refresh_interval_sec < 5 {
        return Err(OddsError::ConfigError(
            "refresh_interval_sec must be >= 5".to_string(),
        ));
    }

    if config.fetch_timeout_sec < 1 {
        return Err(OddsError::ConfigError(
            "fetch_timeout_sec must be >= 1".to_string(),
        ));
    }

    if config.chart_bucket_ms <= 0 {
        return Err(OddsError::ConfigError(format!(
            "Invalid chart_bucket_ms: {}",
            config.chart_bucket_ms
        )));
    }

    if config.table_page_size == 0 {
        return Err(OddsError::ConfigError(
            "table_page_size must be > 0".to_string(),
        ));
    }

    if config.data_dir.is_empty() {
        return Err(OddsError::ConfigError("data_dir is empty".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid_toml() -> &'static str {
        r#"
api_url = "https://info.example.com/graphql"
meeting_url = "https://bet.example.com/racing/wp/2025-09-21/ST"
fetch_timeout_sec = 10
refresh_interval_sec = 60
auto_refresh = true
data_dir = "data"
chart_bucket_ms = 60000
table_page_size = 20
horse_csv = "refdata/horses.csv"
jockey_csv = "refdata/jockeys.csv"
trainer_csv = "refdata/trainers.csv"
model_params_path = "model/preprocessing_params.json"
log_level = "info"
"#
    }

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let file = write_config(valid_toml());
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.refresh_interval_sec, 60);
        assert_eq!(config.chart_bucket_ms, 60_000);
        assert_eq!(config.log_filter(), "paddock=info,info");
    }

    #[test]
    fn test_reject_short_refresh_interval() {
        let content = valid_toml().replace("refresh_interval_sec = 60", "refresh_interval_sec = 1");
        let file = write_config(&content);
        assert!(matches!(
            load_config(file.path()),
            Err(OddsError::ConfigError(_))
        ));
    }

    #[test]
    fn test_reject_bad_api_url() {
        let content = valid_toml().replace(
            "api_url = \"https://info.example.com/graphql\"",
            "api_url = \"ftp://nope\"",
        );
        let file = write_config(&content);
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_reject_malformed_toml() {
        let file = write_config("api_url = ");
        assert!(matches!(
            load_config(file.path()),
            Err(OddsError::ConfigError(_))
        ));
    }
}
