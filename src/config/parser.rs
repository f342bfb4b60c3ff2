use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Parses and validates configuration text
///
/// # Example
///
/// ```
/// use site_archiver::config::parse_config;
///
/// let config = parse_config(r#"
/// [crawler]
/// seed = "example.com"
/// max-depth = 2
///
/// [user-agent]
/// crawler-name = "Archiver"
/// crawler-version = "1.0"
/// contact-url = "https://example.com/about"
///
/// [output]
/// database-path = "archive.db"
/// "#).unwrap();
/// assert_eq!(config.crawler.max_depth, 2);
/// ```
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Hex SHA-256 of the configuration text, logged at startup so a run can be
/// matched to the exact file it used
pub fn config_fingerprint(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Reads, parses and validates the configuration file at `path`
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Like [`load_config`], also returning the fingerprint of the text that was parsed
///
/// The file is read once, so the fingerprint always matches the loaded settings.
pub fn load_config_with_fingerprint(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, config_fingerprint(&content)))
}
