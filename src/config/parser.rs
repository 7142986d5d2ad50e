use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Reads a TOML file and returns the validated configuration it describes
///
/// Missing sections and keys fall back to their defaults, so an empty file is
/// the same as [`Config::default`].
///
/// ```no_run
/// use bfs_crawler::config::load_config;
/// use std::path::Path;
///
/// let config = load_config(Path::new("crawler.toml")).unwrap();
/// println!("Downloaders: {}", config.crawler.downloaders);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    parse_config(&std::fs::read_to_string(path)?)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}
