/// Configuration management for edx
///
/// edx stores configuration in ~/.edx/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Longest prompt the config file may set
pub const MAX_PROMPT_LEN: usize = 32;

/// edx configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Session settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Pattern settings
    #[serde(default)]
    pub regex: RegexConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Prompt text
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Print the prompt before each command
    #[serde(default)]
    pub show_prompt: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            show_prompt: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegexConfig {
    /// Compile every pattern case-insensitively
    #[serde(default)]
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write a debug log to ~/.edx/edx.log
    #[serde(default)]
    pub debug: bool,
}

fn default_prompt() -> String {
    "*".to_string()
}

impl Config {
    /// The prompt to print before each command, if prompting is on
    pub fn prompt(&self) -> Option<&str> {
        self.session
            .show_prompt
            .then_some(self.session.prompt.as_str())
    }
}

/// Get the edx directory, creating it if needed
pub fn edx_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;

    let dir = home_dir.join(".edx");
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

    Ok(dir)
}

/// Get the configuration file path
pub fn config_file_path() -> Result<PathBuf> {
    Ok(edx_dir()?.join("config.toml"))
}

/// Get the default configuration file content with comments
fn get_default_config_content() -> &'static str {
    r#"# edx Configuration File
#
# Values set here can be overridden by command-line flags.
#
# For more information, run: edx config --help

[session]
# Prompt text (default: "*", at most 32 characters)
prompt = "*"

# Print the prompt before each command (default: false)
# Same as passing -p on the command line.
show_prompt = false

[regex]
# Compile every search and substitution pattern case-insensitively
# (default: false). Same as -i on the command line.
case_insensitive = false

[logging]
# Write a debug log to ~/.edx/edx.log (default: false)
# The EDX_LOG environment variable sets a custom filter, e.g. EDX_LOG=edx=trace
debug = false
"#
}

/// Save the default commented configuration file
pub fn save_default_config() -> Result<()> {
    let config_path = config_file_path()?;

    fs::write(&config_path, get_default_config_content())
        .with_context(|| format!("Failed to write default config file: {}", config_path.display()))?;

    Ok(())
}

/// Parse configuration text
pub fn parse_config(text: &str) -> Result<Config> {
    toml::from_str(text).context("Failed to parse config file")
}

/// Load configuration from file, creating default if needed
///
/// If the config file doesn't exist, creates it with defaults and returns them.
/// If the config file is malformed, recreates it with defaults.
pub fn load_config() -> Result<Config> {
    let config_path = config_file_path()?;

    if !config_path.exists() {
        save_default_config()?;
    }

    let config_str = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

    match parse_config(&config_str) {
        Ok(config) => Ok(config),
        Err(e) => {
            tracing::warn!(error = %e, "malformed config, restoring defaults");
            save_default_config()?;
            Ok(Config::default())
        }
    }
}

/// Validate configuration values
pub fn validate_config(config: &Config) -> Result<()> {
    let prompt = &config.session.prompt;
    if prompt.chars().count() > MAX_PROMPT_LEN {
        anyhow::bail!(
            "Invalid prompt: {:?} (at most {} characters)",
            prompt,
            MAX_PROMPT_LEN
        );
    }
    if prompt.contains(['\n', '\r']) {
        anyhow::bail!("Invalid prompt: {:?} (must not contain a newline)", prompt);
    }

    Ok(())
}

/// Render the effective configuration as TOML
pub fn render_config(config: &Config) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to serialize config")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.session.prompt, "*");
        assert!(!config.session.show_prompt);
        assert!(!config.regex.case_insensitive);
        assert!(!config.logging.debug);
        assert_eq!(config.prompt(), None);
    }

    #[test]
    fn test_default_content_parses_to_defaults() {
        let config = parse_config(get_default_config_content()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = parse_config("[session]\nshow_prompt = true\n").unwrap();
        assert_eq!(config.prompt(), Some("*"));
        assert!(!config.regex.case_insensitive);

        let config = parse_config("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_config() {
        assert!(parse_config("[session\nprompt = ").is_err());
        assert!(parse_config("[regex]\ncase_insensitive = \"yes\"\n").is_err());
    }

    #[test]
    fn test_validate_config_valid() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_config_long_prompt() {
        let mut config = Config::default();
        config.session.prompt = "x".repeat(MAX_PROMPT_LEN + 1);
        assert!(validate_config(&config).is_err());
        config.session.prompt = "x".repeat(MAX_PROMPT_LEN);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_config_newline_in_prompt() {
        let mut config = Config::default();
        config.session.prompt = "a\nb".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_config_to_toml() {
        let toml_str = render_config(&Config::default()).unwrap();
        assert!(toml_str.contains("[session]"));
        assert!(toml_str.contains("[regex]"));
        assert!(toml_str.contains("[logging]"));
    }
}
