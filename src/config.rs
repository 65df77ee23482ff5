//! TOML configuration for help layout, header strings and error reporting
//!
//! ```toml
//! [help]
//! max_col = 100
//!
//! [strings]
//! usage = "USAGE"
//!
//! [main]
//! show_code = true
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::help::{HelpOptions, HelpStrings};
use crate::runner::MainOptions;

/// Presentation settings for a CLI. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub help: HelpOptions,
    pub strings: HelpStrings,
    pub main: MainOptions,
}

impl CliConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse cmdln configuration")
    }

    /// Load configuration from explicit file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading configuration from file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::Finale;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = CliConfig::from_toml_str("").unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.help.indent, 4);
        assert_eq!(config.strings.commands, "Commands");
    }

    #[test]
    fn test_partial_sections() {
        let config = CliConfig::from_toml_str(
            r#"
            [help]
            max_col = 100

            [strings]
            usage = "USAGE"

            [main]
            show_code = true
            finale = "exit"
            "#,
        )
        .unwrap();
        assert_eq!(config.help.max_col, 100);
        assert_eq!(config.help.min_help_col, 20);
        assert_eq!(config.strings.usage, "USAGE");
        assert_eq!(config.strings.options, "Options");
        assert!(config.main.show_code);
        assert_eq!(config.main.finale, Finale::Exit);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[strings]\ncommands = \"COMMANDS\"").unwrap();
        let config = CliConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.strings.commands, "COMMANDS");
    }

    #[test]
    fn test_invalid_config() {
        assert!(CliConfig::from_toml_str("[help]\nindent = \"wide\"").is_err());
        let err = CliConfig::load_from_file("/nonexistent/cmdln.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
