use log::info;
use markdown_tree_html::{HtmlGenerator, HtmlOptions, ProviderRegistry};
use markdown_tree_syntax::{MarkdownParser, ParserOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Parser and renderer settings, read from a TOML file with `[parser]` and
/// `[html]` tables. Missing keys take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parser: ParserOptions,
    pub html: HtmlOptions,
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// `Ok(None)` when there is no file at `config_path`.
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config =
            Self::from_toml_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        info!("loaded config from {}", config_path.display());
        Ok(Some(config))
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn markdown_parser(&self) -> MarkdownParser {
        MarkdownParser::with_options(self.parser.clone())
    }

    pub fn html_generator(&self) -> HtmlGenerator {
        HtmlGenerator::new(ProviderRegistry::with_options(&self.html))
    }

    /// Parse and render `text` with these settings.
    pub fn render(&self, text: &str) -> String {
        let tree = self.markdown_parser().build_markdown_tree(text);
        self.html_generator().generate(&tree)
    }
}
