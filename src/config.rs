use reqwest::Url;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::clickup::DEFAULT_BASE_URL;

pub const DEFAULT_CONFIG_PATH: &str = "config.properties";

pub const API_KEY: &str = "apiKey";
pub const SPACE_ID: &str = "spaceId";
pub const TASK_ID: &str = "task_id";
pub const BASE_URL: &str = "baseUrl";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config {} is missing required key `{key}`", path.display())]
    MissingKey { path: PathBuf, key: &'static str },

    #[error("Config {} has an empty value for `{key}`", path.display())]
    EmptyKey { path: PathBuf, key: &'static str },

    #[error("Invalid base URL `{value}`: {reason}")]
    InvalidBaseUrl { value: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Everything a run needs before the first request goes out.
#[derive(Clone, PartialEq, Eq)]
pub struct SuiteConfig {
    pub api_key: String,
    pub space_id: String,
    pub task_id: String,
    pub base_url: Url,
}

impl fmt::Debug for SuiteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiteConfig")
            .field("api_key", &"<redacted>")
            .field("space_id", &self.space_id)
            .field("task_id", &self.task_id)
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl SuiteConfig {
    /// Reads a `.properties` file. Any missing file or key is fatal.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_properties(path, &input)
    }

    /// `origin` only labels errors.
    pub fn from_properties(origin: &Path, input: &str) -> Result<Self> {
        let props = parse_properties(input);
        let required = |key: &'static str| -> Result<String> {
            match props.get(key) {
                None => Err(ConfigError::MissingKey {
                    path: origin.to_path_buf(),
                    key,
                }),
                Some(v) if v.is_empty() => Err(ConfigError::EmptyKey {
                    path: origin.to_path_buf(),
                    key,
                }),
                Some(v) => Ok(v.clone()),
            }
        };

        let base_url = match props.get(BASE_URL) {
            Some(raw) if !raw.is_empty() => parse_base_url(raw)?,
            _ => parse_base_url(DEFAULT_BASE_URL)?,
        };

        Ok(Self {
            api_key: required(API_KEY)?,
            space_id: required(SPACE_ID)?,
            task_id: required(TASK_ID)?,
            base_url,
        })
    }

    pub fn with_base_url(mut self, raw: &str) -> Result<Self> {
        self.base_url = parse_base_url(raw)?;
        Ok(self)
    }
}

pub fn parse_base_url(raw: &str) -> Result<Url> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        value: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot carry a path".to_string()));
    }
    Ok(url)
}

/// Minimal `.properties` reader: `key=value`, `key: value` or `key value`
/// per line, `#` and `!` start comments. Later keys win. Escapes and line
/// continuations are not supported.
pub fn parse_properties(input: &str) -> HashMap<String, String> {
    let mut props = HashMap::new();
    for line in input.lines() {
        let line = line.trim_start();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let split = line
            .find(|c: char| c == '=' || c == ':' || c.is_whitespace())
            .unwrap_or(line.len());
        let (key, rest) = line.split_at(split);
        let rest = rest.trim_start();
        let value = rest
            .strip_prefix('=')
            .or_else(|| rest.strip_prefix(':'))
            .unwrap_or(rest)
            .trim();

        props.insert(key.to_string(), value.to_string());
    }
    props
}
