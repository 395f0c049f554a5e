use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One configured news source (an RSS/Atom feed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSpec {
    pub name: String,
    pub feed_url: String,
    /// Minimum delay between requests to this source, in seconds.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_secs: u64,
}

fn default_rate_limit() -> u64 {
    2
}

impl SourceSpec {
    /// Generate a URL-safe key from the source name.
    #[must_use]
    pub fn key(&self) -> String {
        self.name
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else if c == ' ' {
                    '-'
                } else {
                    '\0'
                }
            })
            .filter(|&c| c != '\0')
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}

#[derive(Debug, Deserialize)]
pub struct SourcesFile {
    pub sources: Vec<SourceSpec>,
}

/// Load and validate the source registry from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<SourcesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let sources_file: SourcesFile = serde_yaml::from_str(&content)?;

    validate_sources(&sources_file)?;

    Ok(sources_file)
}

fn validate_sources(sources_file: &SourcesFile) -> Result<(), ConfigError> {
    if sources_file.sources.is_empty() {
        return Err(ConfigError::Validation(
            "sources file declares no sources".to_string(),
        ));
    }

    let mut seen_keys = HashSet::new();

    for source in &sources_file.sources {
        if source.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source name must be non-empty".to_string(),
            ));
        }

        if !source.feed_url.starts_with("http://") && !source.feed_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "source '{}' has a non-HTTP feed URL: {}",
                source.name, source.feed_url
            )));
        }

        let key = source.key();
        if !seen_keys.insert(key.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source key: '{}' (from source '{}')",
                key, source.name
            )));
        }
    }

    Ok(())
}
