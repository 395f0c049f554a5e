use crate::app_config::{AppConfig, SourceMode};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_i64 = |var: &str, default: &str| -> Result<i64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<i64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let news_api_key = require("NEWS_API_KEY")?;
    let rewriter_endpoint = require("UNBAIT_REWRITER_ENDPOINT")?;
    let rewriter_key = require("UNBAIT_REWRITER_KEY")?;
    let rewriter_deployment = or_default("UNBAIT_REWRITER_DEPLOYMENT", "gpt-35-turbo-instruct");
    let search_endpoint = require("UNBAIT_SEARCH_ENDPOINT")?;
    let search_key = require("UNBAIT_SEARCH_KEY")?;
    let search_index = or_default("UNBAIT_SEARCH_INDEX", "news-perspective-index");

    let sentiment_endpoint = lookup("UNBAIT_SENTIMENT_ENDPOINT").ok();
    let sentiment_key = lookup("UNBAIT_SENTIMENT_KEY").ok();
    let extractor_endpoint = lookup("UNBAIT_EXTRACTOR_ENDPOINT").ok();
    let extractor_key = lookup("UNBAIT_EXTRACTOR_KEY").ok();

    let source_mode = parse_source_mode(&or_default("UNBAIT_SOURCE_MODE", "mixed"))?;
    let total_articles = parse_usize("UNBAIT_TOTAL_ARTICLES", "500")?;
    let batch_size = parse_usize("UNBAIT_BATCH_SIZE", "20")?;
    let batch_delay_secs = parse_u64("UNBAIT_BATCH_DELAY_SECS", "10")?;
    let max_age_days = parse_i64("UNBAIT_MAX_AGE_DAYS", "7")?;
    let title_similarity_threshold = parse_f64("UNBAIT_TITLE_SIMILARITY_THRESHOLD", "0.85")?;
    let scoring_concurrency = parse_usize("UNBAIT_SCORING_CONCURRENCY", "4")?;

    let request_timeout_secs = parse_u64("UNBAIT_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("UNBAIT_USER_AGENT", "unbait/0.1 (news-tone-analysis)");
    let sources_path = PathBuf::from(or_default("UNBAIT_SOURCES_PATH", "./config/sources.yaml"));
    let reliability_path = PathBuf::from(or_default(
        "UNBAIT_RELIABILITY_PATH",
        "./data/source_reliability.json",
    ));
    let log_level = or_default("UNBAIT_LOG_LEVEL", "info");

    if batch_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "UNBAIT_BATCH_SIZE".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        news_api_key,
        sentiment_endpoint,
        sentiment_key,
        extractor_endpoint,
        extractor_key,
        rewriter_endpoint,
        rewriter_key,
        rewriter_deployment,
        search_endpoint,
        search_key,
        search_index,
        source_mode,
        total_articles,
        batch_size,
        batch_delay_secs,
        max_age_days,
        title_similarity_threshold,
        scoring_concurrency,
        request_timeout_secs,
        user_agent,
        sources_path,
        reliability_path,
        log_level,
    })
}

/// Parse a string into a `SourceMode` variant.
fn parse_source_mode(s: &str) -> Result<SourceMode, ConfigError> {
    match s.to_lowercase().as_str() {
        "rss" => Ok(SourceMode::Rss),
        "newsapi" => Ok(SourceMode::NewsApi),
        "mixed" => Ok(SourceMode::Mixed),
        other => Err(ConfigError::InvalidEnvVar {
            var: "UNBAIT_SOURCE_MODE".to_string(),
            reason: format!("unknown source mode '{other}'; expected rss, newsapi, or mixed"),
        }),
    }
}
