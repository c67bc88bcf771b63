use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_ANTHROPIC_BASE_URL;
use crate::recommendation::engine::RankingConfig;
use crate::recommendation::scorer::ScoringWeights;

/// Application configuration loaded from environment variables.
/// Startup fails if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// LLM-backed features (reason polish, assistant) are off without a key.
    pub anthropic_api_key: Option<String>,
    pub anthropic_base_url: String,
    pub enable_llm_reasons: bool,
    /// Upper bound on the whole reason-polish step of one request.
    pub reason_timeout: Duration,
    /// Server-wide ranking defaults; requests may override the threshold.
    pub ranking: RankingConfig,
    pub max_postings_per_request: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            anthropic_api_key: None,
            anthropic_base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
            enable_llm_reasons: false,
            reason_timeout: Duration::from_millis(4000),
            ranking: RankingConfig::default(),
            max_postings_per_request: 500,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        let ranking = RankingConfig {
            min_relevance_threshold: parse_or(
                &lookup,
                "MIN_RELEVANCE_THRESHOLD",
                defaults.ranking.min_relevance_threshold,
            )?,
            weights: ScoringWeights {
                skill: parse_or(&lookup, "SKILL_WEIGHT", defaults.ranking.weights.skill)?,
                interest: parse_or(&lookup, "INTEREST_WEIGHT", defaults.ranking.weights.interest)?,
                experience: parse_or(
                    &lookup,
                    "EXPERIENCE_WEIGHT",
                    defaults.ranking.weights.experience,
                )?,
            },
        };
        ranking
            .validate()
            .context("Ranking configuration is invalid")?;

        Ok(Config {
            port: parse_or(&lookup, "PORT", defaults.port)?,
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
            anthropic_api_key: lookup("ANTHROPIC_API_KEY").filter(|k| !k.trim().is_empty()),
            anthropic_base_url: lookup("ANTHROPIC_BASE_URL")
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty())
                .unwrap_or(defaults.anthropic_base_url),
            enable_llm_reasons: parse_or(&lookup, "ENABLE_LLM_REASONS", defaults.enable_llm_reasons)?,
            reason_timeout: Duration::from_millis(parse_or(
                &lookup,
                "REASON_TIMEOUT_MS",
                defaults.reason_timeout.as_millis() as u64,
            )?),
            ranking,
            max_postings_per_request: parse_or(
                &lookup,
                "MAX_POSTINGS_PER_REQUEST",
                defaults.max_postings_per_request,
            )?,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.ranking, RankingConfig::default());
        assert_eq!(config.reason_timeout, Duration::from_millis(4000));
        assert!(config.anthropic_api_key.is_none());
        assert_eq!(config.anthropic_base_url, "https://api.anthropic.com");
        assert!(!config.enable_llm_reasons);
    }

    #[test]
    fn test_base_url_override_drops_trailing_slash() {
        let config = load(&[("ANTHROPIC_BASE_URL", "http://127.0.0.1:9999/")]).unwrap();
        assert_eq!(config.anthropic_base_url, "http://127.0.0.1:9999");
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = load(&[
            ("PORT", "9090"),
            ("MIN_RELEVANCE_THRESHOLD", "0.2"),
            ("SKILL_WEIGHT", "0.6"),
            ("ENABLE_LLM_REASONS", "true"),
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("REASON_TIMEOUT_MS", "1500"),
        ])
        .unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.ranking.min_relevance_threshold, 0.2);
        assert_eq!(config.ranking.weights.skill, 0.6);
        assert_eq!(config.ranking.weights.interest, 0.3);
        assert!(config.enable_llm_reasons);
        assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.reason_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn test_blank_api_key_counts_as_unset() {
        let config = load(&[("ANTHROPIC_API_KEY", "   ")]).unwrap();
        assert!(config.anthropic_api_key.is_none());
    }

    #[test]
    fn test_malformed_value_names_the_variable() {
        let err = load(&[("PORT", "eighty")]).unwrap_err();
        assert!(format!("{err:#}").contains("PORT"));
    }

    #[test]
    fn test_out_of_range_threshold_is_rejected() {
        assert!(load(&[("MIN_RELEVANCE_THRESHOLD", "1.2")]).is_err());
        assert!(load(&[("EXPERIENCE_WEIGHT", "-0.2")]).is_err());
    }
}
