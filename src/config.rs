//! Run-wide defaults and the provider endpoints the pipeline talks to.

use clap::Args;
use std::time::Duration;

pub const SEARCH_ENGINE_URL: &str = "https://www.google.com/search";
pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);
pub const LLM_TIMEOUT: Duration = Duration::from_secs(60);
pub const TRANSLATE_TIMEOUT: Duration = Duration::from_secs(30);

pub const RATE_LIMIT_CALLS: usize = 10;
pub const RATE_LIMIT_PERIOD: Duration = Duration::from_secs(60);

pub const ENTITY_DELAY: Duration = Duration::from_secs(2);
pub const RECORD_DELAY: Duration = Duration::from_secs(1);

pub const CANONICAL_LANGUAGE: &str = "en";
pub const DEFAULT_MODEL: &str = "command-r";
pub const DEFAULT_SAMPLE_SIZE: usize = 5;

/// Endpoints and credentials for the three remote services, read from flags or the environment.
#[derive(Debug, Clone, Args)]
pub struct ProviderConfig {
    #[arg(long, env = "SCRAPER_API_URL")]
    pub search_api_url: String,

    #[arg(long, env = "SCRAPER_API_KEY", hide_env_values = true)]
    pub search_api_key: String,

    #[arg(long, env = "SEARCH_ENGINE_URL", default_value = SEARCH_ENGINE_URL)]
    pub search_engine_url: String,

    #[arg(long, env = "LLM_API_URL")]
    pub llm_api_url: String,

    #[arg(long, env = "LLM_API_KEY", hide_env_values = true)]
    pub llm_api_key: String,

    #[arg(long = "model", env = "LLM_MODEL", default_value = DEFAULT_MODEL)]
    pub llm_model: String,

    /// Translation endpoint; without it non-English text is kept as-is
    #[arg(long, env = "TRANSLATE_API_URL")]
    pub translate_api_url: Option<String>,
}

/// Pacing and language knobs shared by the orchestrator and extraction client.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub rate_limit_calls: usize,
    pub rate_limit_period: Duration,
    pub search_timeout: Duration,
    pub entity_delay: Duration,
    pub record_delay: Duration,
    pub canonical_language: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            rate_limit_calls: RATE_LIMIT_CALLS,
            rate_limit_period: RATE_LIMIT_PERIOD,
            search_timeout: SEARCH_TIMEOUT,
            entity_delay: ENTITY_DELAY,
            record_delay: RECORD_DELAY,
            canonical_language: CANONICAL_LANGUAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        providers: ProviderConfig,
    }

    #[test]
    fn provider_flags_parse_into_config() {
        let parsed = Wrapper::try_parse_from([
            "entity_enricher",
            "--search-api-url", "https://proxy.example/",
            "--search-api-key", "k1",
            "--llm-api-url", "https://llm.example/v1/chat",
            "--llm-api-key", "k2",
            "--model", "command-r-plus",
            "--translate-api-url", "https://translate.example/",
        ])
        .unwrap();

        let p = parsed.providers;
        assert_eq!(p.search_api_url, "https://proxy.example/");
        assert_eq!(p.search_api_key, "k1");
        assert_eq!(p.llm_api_url, "https://llm.example/v1/chat");
        assert_eq!(p.llm_api_key, "k2");
        assert_eq!(p.llm_model, "command-r-plus");
        assert_eq!(p.translate_api_url.as_deref(), Some("https://translate.example/"));
    }
}
