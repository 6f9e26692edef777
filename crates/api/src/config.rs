use std::str::FromStr;
use std::time::Duration;

use saints_core::generation::WEBHOOK_PATH;
use saints_tracker::{PollPolicy, TrackerConfig};

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    /// A single `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on post-shutdown cleanup in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// MusicGPT REST base URL.
    pub musicgpt_api_url: String,
    /// Publicly reachable base URL of this server. When unset no webhook
    /// is registered with the provider and completion relies on polling.
    pub public_base_url: Option<String>,
    pub poll_interval_secs: u64,
    pub poll_max_lifetime_secs: u64,
    /// Send `generation_failed` frames for failed and expired jobs.
    pub notify_failures: bool,
    pub anthropic_api_url: String,
    pub anthropic_model: String,
    pub openai_api_url: String,
    pub openai_model: String,
    /// Directory of browser client files served at `/`, if any.
    pub static_dir: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                                  |
    /// |--------------------------|------------------------------------------|
    /// | `HOST`                   | `0.0.0.0`                                |
    /// | `PORT`                   | `3000`                                   |
    /// | `CORS_ORIGINS`           | `*`                                      |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                                     |
    /// | `SHUTDOWN_TIMEOUT_SECS`  | `30`                                     |
    /// | `MUSICGPT_API_URL`       | `https://api.musicgpt.com/api/public/v1` |
    /// | `PUBLIC_BASE_URL`        | unset                                    |
    /// | `POLL_INTERVAL_SECS`     | `10`                                     |
    /// | `POLL_MAX_LIFETIME_SECS` | `600`                                    |
    /// | `NOTIFY_FAILURES`        | `false`                                  |
    /// | `ANTHROPIC_API_URL`      | `https://api.anthropic.com`              |
    /// | `ANTHROPIC_MODEL`        | `claude-sonnet-4-20250514`               |
    /// | `OPENAI_API_URL`         | `https://api.openai.com`                 |
    /// | `OPENAI_MODEL`           | `gpt-4`                                  |
    /// | `STATIC_DIR`             | unset                                    |
    ///
    /// Panics on unparseable numeric or boolean values so misconfiguration
    /// fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = parse_env("PORT", "3000");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = parse_env("REQUEST_TIMEOUT_SECS", "30");
        let shutdown_timeout_secs: u64 = parse_env("SHUTDOWN_TIMEOUT_SECS", "30");

        let musicgpt_api_url = std::env::var("MUSICGPT_API_URL")
            .unwrap_or_else(|_| saints_musicgpt::DEFAULT_API_URL.into());
        let public_base_url = optional_env("PUBLIC_BASE_URL");

        let poll_interval_secs: u64 = parse_env("POLL_INTERVAL_SECS", "10");
        let poll_max_lifetime_secs: u64 = parse_env("POLL_MAX_LIFETIME_SECS", "600");
        let notify_failures: bool = parse_env("NOTIFY_FAILURES", "false");

        let anthropic_api_url = std::env::var("ANTHROPIC_API_URL")
            .unwrap_or_else(|_| saints_lyrics::anthropic::DEFAULT_API_URL.into());
        let anthropic_model = std::env::var("ANTHROPIC_MODEL")
            .unwrap_or_else(|_| saints_lyrics::anthropic::DEFAULT_MODEL.into());
        let openai_api_url = std::env::var("OPENAI_API_URL")
            .unwrap_or_else(|_| saints_lyrics::openai::DEFAULT_API_URL.into());
        let openai_model = std::env::var("OPENAI_MODEL")
            .unwrap_or_else(|_| saints_lyrics::openai::DEFAULT_MODEL.into());

        let static_dir = optional_env("STATIC_DIR");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            musicgpt_api_url,
            public_base_url,
            poll_interval_secs,
            poll_max_lifetime_secs,
            notify_failures,
            anthropic_api_url,
            anthropic_model,
            openai_api_url,
            openai_model,
            static_dir,
        }
    }

    /// Callback URL handed to the provider, if push delivery is configured.
    pub fn webhook_url(&self) -> Option<String> {
        self.public_base_url
            .as_deref()
            .map(|base| format!("{}{WEBHOOK_PATH}", base.trim_end_matches('/')))
    }

    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            policy: PollPolicy::new(
                Duration::from_secs(self.poll_interval_secs),
                Duration::from_secs(self.poll_max_lifetime_secs),
            ),
            notify_failures: self.notify_failures,
        }
    }

    /// Whether any origin may call the API.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

fn parse_env<T>(key: &str, default: &str) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.into());
    raw.trim()
        .parse()
        .unwrap_or_else(|e| panic!("{key} must be valid ('{raw}'): {e}"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(public_base_url: Option<&str>) -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            cors_origins: vec!["*".into()],
            request_timeout_secs: 30,
            shutdown_timeout_secs: 30,
            musicgpt_api_url: "http://localhost:9".into(),
            public_base_url: public_base_url.map(String::from),
            poll_interval_secs: 5,
            poll_max_lifetime_secs: 120,
            notify_failures: true,
            anthropic_api_url: "http://localhost:9".into(),
            anthropic_model: "m".into(),
            openai_api_url: "http://localhost:9".into(),
            openai_model: "m".into(),
            static_dir: None,
        }
    }

    #[test]
    fn webhook_url_joins_base_and_path() {
        let config = config(Some("https://saints.example/"));
        assert_eq!(
            config.webhook_url().as_deref(),
            Some("https://saints.example/api/webhook/musicgpt")
        );
    }

    #[test]
    fn no_public_url_means_polling_only() {
        assert!(config(None).webhook_url().is_none());
    }

    #[test]
    fn tracker_config_carries_policy() {
        let tracker = config(None).tracker_config();
        assert_eq!(tracker.policy.interval, Duration::from_secs(5));
        assert_eq!(tracker.policy.max_lifetime, Duration::from_secs(120));
        assert!(tracker.notify_failures);
    }
}
