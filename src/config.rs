pub const DEFAULT_PROFILE_BASE_URL: &str = "https://lapras.com/public";
pub const DEFAULT_BADGE_BASE_URL: &str = "https://img.shields.io/badge";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub profile_base_url: String,
    pub badge_base_url: String,
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            profile_base_url: validate_base_url(
                "PROFILE_BASE_URL",
                std::env::var("PROFILE_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_PROFILE_BASE_URL.to_string()),
            )?,
            badge_base_url: validate_base_url(
                "BADGE_BASE_URL",
                std::env::var("BADGE_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_BADGE_BASE_URL.to_string()),
            )?,
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| anyhow::anyhow!("HTTP_TIMEOUT_SECS must be a positive integer"))?,
        };

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Profile Base URL: {}", config.profile_base_url);
        tracing::debug!("Badge Base URL: {}", config.badge_base_url);
        tracing::debug!("HTTP timeout: {}s", config.http_timeout_secs);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            profile_base_url: DEFAULT_PROFILE_BASE_URL.to_string(),
            badge_base_url: DEFAULT_BADGE_BASE_URL.to_string(),
            http_timeout_secs: 30,
        }
    }
}

fn validate_base_url(name: &str, url: String) -> anyhow::Result<String> {
    if url.trim().is_empty() {
        anyhow::bail!("{} cannot be empty", name);
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("{} must start with http:// or https://", name);
    }
    Ok(url.trim_end_matches('/').to_string())
}
