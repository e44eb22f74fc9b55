use crate::config::Config;
use crate::errors::AppError;
use crate::models::{format_score, Profile};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Visual style requested from the badge renderer.
pub const BADGE_STYLE: &str = "for-the-badge";

fn build_client(config: &Config, name: &str) -> Result<Client, AppError> {
    Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()
        .map_err(|e| AppError::ExternalApiError(format!("Failed to create {} client: {}", name, e)))
}

/// Appends one percent-encoded path segment to `base_url`.
fn url_with_segment(base_url: &str, segment: &str) -> Result<Url, AppError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| AppError::ExternalApiError(format!("Failed to build URL: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| AppError::ExternalApiError(format!("Cannot append path to {}", base_url)))?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}

/// Client for the public LAPRAS profile endpoint.
#[derive(Clone)]
pub struct ProfileService {
    client: Client,
    base_url: String,
}

impl ProfileService {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            client: build_client(config, "profile")?,
            base_url: config.profile_base_url.clone(),
        })
    }

    /// Fetches `{base_url}/{user_id}.json` and reads the three scores from it.
    ///
    /// The body is decoded whatever the status code; only transport failures
    /// and non-JSON bodies are errors.
    pub async fn fetch_profile(&self, user_id: &str) -> Result<Profile, AppError> {
        let url = url_with_segment(&self.base_url, &format!("{}.json", user_id))?;
        tracing::info!("Fetching LAPRAS profile for user: {}", user_id);
        tracing::debug!("Profile URL: {}", url);

        let response =
            self.client.get(url).send().await.map_err(|e| {
                AppError::ExternalApiError(format!("Profile request failed: {}", e))
            })?;

        if !response.status().is_success() {
            tracing::warn!(
                "Profile endpoint returned {} for user {}",
                response.status(),
                user_id
            );
        }

        let document: Value = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse profile response: {}", e))
        })?;

        Ok(Profile::from_json(&document))
    }
}

/// Client for the shields-style badge renderer.
#[derive(Clone)]
pub struct BadgeService {
    client: Client,
    base_url: String,
}

impl BadgeService {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            client: build_client(config, "badge")?,
            base_url: config.badge_base_url.clone(),
        })
    }

    /// Builds `{base_url}/{label}-{score}-{color}?style=for-the-badge`.
    pub fn badge_url(&self, label: &str, score: f64, color: &str) -> Result<Url, AppError> {
        let segment = format!("{}-{}-{}", label, format_score(score), color);
        let mut url = url_with_segment(&self.base_url, &segment)?;
        url.query_pairs_mut().append_pair("style", BADGE_STYLE);
        Ok(url)
    }

    /// Fetches the rendered badge and returns its body as text. The body is
    /// trusted to be SVG and relayed even on a non-success status.
    pub async fn fetch_badge(
        &self,
        label: &str,
        score: f64,
        color: &str,
    ) -> Result<String, AppError> {
        let url = self.badge_url(label, score, color)?;
        tracing::info!("Fetching badge {} ({})", label, color);
        tracing::debug!("Badge URL: {}", url);

        let response =
            self.client.get(url).send().await.map_err(|e| {
                AppError::ExternalApiError(format!("Badge request failed: {}", e))
            })?;

        if !response.status().is_success() {
            tracing::warn!("Badge endpoint returned {}", response.status());
        }

        let svg = response.text().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to read badge response: {}", e))
        })?;

        Ok(svg)
    }
}
