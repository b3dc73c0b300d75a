use anyhow::{Context, Result};
use image::DynamicImage;
use log::{info, warn};
use reqwest::{header, Client};
use serde::Deserialize;

const USER_AGENT: &str = "Rocket_Game_Launcher/1.0";

/// Giant Bomb search response, trimmed to what the launcher reads
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub name: Option<String>,
    pub image: Option<ResultImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultImage {
    pub medium_url: Option<String>,
}

impl SearchResponse {
    /// Medium cover of the first hit
    pub fn first_cover_url(&self) -> Option<&str> {
        self.results
            .first()?
            .image
            .as_ref()?
            .medium_url
            .as_deref()
            .filter(|url| !url.is_empty())
    }
}

/// Giant Bomb API client used to find covers for Epic titles
#[derive(Clone)]
pub struct GiantBombClient {
    api_key: String,
    client: Client,
    base_url: String,
}

impl GiantBombClient {
    /// Create a new Giant Bomb client
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: Client::new(),
            base_url: String::from("https://www.giantbomb.com/api"),
        }
    }

    /// Client for `GIANT_BOMB_API_KEY`, if the variable is set
    pub fn from_env() -> Option<Self> {
        match std::env::var("GIANT_BOMB_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Some(Self::new(key.trim().to_string())),
            _ => {
                warn!("GIANT_BOMB_API_KEY is not set, Epic covers will use placeholders");
                None
            }
        }
    }

    /// Search for a game and return its cover URL
    pub async fn search_cover_url(&self, title: &str) -> Result<Option<String>> {
        info!("Searching Giant Bomb for: {}", title);

        let url = format!("{}/search", self.base_url);
        let params = [
            ("api_key", self.api_key.as_str()),
            ("format", "json"),
            ("query", title),
            ("resources", "game"),
            ("limit", "1"),
        ];

        let response = self
            .client
            .get(&url)
            .query(&params)
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .context("Failed to send search request")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Giant Bomb API error: {} - {}", status, text));
        }

        let search: SearchResponse = response
            .json()
            .await
            .context("Failed to parse Giant Bomb response")?;

        if let Some(hit) = search.results.first().and_then(|r| r.name.as_deref()) {
            info!("Best match for '{}': {}", title, hit);
        }

        Ok(search.first_cover_url().map(str::to_string))
    }

    /// Download and decode an image
    pub async fn download_image(&self, url: &str) -> Result<DynamicImage> {
        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .context("Failed to download cover image")?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Failed to download cover image: {}", response.status()));
        }

        let bytes = response
            .bytes()
            .await
            .context("Failed to read cover image data")?;

        image::load_from_memory(&bytes).context("Failed to decode cover image")
    }
}
