use anyhow::{Context, Result};
use image::{DynamicImage, RgbaImage};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use super::cache::CoverCache;
use super::effects::prepare_cover;
use super::giantbomb::GiantBombClient;
use crate::library::{GameEntry, LaunchTarget, Platform};

/// Days before a lookup that found nothing is tried again
const MISSING_RETRY_DAYS: u64 = 30;

/// Cover lookup status reported to the UI thread
#[derive(Debug, Clone)]
pub enum ArtworkStatus {
    /// Cover found and processed
    Loaded {
        platform: Platform,
        title: String,
        image: RgbaImage,
    },
    /// No cover available, the placeholder should be shown
    Missing { platform: Platform, title: String },
    /// Lookup failed
    Failed {
        platform: Platform,
        title: String,
        error: String,
    },
}

/// Where Steam keeps the library artwork for an app
pub fn steam_cover_path(client_executable: &Path, app_id: &str) -> Option<PathBuf> {
    client_executable.parent().map(|steam_dir| {
        steam_dir
            .join("appcache")
            .join("librarycache")
            .join(format!("{}_library_600x900.jpg", app_id))
    })
}

/// Resolves covers for catalog entries
#[derive(Clone)]
pub struct ArtworkHandler {
    client: Option<GiantBombClient>,
    cache: CoverCache,
    progress_tx: Option<Sender<ArtworkStatus>>,
}

impl ArtworkHandler {
    /// Create a new artwork handler
    pub fn new(client: Option<GiantBombClient>, cache_dir: PathBuf) -> Result<Self> {
        let cache = CoverCache::new(cache_dir)?;

        Ok(Self {
            client,
            cache,
            progress_tx: None,
        })
    }

    /// Set progress channel
    pub fn set_progress_channel(&mut self, tx: Sender<ArtworkStatus>) {
        self.progress_tx = Some(tx);
    }

    /// Send status update
    fn send_status(&self, status: ArtworkStatus) {
        if let Some(tx) = &self.progress_tx {
            if let Err(e) = tx.send(status) {
                warn!("Failed to send artwork status: {}", e);
            }
        }
    }

    /// Look up the cover for `entry` and report the outcome over the progress channel
    pub async fn fetch_and_report(&self, entry: GameEntry) {
        let platform = entry.platform;
        let title = entry.title.clone();

        let status = match self.load_cover(&entry).await {
            Ok(Some(image)) => ArtworkStatus::Loaded {
                platform,
                title,
                image,
            },
            Ok(None) => ArtworkStatus::Missing { platform, title },
            Err(e) => {
                error!("Failed to load cover for {}: {:#}", title, e);
                ArtworkStatus::Failed {
                    platform,
                    title,
                    error: e.to_string(),
                }
            }
        };

        self.send_status(status);
    }

    /// Cover for an entry, processed for the dashboard. `Ok(None)` means no cover exists.
    pub async fn load_cover(&self, entry: &GameEntry) -> Result<Option<RgbaImage>> {
        let source = match &entry.target {
            LaunchTarget::Steam {
                app_id,
                client_executable,
            } => self.steam_cover(client_executable.as_deref(), app_id)?,
            LaunchTarget::Epic { .. } => self.epic_cover(&entry.title).await?,
        };

        match source {
            Some(image) => Ok(Some(process(image).await?)),
            None => Ok(None),
        }
    }

    fn steam_cover(&self, client: Option<&Path>, app_id: &str) -> Result<Option<DynamicImage>> {
        let path = match client.and_then(|c| steam_cover_path(c, app_id)) {
            Some(path) if path.exists() => path,
            _ => {
                debug!("No Steam library artwork for app {}", app_id);
                return Ok(None);
            }
        };

        let image = image::open(&path)
            .with_context(|| format!("Failed to open Steam artwork: {}", path.display()))?;
        Ok(Some(image))
    }

    async fn epic_cover(&self, title: &str) -> Result<Option<DynamicImage>> {
        if let Some(image) = self.cache.load_cover(title) {
            debug!("Using cached cover for {}", title);
            return Ok(Some(image));
        }

        if self.cache.is_known_missing(title, MISSING_RETRY_DAYS) {
            return Ok(None);
        }

        let client = match &self.client {
            Some(client) => client,
            None => return Ok(None),
        };

        match client.search_cover_url(title).await? {
            Some(url) => {
                info!("Using cover image URL: {}", url);
                let image = client.download_image(&url).await?;
                if let Err(e) = self.cache.store_cover(title, &url, &image) {
                    warn!("Failed to cache cover for {}: {:#}", title, e);
                }
                Ok(Some(image))
            }
            None => {
                info!("No cover found for {}", title);
                self.cache.mark_missing(title)?;
                Ok(None)
            }
        }
    }
}

// Blur and resize are CPU bound, keep them off the async workers
async fn process(image: DynamicImage) -> Result<RgbaImage> {
    tokio::task::spawn_blocking(move || prepare_cover(&image))
        .await
        .context("Cover processing task failed")
}
