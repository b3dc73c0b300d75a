use anyhow::{Context, Result};
use image::DynamicImage;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Bookkeeping stored next to each cached cover
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CachedCover {
    /// Title the lookup was made for
    pub title: String,
    /// Where the cover came from, `None` when the lookup found nothing
    pub image_url: Option<String>,
    /// Last update timestamp
    pub last_updated: u64,
}

/// Disk cache for covers fetched from Giant Bomb
#[derive(Debug, Clone)]
pub struct CoverCache {
    /// Base directory for cache
    cache_dir: PathBuf,
}

impl CoverCache {
    /// Create a new cover cache, creating its directory if needed
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        let cache = Self { cache_dir };
        let covers_dir = cache.covers_dir();
        if !covers_dir.exists() {
            fs::create_dir_all(&covers_dir)
                .with_context(|| format!("Failed to create cover cache: {}", covers_dir.display()))?;
        }
        Ok(cache)
    }

    /// Default cache location in the user's cache directory
    pub fn default_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("rocket-game-launcher")
    }

    /// Get covers directory
    pub fn covers_dir(&self) -> PathBuf {
        self.cache_dir.join("covers")
    }

    /// Get path for a cached cover image
    pub fn cover_path(&self, title: &str) -> PathBuf {
        self.covers_dir().join(format!("{}.png", slug(title)))
    }

    fn record_path(&self, title: &str) -> PathBuf {
        self.covers_dir().join(format!("{}.json", slug(title)))
    }

    /// Load a cached cover, `None` if absent or unreadable
    pub fn load_cover(&self, title: &str) -> Option<DynamicImage> {
        let path = self.cover_path(title);
        if !path.exists() {
            return None;
        }
        match image::open(&path) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("Failed to read cached cover {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Save a fetched cover and remember where it came from
    pub fn store_cover(&self, title: &str, image_url: &str, image: &DynamicImage) -> Result<()> {
        let path = self.cover_path(title);
        image
            .save(&path)
            .with_context(|| format!("Failed to write cover: {}", path.display()))?;

        self.save_record(CachedCover {
            title: title.to_string(),
            image_url: Some(image_url.to_string()),
            last_updated: now(),
        })?;

        info!("Cached cover for {} at {}", title, path.display());
        Ok(())
    }

    /// Remember that a lookup found no cover
    pub fn mark_missing(&self, title: &str) -> Result<()> {
        self.save_record(CachedCover {
            title: title.to_string(),
            image_url: None,
            last_updated: now(),
        })
    }

    /// Cached bookkeeping for a title
    pub fn record(&self, title: &str) -> Option<CachedCover> {
        let path = self.record_path(title);
        let json = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&json) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Ignoring corrupt cover record {}: {}", path.display(), e);
                None
            }
        }
    }

    /// A recent lookup for this title found nothing
    pub fn is_known_missing(&self, title: &str, days: u64) -> bool {
        match self.record(title) {
            Some(record) if record.image_url.is_none() => {
                let age_days = now().saturating_sub(record.last_updated) / 86400;
                age_days <= days
            }
            _ => false,
        }
    }

    fn save_record(&self, record: CachedCover) -> Result<()> {
        let path = self.record_path(&record.title);
        let json = serde_json::to_string_pretty(&record).context("Failed to serialize cover record")?;
        write_file(&path, &json)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// File name stem for a title: lowercase alphanumerics separated by `_`
pub fn slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let trimmed = slug.trim_end_matches('_');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_slug() {
        assert_eq!(slug("Grand Theft Auto V"), "grand_theft_auto_v");
        assert_eq!(slug("DOOM: Eternal"), "doom_eternal");
        assert_eq!(slug("  "), "untitled");
    }

    #[test]
    fn test_store_and_load_cover() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CoverCache::new(dir.path().to_path_buf()).unwrap();
        assert!(cache.load_cover("Hades").is_none());

        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 6, Rgba([1, 2, 3, 255])));
        cache.store_cover("Hades", "https://example.test/hades.jpg", &image).unwrap();

        let loaded = cache.load_cover("Hades").unwrap();
        assert_eq!(loaded.to_rgba8(), image.to_rgba8());
        assert_eq!(
            cache.record("Hades").unwrap().image_url.as_deref(),
            Some("https://example.test/hades.jpg")
        );
        assert!(!cache.is_known_missing("Hades", 30));
    }

    #[test]
    fn test_mark_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CoverCache::new(dir.path().to_path_buf()).unwrap();

        assert!(!cache.is_known_missing("Obscure Game", 30));
        cache.mark_missing("Obscure Game").unwrap();
        assert!(cache.is_known_missing("Obscure Game", 30));
        assert!(cache.load_cover("Obscure Game").is_none());
    }
}
