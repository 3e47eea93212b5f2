//! Persistent on-disk caching for the vendor catalog with TTL.

use std::{
    fs,
    path::PathBuf,
    sync::OnceLock,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::VendorPricingConfig;

const CACHE_FILENAME: &str = "vendor_cache.json";

/// Cache TTL: 24 hours. Rate cards move slowly, but slabs do get
/// repriced.
pub const VENDOR_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Cached vendor catalog with TTL tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorCatalogCache {
    /// Unix timestamp (seconds) when this cache was created.
    pub cached_at: u64,
    /// All active vendor rate cards.
    pub vendors: Vec<VendorPricingConfig>,
}

impl VendorCatalogCache {
    /// Create a new cache with the current timestamp.
    pub fn new(vendors: Vec<VendorPricingConfig>) -> Self {
        let cached_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self { cached_at, vendors }
    }

    /// Check if the cache has expired (older than TTL).
    pub fn is_expired(&self) -> bool {
        self.age() > VENDOR_CACHE_TTL
    }

    /// Cache age as a Duration.
    pub fn age(&self) -> Duration {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Duration::from_secs(now.saturating_sub(self.cached_at))
    }

    /// Human-readable age string.
    pub fn age_string(&self) -> String {
        let secs = self.age().as_secs();
        if secs < 60 {
            format!("{secs}s")
        } else if secs < 3600 {
            format!("{}m", secs / 60)
        } else if secs < 86400 {
            format!("{}h", secs / 3600)
        } else {
            format!("{}d", secs / 86400)
        }
    }
}

/// Cache file path in the app data directory.
fn cache_path() -> PathBuf {
    static PATH: OnceLock<PathBuf> = OnceLock::new();
    PATH.get_or_init(|| {
        let base = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shipment-rate-engine");

        // Ensure directory exists
        let _ = fs::create_dir_all(&base);

        base.join(CACHE_FILENAME)
    })
    .clone()
}

/// Load the vendor cache from disk, if it exists and has not expired.
pub fn load_vendor_cache() -> Option<VendorCatalogCache> {
    let path = cache_path();

    if !path.exists() {
        debug!(path = %path.display(), "no vendor cache on disk");
        return None;
    }

    match fs::read_to_string(&path) {
        Ok(content) => match serde_json::from_str::<VendorCatalogCache>(&content) {
            Ok(cache) => {
                if cache.is_expired() {
                    debug!(age = %cache.age_string(), "vendor cache expired");
                    return None;
                }
                debug!(
                    vendors = cache.vendors.len(),
                    age = %cache.age_string(),
                    "loaded vendor cache"
                );
                Some(cache)
            }
            Err(err) => {
                warn!(%err, "failed to parse vendor cache");
                None
            }
        },
        Err(err) => {
            warn!(%err, "failed to read vendor cache");
            None
        }
    }
}

/// Save the vendor cache to disk.
pub fn save_vendor_cache(cache: &VendorCatalogCache) -> Result<(), std::io::Error> {
    let path = cache_path();
    let content = serde_json::to_string_pretty(cache)?;
    fs::write(&path, content)?;
    debug!(
        vendors = cache.vendors.len(),
        path = %path.display(),
        "saved vendor cache"
    );
    Ok(())
}
