use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::data::feature_collection::GeoPoint;
use crate::errors::error_types::{ErrorTypes, INVALID_CONFIG};

pub const PARKS_FILE: &str = "chatt_parks.geojson";
pub const TRAILS_FILE: &str = "chatt_trails.geojson";

/// Downtown Chattanooga, TN.
pub const DEFAULT_CENTER: GeoPoint = GeoPoint {
    lat: 35.0456,
    lon: -85.3097,
};
pub const DEFAULT_ZOOM: f64 = 13.0;
pub const MAX_ZOOM: f64 = 19.0;
pub const ERROR_BANNER_TTL: Duration = Duration::from_secs(5);

const DATA_ENV: &str = "PARKS_TRAILS_DATA";
const ZOOM_ENV: &str = "PARKS_TRAILS_DEFAULT_ZOOM";
const NO_CACHE_ENV: &str = "NO_HTTP_CACHE";

/// Settings for one map session.
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    pub parks_location: String,
    pub trails_location: String,
    pub default_center: GeoPoint,
    pub default_zoom: f64,
    pub error_banner_ttl: Duration,
    /// Directory for the tile HTTP cache, `None` disables caching.
    pub http_cache: Option<PathBuf>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::with_data_base(".")
    }
}

impl MapConfig {
    /// Builds a configuration whose datasets live under `base`, which may be a
    /// directory or an `http(s)://` prefix.
    pub fn with_data_base(base: &str) -> Self {
        Self {
            parks_location: resolve_location(base, PARKS_FILE),
            trails_location: resolve_location(base, TRAILS_FILE),
            default_center: DEFAULT_CENTER,
            default_zoom: DEFAULT_ZOOM,
            error_banner_ttl: ERROR_BANNER_TTL,
            http_cache: Some(".cache".into()),
        }
    }

    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ErrorTypes> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ErrorTypes>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = lookup(DATA_ENV).unwrap_or_else(|| ".".to_string());
        let mut config = Self::with_data_base(&base);

        if let Some(raw) = lookup(ZOOM_ENV) {
            config.default_zoom = parse_zoom(&raw)?;
        }

        if cfg!(target_os = "android") || lookup(NO_CACHE_ENV).is_some() {
            config.http_cache = None;
        }

        Ok(config)
    }
}

/// Joins a dataset file name onto a base location.
pub fn resolve_location(base: &str, file: &str) -> String {
    if base.starts_with("http://") || base.starts_with("https://") {
        format!("{}/{}", base.trim_end_matches('/'), file)
    } else {
        Path::new(base).join(file).to_string_lossy().into_owned()
    }
}

fn parse_zoom(raw: &str) -> Result<f64, ErrorTypes> {
    let zoom = raw.trim().parse::<f64>().map_err(|_| {
        ErrorTypes::new(
            INVALID_CONFIG,
            format!("{} must be a number, got {:?}", ZOOM_ENV, raw),
        )
    })?;
    if !(0.0..=MAX_ZOOM).contains(&zoom) {
        return Err(ErrorTypes::new(
            INVALID_CONFIG,
            format!("{} must be between 0 and {}, got {}", ZOOM_ENV, MAX_ZOOM, zoom),
        ));
    }
    Ok(zoom)
}
