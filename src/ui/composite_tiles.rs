use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use egui::{ColorImage, Context};
use image::{imageops, RgbaImage};
use log::{debug, warn};
use threadpool::ThreadPool;
use walkers::sources::Attribution;
use walkers::{Texture, TileId, Tiles};

use crate::errors::error_types::{
    ErrorTypes, CLIENT_BUILD_FAILED, TILE_DECODE_FAILED, TILE_FETCH_FAILED, TILE_STATUS,
};
use crate::layers::base_layer::BaseLayerOption;

const TILE_SIZE: u32 = 256;
const DOWNLOAD_THREADS: usize = 4;
const MAX_CACHED_TILES: usize = 512;
const RETRY_AFTER: Duration = Duration::from_secs(10);

type TileOutcome = (TileId, Result<ColorImage, ErrorTypes>);

/// Tiles made of an imagery tile with a transparent label tile drawn on top.
pub struct CompositeTiles {
    egui_ctx: Context,
    layer: BaseLayerOption,
    client: reqwest::blocking::Client,
    pool: ThreadPool,
    sender: Sender<TileOutcome>,
    receiver: Receiver<TileOutcome>,
    cache: HashMap<TileId, Texture>,
    requested: HashSet<TileId>,
    /// Tiles whose last download failed, with the earliest time to try again.
    retry_at: HashMap<TileId, Instant>,
    disk_cache: Option<PathBuf>,
}

impl CompositeTiles {
    /// Creates a new instance of `CompositeTiles`.
    ///
    /// # Arguments
    /// * `layer` - Base layer with both an imagery and a label template.
    /// * `egui_ctx` - The Egui context, repainted whenever a tile arrives.
    /// * `disk_cache` - Directory blended tiles are kept in, if any.
    pub fn new(
        layer: BaseLayerOption,
        egui_ctx: Context,
        disk_cache: Option<PathBuf>,
    ) -> Result<Self, ErrorTypes> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| {
                ErrorTypes::new(
                    CLIENT_BUILD_FAILED,
                    format!("Failed to build tile client: {}", e),
                )
            })?;
        let (sender, receiver) = mpsc::channel();
        let disk_cache =
            disk_cache.map(|dir| dir.join(format!("{:?}", layer.id).to_lowercase()));
        Ok(Self {
            egui_ctx,
            layer,
            client,
            pool: ThreadPool::new(DOWNLOAD_THREADS),
            sender,
            receiver,
            cache: HashMap::new(),
            requested: HashSet::new(),
            retry_at: HashMap::new(),
            disk_cache,
        })
    }

    fn collect_finished(&mut self, now: Instant) {
        while let Ok((tile_id, result)) = self.receiver.try_recv() {
            self.requested.remove(&tile_id);
            match result {
                Ok(image) => {
                    let texture = Texture::from_color_image(image, &self.egui_ctx);
                    self.cache.insert(tile_id, texture);
                    self.retry_at.remove(&tile_id);
                }
                Err(err) => {
                    warn!("{}: tile {:?} unavailable: {:?}", self.layer.name, tile_id, err);
                    self.retry_at.insert(tile_id, now + RETRY_AFTER);
                }
            }
        }
    }

    /// Marks `tile_id` as in flight unless it already is, or it failed
    /// recently.
    fn should_request(&mut self, tile_id: TileId, now: Instant) -> bool {
        if let Some(retry_at) = self.retry_at.get(&tile_id) {
            if now < *retry_at {
                return false;
            }
        }
        self.requested.insert(tile_id)
    }

    fn request(&mut self, tile_id: TileId) {
        let base_url = self.layer.tile_url(tile_id.x, tile_id.y, tile_id.zoom);
        let label_url = self.layer.label_url(tile_id.x, tile_id.y, tile_id.zoom);
        let cache_file = self.disk_cache.as_ref().map(|dir| {
            dir.join(tile_id.zoom.to_string())
                .join(tile_id.x.to_string())
                .join(format!("{}.png", tile_id.y))
        });
        let client = self.client.clone();
        let sender = self.sender.clone();
        let egui_ctx = self.egui_ctx.clone();

        self.pool.execute(move || {
            let result = fetch_tile(
                &client,
                &base_url,
                label_url.as_deref(),
                cache_file.as_deref(),
            );
            let _ = sender.send((tile_id, result));
            egui_ctx.request_repaint();
        });
    }
}

impl Tiles for CompositeTiles {
    fn at(&mut self, tile_id: TileId) -> Option<Texture> {
        let now = Instant::now();
        self.collect_finished(now);

        if let Some(texture) = self.cache.get(&tile_id) {
            return Some(texture.clone());
        }

        if self.cache.len() >= MAX_CACHED_TILES {
            debug!("{}: dropping {} cached tiles", self.layer.name, self.cache.len());
            self.cache.clear();
        }

        if self.should_request(tile_id, now) {
            self.request(tile_id);
        }
        None
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: self.layer.attribution,
            url: self.layer.attribution_url,
            logo_light: None,
            logo_dark: None,
        }
    }

    fn tile_size(&self) -> u32 {
        TILE_SIZE
    }
}

/// Reads the blended tile from `cache_file` when present, otherwise downloads
/// and blends it and stores the result there.
fn fetch_tile(
    client: &reqwest::blocking::Client,
    base_url: &str,
    label_url: Option<&str>,
    cache_file: Option<&Path>,
) -> Result<ColorImage, ErrorTypes> {
    if let Some(path) = cache_file {
        if let Ok(cached) = image::open(path) {
            debug!("Cached tile {}", path.display());
            return Ok(color_image(&cached.to_rgba8()));
        }
    }

    let tile = download_composite(client, base_url, label_url)?;
    if let Some(path) = cache_file {
        if let Err(e) = store(path, &tile) {
            warn!("Failed to cache tile at {}: {}", path.display(), e);
        }
    }
    Ok(color_image(&tile))
}

fn store(path: &Path, tile: &RgbaImage) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    tile.save(path).map_err(|e| e.to_string())
}

fn color_image(tile: &RgbaImage) -> ColorImage {
    let size = [tile.width() as usize, tile.height() as usize];
    ColorImage::from_rgba_unmultiplied(size, tile.as_raw())
}

fn download_composite(
    client: &reqwest::blocking::Client,
    base_url: &str,
    label_url: Option<&str>,
) -> Result<RgbaImage, ErrorTypes> {
    let mut tile = download_image(client, base_url)?;
    if let Some(label_url) = label_url {
        let labels = download_image(client, label_url)?;
        compose(&mut tile, &labels);
    }
    Ok(tile)
}

fn download_image(client: &reqwest::blocking::Client, url: &str) -> Result<RgbaImage, ErrorTypes> {
    debug!("GET {}", url);
    let response = client.get(url).send().map_err(|e| {
        ErrorTypes::new(TILE_FETCH_FAILED, format!("Failed to reach {}: {}", url, e))
    })?;
    if !response.status().is_success() {
        return Err(ErrorTypes::new(
            TILE_STATUS,
            format!("HTTP {} fetching {}", response.status().as_u16(), url),
        ));
    }
    let bytes = response.bytes().map_err(|e| {
        ErrorTypes::new(TILE_FETCH_FAILED, format!("Failed to read {}: {}", url, e))
    })?;
    image::load_from_memory(&bytes)
        .map(|decoded| decoded.to_rgba8())
        .map_err(|e| ErrorTypes::new(TILE_DECODE_FAILED, format!("Failed to decode {}: {}", url, e)))
}

/// Alpha-blends `labels` over `tile`.
fn compose(tile: &mut RgbaImage, labels: &RgbaImage) {
    imageops::overlay(tile, labels, 0, 0);
}
