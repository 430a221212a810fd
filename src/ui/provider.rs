use std::path::PathBuf;

use egui::Context;
use walkers::sources::{Attribution, TileSource};
use walkers::{HttpOptions, HttpTiles, TileId, Tiles};

use crate::errors::error_types::ErrorTypes;
use crate::layers::base_layer::BaseLayerOption;
use crate::ui::composite_tiles::CompositeTiles;

/// Tile source backed by a base layer's URL template.
pub struct TemplateSource {
    layer: BaseLayerOption,
}

impl TemplateSource {
    pub fn new(layer: BaseLayerOption) -> Self {
        Self { layer }
    }
}

impl TileSource for TemplateSource {
    fn tile_url(&self, tile_id: TileId) -> String {
        self.layer.tile_url(tile_id.x, tile_id.y, tile_id.zoom)
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: self.layer.attribution,
            url: self.layer.attribution_url,
            logo_light: None,
            logo_dark: None,
        }
    }
}

/// Returns the HTTP options for the tile downloads.
///
/// # Arguments
/// * `cache` - Directory for the on-disk tile cache, if any.
fn http_options(cache: Option<PathBuf>) -> HttpOptions {
    HttpOptions {
        cache,
        ..Default::default()
    }
}

/// Builds the tile provider for a base layer.
///
/// Plain layers go through walkers' `HttpTiles`; layers with a label overlay
/// are composited tile by tile. Both keep their tiles under `cache` when set.
///
/// # Returns
/// `Box<dyn Tiles + Send>` - The provider to hand to the map widget.
pub fn tiles_for(
    layer: &BaseLayerOption,
    egui_ctx: Context,
    cache: Option<PathBuf>,
) -> Result<Box<dyn Tiles + Send>, ErrorTypes> {
    if layer.is_composite() {
        return Ok(Box::new(CompositeTiles::new(layer.clone(), egui_ctx, cache)?));
    }
    Ok(Box::new(HttpTiles::with_options(
        TemplateSource::new(layer.clone()),
        http_options(cache),
        egui_ctx,
    )))
}
