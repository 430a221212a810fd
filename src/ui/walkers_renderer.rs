use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use egui::{Context, Ui};
use log::{info, warn};
use walkers::{Map, Tiles};

use crate::controller::renderer::{ControlPosition, LayerControl, MapOptions, MapRenderer};
use crate::controller::viewport::FIT_MAX_ZOOM;
use crate::data::feature_collection::{BoundingBox, GeoPoint};
use crate::layers::base_layer::{BaseLayerId, BaseLayerOption};
use crate::layers::overlay::OverlayLayer;
use crate::ui::map::{CustomMapMemory, PendingView};
use crate::ui::plugins::{OverlayPlugin, RenderedOverlay, Selection};
use crate::ui::{provider, windows};

/// `MapRenderer` on top of the walkers slippy map.
pub struct WalkersRenderer {
    egui_ctx: Context,
    http_cache: Option<PathBuf>,
    providers: HashMap<BaseLayerId, Box<dyn Tiles + Send>>,
    base_layers: Vec<BaseLayerOption>,
    selected_provider: Option<BaseLayerId>,
    map_memory: CustomMapMemory,
    zoom_control: Option<ControlPosition>,
    overlays: Vec<RenderedOverlay>,
    layer_control: Option<LayerControl>,
    selection: Option<Selection>,
}

impl WalkersRenderer {
    /// Creates a renderer with no base layers or overlays yet.
    ///
    /// # Arguments
    /// * `egui_ctx` - The Egui context the tile providers repaint.
    /// * `http_cache` - Directory for cached tiles, `None` to disable caching.
    pub fn new(egui_ctx: Context, http_cache: Option<PathBuf>) -> Self {
        Self {
            egui_ctx,
            http_cache,
            providers: HashMap::new(),
            base_layers: Vec::new(),
            selected_provider: None,
            map_memory: CustomMapMemory::default(),
            zoom_control: None,
            overlays: Vec::new(),
            layer_control: None,
            selection: None,
        }
    }

    fn active_layer(&self) -> Option<&BaseLayerOption> {
        let selected = self.selected_provider?;
        self.base_layers.iter().find(|layer| layer.id == selected)
    }

    /// Draws the map and its controls for this frame.
    pub fn show(&mut self, ui: &mut Ui) {
        let max_zoom = self
            .active_layer()
            .map(|layer| f64::from(layer.max_zoom))
            .unwrap_or(FIT_MAX_ZOOM)
            .min(FIT_MAX_ZOOM);
        self.map_memory.apply_pending(ui.available_size(), max_zoom);
        if self.map_memory.has_pending_view() {
            ui.ctx().request_repaint();
        }

        let tiles = match self
            .selected_provider
            .and_then(|id| self.providers.get_mut(&id))
        {
            Some(provider) => Some(provider.as_mut() as &mut dyn Tiles),
            None => None,
        };

        let map = Map::new(tiles, &mut self.map_memory.map_memory, self.map_memory.home)
            .with_plugin(OverlayPlugin {
                overlays: &self.overlays,
                selection: &mut self.selection,
            });

        ui.add(map);

        if let Some(position) = self.zoom_control {
            windows::zoom(ui, &mut self.map_memory.map_memory, position);
        }
        if let Some(control) = &self.layer_control {
            windows::layer_control(ui, control, &mut self.selected_provider, &mut self.overlays);
        }
        if let Some(layer) = self.active_layer() {
            windows::attribution(ui, layer);
        }
        self.show_popup(ui);
    }

    fn show_popup(&mut self, ui: &Ui) {
        let Some(selection) = self.selection else {
            return;
        };
        let feature = self
            .overlays
            .get(selection.overlay)
            .filter(|overlay| overlay.visible)
            .and_then(|overlay| overlay.layer.features.get(selection.feature));

        match feature {
            Some(feature) => {
                if windows::popup(ui, &feature.popup) {
                    self.selection = None;
                }
            }
            None => self.selection = None,
        }
    }
}

impl MapRenderer for WalkersRenderer {
    /// walkers has no built-in zoom buttons, so only the custom control is
    /// drawn.
    fn init_map(&mut self, options: &MapOptions) {
        self.map_memory = CustomMapMemory::new(options.fallback_center);
        self.map_memory.request(PendingView::Center {
            center: options.fallback_center,
            zoom: options.fallback_zoom,
        });
        self.zoom_control = Some(options.zoom_control);
    }

    fn register_tile_source(&mut self, layer: &BaseLayerOption, active: bool) {
        match provider::tiles_for(layer, self.egui_ctx.clone(), self.http_cache.clone()) {
            Ok(tiles) => {
                self.providers.insert(layer.id, tiles);
                self.base_layers.push(layer.clone());
                if active {
                    self.selected_provider = Some(layer.id);
                }
            }
            Err(err) => warn!("Base layer {} unavailable: {:?}", layer.name, err),
        }
    }

    fn add_overlay(&mut self, overlay: Arc<OverlayLayer>) {
        info!("Adding {} overlay with {} features", overlay.name, overlay.len());
        self.overlays.push(RenderedOverlay {
            layer: overlay,
            visible: true,
        });
    }

    fn fit_bounds(&mut self, bounds: BoundingBox) {
        self.map_memory.request(PendingView::Fit(bounds));
    }

    fn set_view(&mut self, center: GeoPoint, zoom: f64) {
        self.map_memory.request(PendingView::Center { center, zoom });
    }

    fn attach_layer_control(&mut self, control: LayerControl) {
        self.layer_control = Some(control);
    }
}
