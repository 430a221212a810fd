use std::sync::Arc;

use crate::data::feature_collection::{BoundingBox, GeoPoint};
use crate::layers::base_layer::{BaseLayerId, BaseLayerOption};
use crate::layers::overlay::{LegendMarker, OverlayKind, OverlayLayer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Settings applied when the map widget is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapOptions {
    pub builtin_zoom_control: bool,
    pub zoom_control: ControlPosition,
    /// View shown until (or unless) the data-driven view is applied.
    pub fallback_center: GeoPoint,
    pub fallback_zoom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseLayerEntry {
    pub id: BaseLayerId,
    pub name: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayEntry {
    pub kind: OverlayKind,
    pub label: &'static str,
    pub marker: LegendMarker,
    /// Features drawn by the overlay.
    pub feature_count: usize,
}

/// Layer-selection control: base layers are single-select, overlays are
/// independent toggles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerControl {
    pub base_layers: Vec<BaseLayerEntry>,
    pub overlays: Vec<OverlayEntry>,
    pub collapsed: bool,
}

impl LayerControl {
    /// One line with every overlay's feature count, e.g. `Parks: 12 | Trails: 7`.
    pub fn summary(&self) -> String {
        self.overlays
            .iter()
            .map(|entry| format!("{}: {}", entry.label, entry.feature_count))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// What the controller needs from a map rendering library.
///
/// Tiling, projection, drawing, hit-testing and gestures stay behind this
/// trait.
pub trait MapRenderer {
    fn init_map(&mut self, options: &MapOptions);

    /// Adds a base layer. `active` marks the one shown initially.
    fn register_tile_source(&mut self, layer: &BaseLayerOption, active: bool);

    /// Draws `overlay` with its style and opens the bound popup on click.
    fn add_overlay(&mut self, overlay: Arc<OverlayLayer>);

    fn fit_bounds(&mut self, bounds: BoundingBox);

    fn set_view(&mut self, center: GeoPoint, zoom: f64);

    fn attach_layer_control(&mut self, control: LayerControl);
}
