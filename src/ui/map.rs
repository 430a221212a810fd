use egui::Vec2;
use log::debug;
use walkers::{MapMemory, Position};

use crate::controller::viewport::{fit_view, FIT_PADDING};
use crate::data::feature_collection::{BoundingBox, GeoPoint};

/// A view requested before the map knew its size on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PendingView {
    Fit(BoundingBox),
    Center { center: GeoPoint, zoom: f64 },
}

#[derive(Debug)]
pub struct CustomMapMemory {
    pub map_memory: MapMemory,
    pub home: Position,
    pending_view: Option<PendingView>,
}

impl CustomMapMemory {
    pub fn new(home: GeoPoint) -> Self {
        Self {
            map_memory: MapMemory::default(),
            home: position(home),
            pending_view: None,
        }
    }

    pub fn request(&mut self, view: PendingView) {
        self.pending_view = Some(view);
    }

    pub fn has_pending_view(&self) -> bool {
        self.pending_view.is_some()
    }

    /// Applies the requested view once the map area has a real size.
    pub fn apply_pending(&mut self, size: Vec2, max_zoom: f64) {
        if size.x <= 0.0 || size.y <= 0.0 {
            return;
        }
        let Some(view) = self.pending_view.take() else {
            return;
        };

        let (center, zoom) = match view {
            PendingView::Fit(bounds) => fit_view(&bounds, size.x, size.y, FIT_PADDING, max_zoom),
            PendingView::Center { center, zoom } => (center, zoom),
        };
        debug!("Centering at {:?}, zoom {}", center, zoom);
        self.map_memory.center_at(position(center));
        let _ = self.map_memory.set_zoom(zoom as f32);
    }
}

impl Default for CustomMapMemory {
    fn default() -> Self {
        Self::new(crate::config::map_config::DEFAULT_CENTER)
    }
}

pub fn position(point: GeoPoint) -> Position {
    Position::from_lon_lat(point.lon, point.lat)
}
