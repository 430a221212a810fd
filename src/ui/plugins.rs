use std::sync::Arc;

use egui::{Color32, Painter, Pos2, Response, Stroke};
use log::debug;
use walkers::{Plugin, Projector};

use crate::data::feature_collection::GeoPoint;
use crate::layers::overlay::{OverlayLayer, Rgb};
use crate::ui::map::position;

/// Extra screen points around a line that still count as a click on it.
const LINE_TOLERANCE: f32 = 4.0;

/// An overlay handed to the map, with its visibility toggle.
pub struct RenderedOverlay {
    pub layer: Arc<OverlayLayer>,
    pub visible: bool,
}

/// The feature whose popup is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub overlay: usize,
    pub feature: usize,
}

pub fn color(rgb: Rgb, opacity: f32) -> Color32 {
    Color32::from_rgba_unmultiplied(rgb.0, rgb.1, rgb.2, (opacity.clamp(0.0, 1.0) * 255.0) as u8)
}

/// Draws the visible overlays and opens a popup for the clicked feature.
pub struct OverlayPlugin<'a> {
    pub overlays: &'a [RenderedOverlay],
    pub selection: &'a mut Option<Selection>,
}

impl Plugin for OverlayPlugin<'_> {
    fn run(&mut self, response: &Response, painter: Painter, projector: &Projector) {
        for overlay in self.overlays.iter().filter(|overlay| overlay.visible) {
            paint_overlay(&painter, projector, &overlay.layer);
        }

        if let Some(selection) = *self.selection {
            highlight(&painter, projector, self.overlays, selection);
        }

        if !response.changed() && response.clicked_by(egui::PointerButton::Primary) {
            if let Some(pointer_pos) = response.interact_pointer_pos() {
                *self.selection = hit_test(self.overlays, pointer_pos, |point| {
                    projector.project(position(point)).to_pos2()
                });
                if let Some(feature) = self.selection.and_then(|selection| {
                    self.overlays
                        .get(selection.overlay)
                        .and_then(|overlay| overlay.layer.features.get(selection.feature))
                }) {
                    debug!("Selected {}", feature.popup);
                }
            }
        }
    }
}

fn paint_overlay(painter: &Painter, projector: &Projector, layer: &OverlayLayer) {
    let style = &layer.style;
    let line_stroke = Stroke::new(style.stroke_weight, color(style.stroke, style.stroke_opacity));
    let fill = style
        .fill
        .map(|fill| color(fill, style.fill_opacity))
        .unwrap_or(Color32::TRANSPARENT);

    for feature in &layer.features {
        for line in feature.geometry.lines() {
            let screen: Vec<Pos2> = line
                .iter()
                .map(|point| projector.project(position(*point)).to_pos2())
                .collect();
            for segment in screen.windows(2) {
                painter.line_segment([segment[0], segment[1]], line_stroke);
            }
        }
        for point in feature.geometry.points() {
            let center = projector.project(position(*point)).to_pos2();
            painter.circle(center, style.radius, fill, line_stroke);
        }
    }
}

fn highlight(painter: &Painter, projector: &Projector, overlays: &[RenderedOverlay], selection: Selection) {
    let Some(overlay) = overlays.get(selection.overlay).filter(|overlay| overlay.visible) else {
        return;
    };
    let Some(feature) = overlay.layer.features.get(selection.feature) else {
        return;
    };
    let stroke = Stroke::new(2.0, Color32::BLUE);
    for point in feature.geometry.coordinates() {
        painter.circle_stroke(projector.project(position(point)).to_pos2(), 5.0, stroke);
    }
}

/// Finds the feature under `pointer`. Points win over lines, and later
/// overlays (drawn on top) win over earlier ones.
pub fn hit_test<F>(overlays: &[RenderedOverlay], pointer: Pos2, project: F) -> Option<Selection>
where
    F: Fn(GeoPoint) -> Pos2,
{
    let visible = || {
        overlays
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, overlay)| overlay.visible)
    };

    for (overlay_index, overlay) in visible() {
        let reach = overlay.layer.style.radius + overlay.layer.style.stroke_weight;
        for (feature_index, feature) in overlay.layer.features.iter().enumerate() {
            if feature
                .geometry
                .points()
                .iter()
                .any(|point| project(*point).distance(pointer) <= reach)
            {
                return Some(Selection {
                    overlay: overlay_index,
                    feature: feature_index,
                });
            }
        }
    }

    for (overlay_index, overlay) in visible() {
        let reach = overlay.layer.style.stroke_weight / 2.0 + LINE_TOLERANCE;
        for (feature_index, feature) in overlay.layer.features.iter().enumerate() {
            let hit = feature.geometry.lines().into_iter().any(|line| {
                line.windows(2).any(|segment| {
                    distance_to_segment(pointer, project(segment[0]), project(segment[1])) <= reach
                })
            });
            if hit {
                return Some(Selection {
                    overlay: overlay_index,
                    feature: feature_index,
                });
            }
        }
    }

    None
}

/// Distance from `point` to the segment `a`-`b`, in screen points.
pub fn distance_to_segment(point: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let length_sq = ab.length_sq();
    if length_sq == 0.0 {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / length_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}
