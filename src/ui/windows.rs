use egui::{Align2, Color32, RichText, Sense, Ui, Vec2, Window};
use walkers::MapMemory;

use crate::controller::renderer::{ControlPosition, LayerControl};
use crate::layers::base_layer::{BaseLayerId, BaseLayerOption};
use crate::layers::overlay::{LegendMarker, MarkerShape};
use crate::layers::popup::{PopupRecord, PopupValue};
use crate::ui::plugins::{color, RenderedOverlay};

fn anchor(position: ControlPosition) -> (Align2, [f32; 2]) {
    match position {
        ControlPosition::TopLeft => (Align2::LEFT_TOP, [10., 10.]),
        ControlPosition::TopRight => (Align2::RIGHT_TOP, [-10., 10.]),
        ControlPosition::BottomLeft => (Align2::LEFT_BOTTOM, [10., -10.]),
        ControlPosition::BottomRight => (Align2::RIGHT_BOTTOM, [-10., -30.]),
    }
}

/// Shows the zoom window.
///
/// # Arguments
/// * `ui` - The Egui UI.
/// * `map_memory` - The map memory.
/// * `position` - Corner the buttons are pinned to.
pub fn zoom(ui: &Ui, map_memory: &mut MapMemory, position: ControlPosition) {
    let (align, offset) = anchor(position);
    Window::new("Zoom")
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .anchor(align, offset)
        .show(ui.ctx(), |ui| {
            ui.vertical(|ui| {
                if ui.button(RichText::new("➕").heading()).clicked() {
                    let _ = map_memory.zoom_in();
                }

                if ui.button(RichText::new("➖").heading()).clicked() {
                    let _ = map_memory.zoom_out();
                }
            });
        });
}

/// Shows the layer-selection window: one base layer at a time, overlays
/// toggled independently, and the feature counts below them.
///
/// # Arguments
/// * `ui` - The Egui UI.
/// * `control` - Entries to list.
/// * `selected` - The active base layer, updated by the radio buttons.
/// * `overlays` - Overlays whose visibility the checkboxes toggle.
pub fn layer_control(
    ui: &Ui,
    control: &LayerControl,
    selected: &mut Option<BaseLayerId>,
    overlays: &mut [RenderedOverlay],
) {
    Window::new("Layers")
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .anchor(Align2::RIGHT_TOP, [-10., 10.])
        .show(ui.ctx(), |ui| {
            egui::CollapsingHeader::new("Layers")
                .default_open(!control.collapsed)
                .show(ui, |ui| {
                    for entry in &control.base_layers {
                        ui.radio_value(selected, Some(entry.id), entry.name);
                    }
                    ui.separator();
                    for entry in &control.overlays {
                        let Some(overlay) = overlays
                            .iter_mut()
                            .find(|overlay| overlay.layer.kind == entry.kind)
                        else {
                            continue;
                        };
                        ui.horizontal(|ui| {
                            ui.checkbox(&mut overlay.visible, "");
                            legend_marker(ui, entry.marker);
                            ui.label(entry.label);
                        });
                    }
                    ui.separator();
                    ui.label(RichText::new(control.summary()).small());
                });
        });
}

fn legend_marker(ui: &mut Ui, marker: LegendMarker) {
    let (rect, _) = ui.allocate_exact_size(Vec2::splat(14.0), Sense::hover());
    let painter = ui.painter();
    let fill = color(marker.color, 1.0);
    match marker.shape {
        MarkerShape::Dot => {
            painter.circle(rect.center(), 5.0, fill, egui::Stroke::new(1.5, Color32::WHITE));
        }
        MarkerShape::Line => {
            painter.line_segment(
                [rect.left_center(), rect.right_center()],
                egui::Stroke::new(4.0, fill),
            );
        }
    }
}

/// Shows a feature's popup. Returns `true` when the user closed it.
pub fn popup(ui: &Ui, record: &PopupRecord) -> bool {
    let mut closed = false;
    Window::new("Feature")
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .anchor(Align2::LEFT_TOP, [10., 60.])
        .show(ui.ctx(), |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(record.title.as_text()).size(18.0).strong());
                if ui.small_button("✖").clicked() {
                    closed = true;
                }
            });
            ui.separator();
            egui::Grid::new("feature popup").num_columns(2).show(ui, |ui| {
                for row in &record.rows {
                    ui.label(RichText::new(row.label).strong());
                    match &row.value {
                        PopupValue::Link(url) => {
                            ui.hyperlink_to("Visit website", url);
                        }
                        value => {
                            ui.label(value.as_text());
                        }
                    }
                    ui.end_row();
                }
            });
        });
    closed
}

/// Shows the tile attribution of the active base layer.
pub fn attribution(ui: &Ui, layer: &BaseLayerOption) {
    Window::new("Attribution")
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .anchor(Align2::RIGHT_BOTTOM, [-10., -5.])
        .show(ui.ctx(), |ui| {
            ui.hyperlink_to(RichText::new(layer.attribution).small(), layer.attribution_url);
        });
}

/// Shows the introductory panel. Returns `true` when it was dismissed.
pub fn splash(ui: &Ui) -> bool {
    let mut dismissed = false;
    Window::new("Welcome")
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .anchor(Align2::CENTER_CENTER, [0., 0.])
        .show(ui.ctx(), |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Chattanooga Parks & Trails");
                ui.label("Explore the city's parks and trails. Click a park or a trail for details, and use the layer control to switch base maps.");
                ui.add_space(8.0);
                if ui.button(RichText::new("Explore the map").heading()).clicked() {
                    dismissed = true;
                }
            });
        });
    dismissed
}

/// Shows the reset-view button. Returns `true` when it was clicked.
pub fn reset_view(ui: &Ui) -> bool {
    let mut clicked = false;
    Window::new("Reset view")
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .anchor(Align2::LEFT_TOP, [10., 10.])
        .show(ui.ctx(), |ui| {
            clicked = ui.button("⟲ Reset view").clicked();
        });
    clicked
}

/// Shows a spinner while the datasets are being fetched.
///
/// # Arguments
/// * `ui` - The Egui UI.
pub fn loading(ui: &Ui) {
    Window::new("Loading")
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .anchor(Align2::CENTER_BOTTOM, [0., -40.])
        .show(ui.ctx(), |ui| {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading parks and trails…");
            });
        });
}

/// Shows the load failure at the top of the map.
///
/// # Arguments
/// * `ui` - The Egui UI.
/// * `message` - Text of the active banner.
pub fn error_banner(ui: &Ui, message: &str) {
    Window::new("Error")
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .anchor(Align2::CENTER_TOP, [0., 10.])
        .show(ui.ctx(), |ui| {
            ui.label(RichText::new(message).color(Color32::RED));
        });
}
