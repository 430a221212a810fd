use std::sync::Arc;
use std::time::{Duration, Instant};

use egui::Context;
use threadpool::ThreadPool;

use crate::config::map_config::MapConfig;
use crate::controller::map_view_controller::MapViewController;
use crate::data::fetcher::DatasetFetcher;
use crate::data::loader::PendingLoad;
use crate::ui::walkers_renderer::WalkersRenderer;
use crate::ui::windows;

const LOAD_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Main application structure.
pub struct ParksTrailsApp {
    controller: MapViewController<WalkersRenderer>,
    pending_load: Option<PendingLoad>,
    _pool: ThreadPool,
}

impl ParksTrailsApp {
    /// Creates a new instance of `ParksTrailsApp` and starts loading the datasets
    /// right away, without waiting for the intro panel.
    ///
    /// # Arguments
    /// * `egui_ctx` - The Egui context.
    /// * `config` - Session settings.
    pub fn new(egui_ctx: Context, config: MapConfig) -> Self {
        egui_extras::install_image_loaders(&egui_ctx);

        let renderer = WalkersRenderer::new(egui_ctx, config.http_cache.clone());
        let mut controller = MapViewController::new(renderer, config);
        let pool = ThreadPool::new(2);

        let pending_load = match DatasetFetcher::new()
            .and_then(|fetcher| controller.begin_load(&pool, Arc::new(fetcher)))
        {
            Ok(pending) => Some(pending),
            Err(err) => {
                controller.fail_load(err);
                None
            }
        };

        Self {
            controller,
            pending_load,
            _pool: pool,
        }
    }
}

impl eframe::App for ParksTrailsApp {
    /// Updates the application state.
    ///
    /// # Arguments
    /// * `ctx` - The Egui context.
    /// * `_frame` - The Eframe frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(pending) = self.pending_load.as_mut() {
            if self.controller.poll_load(pending) {
                self.pending_load = None;
            } else {
                ctx.request_repaint_after(LOAD_POLL_INTERVAL);
            }
        }

        let rimless = egui::Frame {
            fill: ctx.style().visuals.panel_fill,
            ..Default::default()
        };

        egui::CentralPanel::default()
            .frame(rimless)
            .show(ctx, |ui| {
                self.controller.renderer_mut().show(ui);

                if windows::reset_view(ui) {
                    self.controller.reset_view();
                }

                if self.controller.splash_visible() && windows::splash(ui) {
                    self.controller.dismiss_splash();
                }

                if self.controller.is_loading() {
                    windows::loading(ui);
                }

                let now = Instant::now();
                if let Some(banner) = self.controller.active_error(now) {
                    windows::error_banner(ui, banner.message());
                    ui.ctx().request_repaint_after(banner.remaining(now));
                }
            });
    }
}
