use std::sync::Arc;
use std::time::Instant;

use log::{error, info};
use threadpool::ThreadPool;

use crate::config::map_config::MapConfig;
use crate::controller::renderer::{
    BaseLayerEntry, ControlPosition, LayerControl, MapOptions, MapRenderer, OverlayEntry,
};
use crate::controller::status::{ErrorBanner, LoadingIndicator, SplashPanel};
use crate::controller::viewport::ViewportState;
use crate::data::fetcher::Fetcher;
use crate::data::loader::{Datasets, PendingLoad};
use crate::errors::error_types::{ErrorTypes, LOAD_ALREADY_STARTED};
use crate::layers::base_layer::{base_layers, BaseLayerOption};
use crate::layers::overlay::{parks_overlay, trails_overlay, OverlayLayer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Errored,
}

/// Owns the map for one session: base layers, the data load, the two
/// overlays and the viewport.
pub struct MapViewController<R: MapRenderer> {
    renderer: R,
    config: MapConfig,
    base_layers: Vec<BaseLayerOption>,
    state: LoadState,
    loading: LoadingIndicator,
    error_banner: Option<ErrorBanner>,
    splash: SplashPanel,
    parks: Option<Arc<OverlayLayer>>,
    trails: Option<Arc<OverlayLayer>>,
    viewport: ViewportState,
}

impl<R: MapRenderer> MapViewController<R> {
    /// Initializes the map widget and registers the base layers, the first of
    /// which is shown.
    pub fn new(mut renderer: R, config: MapConfig) -> Self {
        renderer.init_map(&MapOptions {
            builtin_zoom_control: false,
            zoom_control: ControlPosition::BottomRight,
            fallback_center: config.default_center,
            fallback_zoom: config.default_zoom,
        });

        let base_layers = base_layers();
        for (index, layer) in base_layers.iter().enumerate() {
            renderer.register_tile_source(layer, index == 0);
        }
        info!("Registered {} base layers", base_layers.len());

        let viewport = ViewportState::Center {
            center: config.default_center,
            zoom: config.default_zoom,
        };

        Self {
            renderer,
            config,
            base_layers,
            state: LoadState::Idle,
            loading: LoadingIndicator::default(),
            error_banner: None,
            splash: SplashPanel::default(),
            parks: None,
            trails: None,
            viewport,
        }
    }

    /// Shows the loading indicator and starts fetching both datasets.
    ///
    /// A controller loads once; a failed load is not retried.
    pub fn begin_load(
        &mut self,
        pool: &ThreadPool,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<PendingLoad, ErrorTypes> {
        if self.state != LoadState::Idle {
            return Err(ErrorTypes::new(
                LOAD_ALREADY_STARTED,
                format!("Map data load already attempted ({:?})", self.state),
            ));
        }
        self.state = LoadState::Loading;
        self.loading.show();
        info!(
            "Loading {} and {}",
            self.config.parks_location, self.config.trails_location
        );
        Ok(PendingLoad::start(
            pool,
            fetcher,
            &self.config.parks_location,
            &self.config.trails_location,
        ))
    }

    /// Applies the outcome of a load. Returns `true` once the load settled.
    pub fn poll_load(&mut self, pending: &mut PendingLoad) -> bool {
        match pending.poll() {
            Some(result) => {
                self.finish_load(result);
                true
            }
            None => false,
        }
    }

    /// Builds the overlays and the view from the datasets, or reports the
    /// failure. The loading indicator is hidden either way.
    pub fn finish_load(&mut self, result: Result<Datasets, ErrorTypes>) {
        match result {
            Ok(datasets) => self.apply_datasets(datasets),
            Err(err) => self.fail_load(err),
        }
        self.loading.hide();
    }

    /// Blocking `begin_load` + `finish_load`.
    pub fn load_data(
        &mut self,
        pool: &ThreadPool,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<(), ErrorTypes> {
        let pending = self.begin_load(pool, fetcher)?;
        self.finish_load(pending.wait());
        Ok(())
    }

    /// Ends the load attempt with `err`: no overlays, a banner and a log line.
    pub fn fail_load(&mut self, err: ErrorTypes) {
        let (code, message) = err.get();
        error!("Failed to load map data (code {}): {}", code, message);
        self.error_banner = Some(ErrorBanner::new(
            format!("Could not load park and trail data: {}", message),
            Instant::now(),
            self.config.error_banner_ttl,
        ));
        self.state = LoadState::Errored;
        self.loading.hide();
    }

    fn apply_datasets(&mut self, datasets: Datasets) {
        let parks = Arc::new(parks_overlay(&datasets.parks));
        let trails = Arc::new(trails_overlay(&datasets.trails));
        self.parks = Some(Arc::clone(&parks));
        self.trails = Some(Arc::clone(&trails));

        self.set_initial_view();

        let control = self.layer_control();
        self.renderer.attach_layer_control(control);
        self.renderer.add_overlay(trails);
        self.renderer.add_overlay(parks);

        self.state = LoadState::Ready;
        info!("Map ready");
    }

    fn layer_control(&self) -> LayerControl {
        LayerControl {
            base_layers: self
                .base_layers
                .iter()
                .map(|layer| BaseLayerEntry {
                    id: layer.id,
                    name: layer.name,
                })
                .collect(),
            overlays: [&self.parks, &self.trails]
                .into_iter()
                .flatten()
                .map(|overlay| OverlayEntry {
                    kind: overlay.kind,
                    label: overlay.name,
                    marker: overlay.marker,
                    feature_count: overlay.len(),
                })
                .collect(),
            collapsed: false,
        }
    }

    /// Fits the trails when they have an extent, else shows the default view.
    pub fn set_initial_view(&mut self) {
        self.viewport = match self.trails.as_ref().and_then(|trails| trails.bounds) {
            Some(bounds) => ViewportState::Fit(bounds),
            None => ViewportState::Center {
                center: self.config.default_center,
                zoom: self.config.default_zoom,
            },
        };
        match self.viewport {
            ViewportState::Fit(bounds) => self.renderer.fit_bounds(bounds),
            ViewportState::Center { center, zoom } => self.renderer.set_view(center, zoom),
        }
        info!("Viewport set to {:?}", self.viewport);
    }

    /// Recomputes the initial view, discarding wherever the user panned to.
    pub fn reset_view(&mut self) {
        self.set_initial_view();
    }

    /// Hides the intro panel. The load is unaffected.
    pub fn dismiss_splash(&mut self) {
        self.splash.dismiss();
    }

    pub fn splash_visible(&self) -> bool {
        self.splash.is_visible()
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Whether the loading indicator is showing.
    pub fn is_loading(&self) -> bool {
        self.loading.is_visible()
    }

    /// The view last handed to the renderer.
    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    /// The banner, if it is still within its display time at `now`.
    pub fn active_error(&self, now: Instant) -> Option<&ErrorBanner> {
        self.error_banner
            .as_ref()
            .filter(|banner| banner.is_active(now))
    }

    /// Parks then trails, once loaded.
    pub fn overlays(&self) -> impl Iterator<Item = &Arc<OverlayLayer>> {
        [&self.parks, &self.trails].into_iter().flatten()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}
