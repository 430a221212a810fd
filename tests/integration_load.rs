use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parks_trails_map::config::map_config::MapConfig;
use parks_trails_map::controller::map_view_controller::{LoadState, MapViewController};
use parks_trails_map::controller::renderer::{LayerControl, MapOptions, MapRenderer};
use parks_trails_map::controller::viewport::ViewportState;
use parks_trails_map::data::feature_collection::{BoundingBox, GeoPoint};
use parks_trails_map::data::fetcher::{FetchResponse, Fetcher};
use parks_trails_map::errors::error_types::{ErrorTypes, LOAD_ALREADY_STARTED};
use parks_trails_map::layers::base_layer::{BaseLayerId, BaseLayerOption};
use parks_trails_map::layers::overlay::{MarkerShape, OverlayKind, OverlayLayer};
use parks_trails_map::layers::popup::PopupValue;
use threadpool::ThreadPool;

const PARKS: &str = r#"{"type":"FeatureCollection","features":[
    {"type":"Feature","geometry":{"type":"Point","coordinates":[-85.3076,35.0610]},
     "properties":{"Name":"Coolidge Park","name":"coolidge park","ADDRESS":"150 River St","ACRES":10.5}},
    {"type":"Feature","geometry":{"type":"Point","coordinates":[-85.3120,35.0570]},
     "properties":{"name":"Renaissance Park","EXT_LINK":"https://example.org/renaissance"}}
]}"#;

const TRAILS: &str = r#"{"type":"FeatureCollection","features":[
    {"type":"Feature","geometry":{"type":"LineString","coordinates":[[-85.3300,35.0400],[-85.3000,35.0550],[-85.2700,35.0600]]},
     "properties":{"NAME":"Tennessee Riverwalk","LENGTH_MI":13.0,"ADA":"Yes"}},
    {"type":"Feature","geometry":{"type":"MultiLineString","coordinates":[[[-85.3200,35.0800],[-85.3350,35.0950]]]},
     "properties":{"NAME":"Stringers Ridge","TRAIL_TYPE":"Natural surface"}}
]}"#;

const EMPTY: &str = r#"{"type":"FeatureCollection","features":[]}"#;

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Init(MapOptions),
    TileSource(BaseLayerId, bool),
    Overlay(OverlayKind, usize),
    Fit(BoundingBox),
    View(GeoPoint, f64),
    LayerControl(LayerControl),
}

#[derive(Default)]
struct RecordingRenderer {
    events: Vec<Event>,
    /// What the map shows, including user panning.
    current: Option<ViewportState>,
}

impl RecordingRenderer {
    fn overlays(&self) -> Vec<OverlayKind> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Overlay(kind, _) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    fn layer_control(&self) -> Option<&LayerControl> {
        self.events.iter().find_map(|event| match event {
            Event::LayerControl(control) => Some(control),
            _ => None,
        })
    }

    fn position_of(&self, wanted: fn(&Event) -> bool) -> usize {
        self.events.iter().position(wanted).unwrap()
    }
}

impl MapRenderer for RecordingRenderer {
    fn init_map(&mut self, options: &MapOptions) {
        self.events.push(Event::Init(*options));
        self.current = Some(ViewportState::Center {
            center: options.fallback_center,
            zoom: options.fallback_zoom,
        });
    }

    fn register_tile_source(&mut self, layer: &BaseLayerOption, active: bool) {
        self.events.push(Event::TileSource(layer.id, active));
    }

    fn add_overlay(&mut self, overlay: Arc<OverlayLayer>) {
        self.events.push(Event::Overlay(overlay.kind, overlay.len()));
    }

    fn fit_bounds(&mut self, bounds: BoundingBox) {
        self.events.push(Event::Fit(bounds));
        self.current = Some(ViewportState::Fit(bounds));
    }

    fn set_view(&mut self, center: GeoPoint, zoom: f64) {
        self.events.push(Event::View(center, zoom));
        self.current = Some(ViewportState::Center { center, zoom });
    }

    fn attach_layer_control(&mut self, control: LayerControl) {
        self.events.push(Event::LayerControl(control));
    }
}

struct StubFetcher {
    responses: HashMap<String, FetchResponse>,
}

impl StubFetcher {
    fn new(parks: FetchResponse, trails: FetchResponse) -> Arc<dyn Fetcher> {
        let config = MapConfig::default();
        let mut responses = HashMap::new();
        responses.insert(config.parks_location, parks);
        responses.insert(config.trails_location, trails);
        Arc::new(Self { responses })
    }
}

impl Fetcher for StubFetcher {
    fn get(&self, location: &str) -> Result<FetchResponse, ErrorTypes> {
        self.responses.get(location).cloned().ok_or_else(|| {
            ErrorTypes::new(101, format!("Failed to reach {}: connection refused", location))
        })
    }
}

fn controller() -> MapViewController<RecordingRenderer> {
    MapViewController::new(RecordingRenderer::default(), MapConfig::default())
}

fn loaded(parks: FetchResponse, trails: FetchResponse) -> MapViewController<RecordingRenderer> {
    let mut controller = controller();
    let pool = ThreadPool::new(2);
    controller
        .load_data(&pool, StubFetcher::new(parks, trails))
        .unwrap();
    controller
}

fn trail_coordinates() -> Vec<GeoPoint> {
    vec![
        GeoPoint::new(35.0400, -85.3300),
        GeoPoint::new(35.0550, -85.3000),
        GeoPoint::new(35.0600, -85.2700),
        GeoPoint::new(35.0800, -85.3200),
        GeoPoint::new(35.0950, -85.3350),
    ]
}

#[test]
fn test_successful_load_builds_overlays_and_fits_trails() {
    let controller = loaded(FetchResponse::ok(PARKS), FetchResponse::ok(TRAILS));

    assert_eq!(controller.state(), LoadState::Ready);
    assert!(!controller.is_loading());
    assert!(controller.active_error(Instant::now()).is_none());

    let renderer = controller.renderer();
    let mut overlays = renderer.overlays();
    overlays.sort_by_key(|kind| *kind == OverlayKind::Trails);
    assert_eq!(overlays, vec![OverlayKind::Parks, OverlayKind::Trails]);

    match controller.viewport() {
        ViewportState::Fit(bounds) => {
            for point in trail_coordinates() {
                assert!(bounds.contains(point), "{:?} outside {:?}", point, bounds);
            }
            assert_eq!(bounds.south, 35.0400);
            assert_eq!(bounds.north, 35.0950);
            assert_eq!(bounds.west, -85.3350);
            assert_eq!(bounds.east, -85.2700);
        }
        other => panic!("expected a fitted viewport, got {:?}", other),
    }
}

#[test]
fn test_load_sequence_order() {
    let controller = loaded(FetchResponse::ok(PARKS), FetchResponse::ok(TRAILS));
    let renderer = controller.renderer();

    assert!(matches!(renderer.events[0], Event::Init(_)));
    let last_tile_source = renderer
        .events
        .iter()
        .rposition(|event| matches!(event, Event::TileSource(..)))
        .unwrap();
    let fit = renderer.position_of(|event| matches!(event, Event::Fit(_)));
    let control = renderer.position_of(|event| matches!(event, Event::LayerControl(_)));
    let first_overlay = renderer.position_of(|event| matches!(event, Event::Overlay(..)));

    assert!(last_tile_source < fit);
    assert!(fit < control);
    assert!(control < first_overlay);
}

#[test]
fn test_layer_control_lists_base_layers_and_marked_overlays() {
    let controller = loaded(FetchResponse::ok(PARKS), FetchResponse::ok(TRAILS));
    let control = controller.renderer().layer_control().unwrap();

    assert_eq!(control.base_layers.len(), 5);
    assert_eq!(control.base_layers[0].id, BaseLayerId::Topographic);
    assert!(!control.collapsed);

    let parks = control
        .overlays
        .iter()
        .find(|entry| entry.kind == OverlayKind::Parks)
        .unwrap();
    let trails = control
        .overlays
        .iter()
        .find(|entry| entry.kind == OverlayKind::Trails)
        .unwrap();
    assert_eq!(parks.feature_count, 2);
    assert_eq!(trails.feature_count, 2);
    assert_eq!(control.summary(), "Parks: 2 | Trails: 2");
    assert_eq!(parks.marker.shape, MarkerShape::Dot);
    assert_eq!(trails.marker.shape, MarkerShape::Line);
    assert_ne!(parks.marker.color, trails.marker.color);
}

#[test]
fn test_only_first_base_layer_is_active() {
    let controller = controller();
    let active: Vec<BaseLayerId> = controller
        .renderer()
        .events
        .iter()
        .filter_map(|event| match event {
            Event::TileSource(id, true) => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(active, vec![BaseLayerId::Topographic]);
}

#[test]
fn test_parks_http_500_adds_nothing_and_shows_banner() {
    let controller = loaded(
        FetchResponse {
            status: 500,
            body: "Internal Server Error".to_string(),
        },
        FetchResponse::ok(TRAILS),
    );

    assert_eq!(controller.state(), LoadState::Errored);
    assert!(!controller.is_loading());
    assert!(controller.renderer().overlays().is_empty());
    assert!(controller.renderer().layer_control().is_none());
    assert_eq!(controller.overlays().count(), 0);

    let now = Instant::now();
    let banner = controller.active_error(now).unwrap();
    assert!(!banner.message().is_empty());
    assert!(banner.message().contains("500"));

    assert!(controller
        .active_error(now + Duration::from_secs(6))
        .is_none());
}

#[test]
fn test_unreachable_and_malformed_data_fail_the_load() {
    let unreachable = {
        let mut controller = controller();
        let pool = ThreadPool::new(2);
        let fetcher: Arc<dyn Fetcher> = Arc::new(StubFetcher {
            responses: HashMap::new(),
        });
        controller.load_data(&pool, fetcher).unwrap();
        controller
    };
    let malformed = loaded(FetchResponse::ok(PARKS), FetchResponse::ok("{\"features\": ["));

    for controller in [unreachable, malformed] {
        assert_eq!(controller.state(), LoadState::Errored);
        assert!(!controller.is_loading());
        assert!(controller.renderer().overlays().is_empty());
        assert!(controller.active_error(Instant::now()).is_some());
    }
}

#[test]
fn test_empty_trails_fall_back_to_default_view() {
    let controller = loaded(FetchResponse::ok(PARKS), FetchResponse::ok(EMPTY));
    let config = MapConfig::default();

    assert_eq!(controller.state(), LoadState::Ready);
    assert_eq!(
        controller.viewport(),
        ViewportState::Center {
            center: config.default_center,
            zoom: config.default_zoom,
        }
    );
    assert!(!controller
        .renderer()
        .events
        .iter()
        .any(|event| matches!(event, Event::Fit(_))));
}

#[test]
fn test_park_popup_prefers_capitalised_name() {
    let controller = loaded(FetchResponse::ok(PARKS), FetchResponse::ok(TRAILS));
    let parks = controller
        .overlays()
        .find(|overlay| overlay.kind == OverlayKind::Parks)
        .unwrap();

    let coolidge = &parks.features[0].popup;
    assert_eq!(coolidge.title.as_text(), "Coolidge Park");
    assert_eq!(coolidge.value("Address").unwrap().as_text(), "150 River St");
    assert_eq!(coolidge.value("Hours"), Some(&PopupValue::Missing));

    let renaissance = &parks.features[1].popup;
    assert_eq!(renaissance.title.as_text(), "Renaissance Park");
    assert_eq!(
        renaissance.value("More info"),
        Some(&PopupValue::Link("https://example.org/renaissance".to_string()))
    );
    assert_eq!(renaissance.value("Acres").unwrap().as_text(), "N/A");
}

#[test]
fn test_reset_after_pan_returns_to_trails() {
    let mut controller = loaded(FetchResponse::ok(PARKS), FetchResponse::ok(TRAILS));
    let fitted = controller.viewport();

    controller.renderer_mut().current = Some(ViewportState::Center {
        center: GeoPoint::new(36.16, -86.78),
        zoom: 9.0,
    });
    controller.reset_view();

    assert_eq!(controller.viewport(), fitted);
    assert_eq!(controller.renderer().current, Some(fitted));
}

#[test]
fn test_splash_dismissal_does_not_touch_the_load() {
    let pool = ThreadPool::new(2);

    let mut untouched = controller();
    untouched
        .load_data(
            &pool,
            StubFetcher::new(FetchResponse::ok(PARKS), FetchResponse::ok(TRAILS)),
        )
        .unwrap();

    let mut dismissed_early = controller();
    assert!(dismissed_early.splash_visible());
    let pending = dismissed_early
        .begin_load(
            &pool,
            StubFetcher::new(FetchResponse::ok(PARKS), FetchResponse::ok(TRAILS)),
        )
        .unwrap();
    dismissed_early.dismiss_splash();
    assert!(dismissed_early.is_loading());
    dismissed_early.finish_load(pending.wait());
    dismissed_early.dismiss_splash();

    assert!(!dismissed_early.splash_visible());
    assert_eq!(dismissed_early.state(), untouched.state());
    assert_eq!(dismissed_early.viewport(), untouched.viewport());
    assert_eq!(
        dismissed_early.renderer().events,
        untouched.renderer().events
    );
}

#[test]
fn test_failed_load_is_not_retried() {
    let mut controller = loaded(
        FetchResponse {
            status: 500,
            body: String::new(),
        },
        FetchResponse::ok(TRAILS),
    );
    let pool = ThreadPool::new(2);
    let second = controller.begin_load(
        &pool,
        StubFetcher::new(FetchResponse::ok(PARKS), FetchResponse::ok(TRAILS)),
    );
    match second {
        Err(err) => assert_eq!(err.code(), LOAD_ALREADY_STARTED),
        Ok(_) => panic!("a second load must be refused"),
    }
    assert_eq!(controller.state(), LoadState::Errored);
    assert!(!controller.is_loading());
}

#[test]
fn test_undrawn_geometry_kinds_do_not_fail_the_load() {
    let trails = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","geometry":{"type":"LineString","coordinates":[[-85.3300,35.0400],[-85.2700,35.0600]]},
         "properties":{"NAME":"Tennessee Riverwalk"}},
        {"type":"Feature","geometry":{"type":"Polygon","coordinates":[[[-85.31,35.05],[-85.30,35.05],[-85.30,35.06],[-85.31,35.05]]]},
         "properties":{"NAME":"Trailhead plaza"}}
    ]}"#;
    let controller = loaded(FetchResponse::ok(PARKS), FetchResponse::ok(trails));

    assert_eq!(controller.state(), LoadState::Ready);
    let control = controller.renderer().layer_control().unwrap();
    assert_eq!(control.summary(), "Parks: 2 | Trails: 1");
    assert_eq!(
        controller.viewport(),
        ViewportState::Fit(BoundingBox {
            south: 35.0400,
            west: -85.3300,
            north: 35.0600,
            east: -85.2700,
        })
    );
}
