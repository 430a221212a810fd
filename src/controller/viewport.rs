use std::f64::consts::PI;

use crate::data::feature_collection::{BoundingBox, GeoPoint};

pub const TILE_SIZE: f64 = 256.0;
/// Screen points kept free around fitted bounds.
pub const FIT_PADDING: f32 = 20.0;
pub const FIT_MAX_ZOOM: f64 = 18.0;

const MAX_LATITUDE: f64 = 85.051_128_78;

/// What the map should show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportState {
    Center { center: GeoPoint, zoom: f64 },
    Fit(BoundingBox),
}

/// Center and zoom that show `bounds` entirely in a `width` x `height` map.
///
/// The zoom is snapped down to a whole level so tiles render at their native
/// resolution. A single-point box zooms in to `max_zoom`.
pub fn fit_view(
    bounds: &BoundingBox,
    width: f32,
    height: f32,
    padding: f32,
    max_zoom: f64,
) -> (GeoPoint, f64) {
    if bounds.is_point() {
        return (bounds.center(), max_zoom);
    }

    let (west, north) = to_mercator(bounds.north, bounds.west);
    let (east, south) = to_mercator(bounds.south, bounds.east);

    let span_x = (east - west).abs() * TILE_SIZE;
    let span_y = (south - north).abs() * TILE_SIZE;
    let available_x = f64::from((width - 2.0 * padding).max(1.0));
    let available_y = f64::from((height - 2.0 * padding).max(1.0));

    let zoom_x = if span_x > 0.0 {
        (available_x / span_x).log2()
    } else {
        max_zoom
    };
    let zoom_y = if span_y > 0.0 {
        (available_y / span_y).log2()
    } else {
        max_zoom
    };
    let zoom = zoom_x.min(zoom_y).floor().clamp(0.0, max_zoom);

    let center = from_mercator((west + east) / 2.0, (north + south) / 2.0);
    (center, zoom)
}

/// Web Mercator, normalised to 0..1 with y growing southwards.
fn to_mercator(lat: f64, lon: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (lon + 180.0) / 360.0;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0;
    (x, y)
}

fn from_mercator(x: f64, y: f64) -> GeoPoint {
    let lon = x * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees();
    GeoPoint::new(lat, lon)
}
