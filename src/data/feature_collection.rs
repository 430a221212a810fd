use geo::{BoundingRect, MultiPoint, Rect};
use geojson::GeoJson;
use log::warn;
use serde_json::{Map, Value};

use crate::errors::error_types::{ErrorTypes, MALFORMED_BODY, NOT_A_FEATURE_COLLECTION};

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// GeoJSON positions are `[lon, lat]`, optionally followed by an altitude
/// which is dropped.
impl TryFrom<&[f64]> for GeoPoint {
    type Error = String;

    fn try_from(position: &[f64]) -> Result<Self, Self::Error> {
        let &[lon, lat, ..] = position else {
            return Err(format!(
                "position needs at least 2 values, got {}",
                position.len()
            ));
        };
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(format!("longitude {} out of range", lon));
        }
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(format!("latitude {} out of range", lat));
        }
        Ok(GeoPoint { lat, lon })
    }
}

/// Axis-aligned geographic extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        Self {
            south: rect.min().y,
            west: rect.min().x,
            north: rect.max().y,
            east: rect.max().x,
        }
    }
}

impl BoundingBox {
    /// Smallest box covering every point, `None` when there are none.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let points: MultiPoint<f64> = points
            .into_iter()
            .map(|point| (point.lon, point.lat))
            .collect();
        points.bounding_rect().map(Self::from)
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.south..=self.north).contains(&point.lat) && (self.west..=self.east).contains(&point.lon)
    }

    /// Midpoint in degrees, not in projected space.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    pub fn is_point(&self) -> bool {
        self.south == self.north && self.west == self.east
    }
}

/// The geometry kinds drawn on the map.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(GeoPoint),
    MultiPoint(Vec<GeoPoint>),
    LineString(Vec<GeoPoint>),
    MultiLineString(Vec<Vec<GeoPoint>>),
}

impl Geometry {
    /// Converts a parsed GeoJSON geometry. Kinds that are not drawn map to
    /// `Ok(None)`; invalid positions are an error.
    pub fn from_geojson(value: &geojson::Value) -> Result<Option<Self>, String> {
        let geometry = match value {
            geojson::Value::Point(position) => {
                Geometry::Point(GeoPoint::try_from(position.as_slice())?)
            }
            geojson::Value::MultiPoint(positions) => Geometry::MultiPoint(points_of(positions)?),
            geojson::Value::LineString(positions) => Geometry::LineString(points_of(positions)?),
            geojson::Value::MultiLineString(lines) => Geometry::MultiLineString(
                lines
                    .iter()
                    .map(|line| points_of(line))
                    .collect::<Result<_, _>>()?,
            ),
            geojson::Value::Polygon(_)
            | geojson::Value::MultiPolygon(_)
            | geojson::Value::GeometryCollection(_) => return Ok(None),
        };
        Ok(Some(geometry))
    }

    /// Every coordinate of the geometry, in document order.
    pub fn coordinates(&self) -> Vec<GeoPoint> {
        match self {
            Geometry::Point(point) => vec![*point],
            Geometry::MultiPoint(points) | Geometry::LineString(points) => points.clone(),
            Geometry::MultiLineString(lines) => lines.iter().flatten().copied().collect(),
        }
    }

    pub fn points(&self) -> &[GeoPoint] {
        match self {
            Geometry::Point(point) => std::slice::from_ref(point),
            Geometry::MultiPoint(points) => points,
            _ => &[],
        }
    }

    pub fn lines(&self) -> Vec<&[GeoPoint]> {
        match self {
            Geometry::LineString(line) => vec![line.as_slice()],
            Geometry::MultiLineString(lines) => lines.iter().map(Vec::as_slice).collect(),
            _ => Vec::new(),
        }
    }
}

fn points_of(positions: &[Vec<f64>]) -> Result<Vec<GeoPoint>, String> {
    positions
        .iter()
        .map(|position| GeoPoint::try_from(position.as_slice()))
        .collect()
}

fn kind_name(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

pub type Properties = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// `None` for a null geometry or one of a kind that is not drawn.
    pub geometry: Option<Geometry>,
    properties: Properties,
}

impl Feature {
    pub fn new(geometry: Option<Geometry>, properties: Properties) -> Self {
        Self {
            geometry,
            properties,
        }
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

/// A named, read-only GeoJSON feature collection.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCollection {
    name: String,
    features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(name: &str, features: Vec<Feature>) -> Self {
        Self {
            name: name.to_string(),
            features,
        }
    }

    /// Parses a GeoJSON document that must be a `FeatureCollection`.
    ///
    /// Features whose geometry kind is not drawn are kept without a geometry.
    pub fn from_json(name: &str, body: &str) -> Result<Self, ErrorTypes> {
        let geojson = body.parse::<GeoJson>().map_err(|e| {
            ErrorTypes::new(
                MALFORMED_BODY,
                format!("{} is not valid GeoJSON: {}", name, e),
            )
        })?;
        let collection = match geojson {
            GeoJson::FeatureCollection(collection) => collection,
            GeoJson::Feature(_) => return Err(not_a_collection(name, "Feature")),
            GeoJson::Geometry(_) => return Err(not_a_collection(name, "Geometry")),
        };

        let mut features = Vec::with_capacity(collection.features.len());
        for (index, feature) in collection.features.into_iter().enumerate() {
            let geometry = match feature.geometry {
                Some(geometry) => {
                    let converted = Geometry::from_geojson(&geometry.value).map_err(|e| {
                        ErrorTypes::new(
                            MALFORMED_BODY,
                            format!("{} feature {} has a bad position: {}", name, index, e),
                        )
                    })?;
                    if converted.is_none() {
                        warn!(
                            "{} feature {}: {} geometry is not drawn",
                            name,
                            index,
                            kind_name(&geometry.value)
                        );
                    }
                    converted
                }
                None => None,
            };
            features.push(Feature::new(
                geometry,
                feature.properties.unwrap_or_default(),
            ));
        }
        Ok(Self::new(name, features))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Extent of every geometry in the collection.
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(
            self.features
                .iter()
                .filter_map(|feature| feature.geometry.as_ref())
                .flat_map(Geometry::coordinates),
        )
    }
}

fn not_a_collection(name: &str, kind: &str) -> ErrorTypes {
    ErrorTypes::new(
        NOT_A_FEATURE_COLLECTION,
        format!("{} is a {}, expected a FeatureCollection", name, kind),
    )
}

#[cfg(test)]
mod test {
    use super::*;

    const TRAILS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature",
             "geometry": {"type": "LineString", "coordinates": [[-85.31, 35.04], [-85.29, 35.06, 210.0]]},
             "properties": {"NAME": "Riverwalk"}},
            {"type": "Feature",
             "properties": {"NAME": "Stringers Ridge"},
             "geometry": {"coordinates": [[[-85.32, 35.07], [-85.33, 35.08]]], "type": "MultiLineString"}},
            {"type": "Feature", "geometry": null, "properties": null}
        ]
    }"#;

    #[test]
    fn test_parse_trails_collection() {
        let trails = FeatureCollection::from_json("trails", TRAILS).unwrap();
        assert_eq!(trails.len(), 3);
        assert_eq!(trails.features()[0].properties()["NAME"], "Riverwalk");
        assert!(trails.features()[2].geometry.is_none());
        assert!(trails.features()[2].properties().is_empty());
        assert_eq!(
            trails.features()[0].geometry.as_ref().unwrap().coordinates()[1],
            GeoPoint::new(35.06, -85.29)
        );
    }

    #[test]
    fn test_bounds_cover_every_coordinate() {
        let trails = FeatureCollection::from_json("trails", TRAILS).unwrap();
        let bounds = trails.bounds().unwrap();
        assert_eq!(
            bounds,
            BoundingBox {
                south: 35.04,
                west: -85.33,
                north: 35.08,
                east: -85.29
            }
        );
        for feature in trails.features() {
            if let Some(geometry) = &feature.geometry {
                assert!(geometry.coordinates().into_iter().all(|p| bounds.contains(p)));
            }
        }
    }

    #[test]
    fn test_single_position_bounds() {
        let point = GeoPoint::new(35.05, -85.31);
        let bounds = BoundingBox::from_points([point]).unwrap();
        assert!(bounds.is_point());
        assert_eq!(bounds.center(), point);

        let bounds = BoundingBox::from_points([point, GeoPoint::new(35.07, -85.29)]).unwrap();
        assert!(!bounds.is_point());
        assert!((bounds.center().lat - 35.06).abs() < 1e-9);
        assert!((bounds.center().lon + 85.30).abs() < 1e-9);
    }

    #[test]
    fn test_undrawn_geometry_kinds_are_kept_without_geometry() {
        let body = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"Polygon","coordinates":[[[-85.3,35.0],[-85.2,35.0],[-85.2,35.1],[-85.3,35.0]]]},"properties":{"NAME":"Loop"}},
            {"type":"Feature","geometry":{"type":"GeometryCollection","geometries":[]},"properties":{}},
            {"type":"Feature","geometry":{"type":"Point","coordinates":[-85.31,35.05]},"properties":{"NAME":"Trailhead"}}
        ]}"#;
        let trails = FeatureCollection::from_json("trails", body).unwrap();
        assert_eq!(trails.len(), 3);
        assert!(trails.features()[0].geometry.is_none());
        assert!(trails.features()[1].geometry.is_none());
        assert_eq!(trails.features()[0].properties()["NAME"], "Loop");
        assert_eq!(
            trails.bounds(),
            BoundingBox::from_points([GeoPoint::new(35.05, -85.31)])
        );
    }

    #[test]
    fn test_empty_collection_has_no_bounds() {
        let empty =
            FeatureCollection::from_json("trails", r#"{"type":"FeatureCollection","features":[]}"#)
                .unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.bounds(), None);
    }

    #[test]
    fn test_rejects_non_collection() {
        let err = FeatureCollection::from_json(
            "parks",
            r#"{"type":"Feature","geometry":null,"properties":{}}"#,
        )
        .unwrap_err();
        assert_eq!(err.code(), NOT_A_FEATURE_COLLECTION);
    }

    #[test]
    fn test_rejects_malformed_body() {
        let err = FeatureCollection::from_json("parks", "<html>Not Found</html>").unwrap_err();
        assert_eq!(err.code(), MALFORMED_BODY);
        assert!(err.message().starts_with("parks is not valid GeoJSON"));
    }

    #[test]
    fn test_rejects_out_of_range_position() {
        let body = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"Point","coordinates":[35.0, -185.3]},"properties":{}}
        ]}"#;
        let err = FeatureCollection::from_json("parks", body).unwrap_err();
        assert_eq!(err.code(), MALFORMED_BODY);
    }
}
