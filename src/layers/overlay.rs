use log::warn;

use crate::data::feature_collection::{BoundingBox, FeatureCollection, Geometry};
use crate::layers::popup::{FieldSpec, PopupRecord, PARK_FIELDS, TRAIL_FIELDS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    Parks,
    Trails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);
}

/// How an overlay's geometries are painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub stroke: Rgb,
    pub stroke_weight: f32,
    pub stroke_opacity: f32,
    pub fill: Option<Rgb>,
    pub fill_opacity: f32,
    /// Radius of point markers, in screen points.
    pub radius: f32,
}

pub const PARK_GREEN: Rgb = Rgb(0x27, 0xae, 0x60);
pub const TRAIL_ORANGE: Rgb = Rgb(0xf3, 0x9c, 0x12);

pub const PARKS_STYLE: OverlayStyle = OverlayStyle {
    stroke: Rgb::WHITE,
    stroke_weight: 2.0,
    stroke_opacity: 1.0,
    fill: Some(PARK_GREEN),
    fill_opacity: 0.8,
    radius: 8.0,
};

pub const TRAILS_STYLE: OverlayStyle = OverlayStyle {
    stroke: TRAIL_ORANGE,
    stroke_weight: 4.0,
    stroke_opacity: 0.8,
    fill: None,
    fill_opacity: 0.0,
    radius: 0.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Dot,
    Line,
}

/// Small swatch shown next to an overlay in the layer control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegendMarker {
    pub shape: MarkerShape,
    pub color: Rgb,
}

/// A renderable geometry with its popup already built.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundFeature {
    pub geometry: Geometry,
    pub popup: PopupRecord,
}

/// Styled, interactive projection of a feature collection.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayer {
    pub kind: OverlayKind,
    pub name: &'static str,
    pub style: OverlayStyle,
    pub marker: LegendMarker,
    pub features: Vec<BoundFeature>,
    pub bounds: Option<BoundingBox>,
}

impl OverlayLayer {
    fn build(
        kind: OverlayKind,
        name: &'static str,
        style: OverlayStyle,
        marker: LegendMarker,
        fields: &[FieldSpec],
        collection: &FeatureCollection,
    ) -> Self {
        let mut features = Vec::with_capacity(collection.len());
        let mut skipped = 0;

        for feature in collection.features() {
            match &feature.geometry {
                Some(geometry) => features.push(BoundFeature {
                    geometry: geometry.clone(),
                    popup: PopupRecord::build(fields, feature.properties()),
                }),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!("{}: skipped {} features without geometry", name, skipped);
        }

        Self {
            kind,
            name,
            style,
            marker,
            features,
            bounds: collection.bounds(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Circle markers with park popups.
pub fn parks_overlay(collection: &FeatureCollection) -> OverlayLayer {
    OverlayLayer::build(
        OverlayKind::Parks,
        "Parks",
        PARKS_STYLE,
        LegendMarker {
            shape: MarkerShape::Dot,
            color: PARK_GREEN,
        },
        PARK_FIELDS,
        collection,
    )
}

/// Orange lines with trail popups.
pub fn trails_overlay(collection: &FeatureCollection) -> OverlayLayer {
    OverlayLayer::build(
        OverlayKind::Trails,
        "Trails",
        TRAILS_STYLE,
        LegendMarker {
            shape: MarkerShape::Line,
            color: TRAIL_ORANGE,
        },
        TRAIL_FIELDS,
        collection,
    )
}
