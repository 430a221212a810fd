/// Identifies one of the selectable background maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseLayerId {
    Topographic,
    NationalGeographic,
    Streets,
    Imagery,
    HybridImagery,
}

/// A named tile source.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseLayerOption {
    pub id: BaseLayerId,
    pub name: &'static str,
    /// URL with `{z}`, `{x}` and `{y}` placeholders.
    pub url_template: &'static str,
    /// Transparent label tiles drawn over `url_template`.
    pub label_template: Option<&'static str>,
    pub attribution: &'static str,
    pub attribution_url: &'static str,
    pub max_zoom: u8,
}

impl BaseLayerOption {
    pub fn tile_url(&self, x: u32, y: u32, zoom: u8) -> String {
        expand_template(self.url_template, x, y, zoom)
    }

    pub fn label_url(&self, x: u32, y: u32, zoom: u8) -> Option<String> {
        self.label_template
            .map(|template| expand_template(template, x, y, zoom))
    }

    pub fn is_composite(&self) -> bool {
        self.label_template.is_some()
    }
}

const ESRI_URL: &str = "https://www.esri.com";

/// The base layers in display order. The first one is active by default.
pub fn base_layers() -> Vec<BaseLayerOption> {
    vec![
        BaseLayerOption {
            id: BaseLayerId::Topographic,
            name: "Topographic",
            url_template: concat!(
                "https://server.arcgisonline.com/ArcGIS/rest/services",
                "/World_Topo_Map/MapServer/tile/{z}/{y}/{x}"
            ),
            label_template: None,
            attribution: "Tiles © Esri, HERE, Garmin, USGS, NGA, EPA, USDA, NPS",
            attribution_url: ESRI_URL,
            max_zoom: 19,
        },
        BaseLayerOption {
            id: BaseLayerId::NationalGeographic,
            name: "National Geographic",
            url_template: concat!(
                "https://server.arcgisonline.com/ArcGIS/rest/services",
                "/NatGeo_World_Map/MapServer/tile/{z}/{y}/{x}"
            ),
            label_template: None,
            attribution: "Tiles © Esri, National Geographic, Garmin, HERE, UNEP-WCMC",
            attribution_url: ESRI_URL,
            max_zoom: 16,
        },
        BaseLayerOption {
            id: BaseLayerId::Streets,
            name: "Streets",
            url_template: concat!(
                "https://server.arcgisonline.com/ArcGIS/rest/services",
                "/World_Street_Map/MapServer/tile/{z}/{y}/{x}"
            ),
            label_template: None,
            attribution: "Tiles © Esri, HERE, Garmin, USGS, Intermap, METI, OpenStreetMap",
            attribution_url: ESRI_URL,
            max_zoom: 19,
        },
        BaseLayerOption {
            id: BaseLayerId::Imagery,
            name: "Imagery",
            url_template: concat!(
                "https://server.arcgisonline.com/ArcGIS/rest/services",
                "/World_Imagery/MapServer/tile/{z}/{y}/{x}"
            ),
            label_template: None,
            attribution: "Tiles © Esri, Maxar, Earthstar Geographics, GIS User Community",
            attribution_url: ESRI_URL,
            max_zoom: 19,
        },
        BaseLayerOption {
            id: BaseLayerId::HybridImagery,
            name: "Imagery (Hybrid)",
            url_template: concat!(
                "https://server.arcgisonline.com/ArcGIS/rest/services",
                "/World_Imagery/MapServer/tile/{z}/{y}/{x}"
            ),
            label_template: Some(concat!(
                "https://server.arcgisonline.com/ArcGIS/rest/services",
                "/Reference/World_Boundaries_and_Places/MapServer/tile/{z}/{y}/{x}"
            )),
            attribution: "Tiles © Esri, Maxar, Earthstar Geographics, Garmin, HERE",
            attribution_url: ESRI_URL,
            max_zoom: 19,
        },
    ]
}

/// Fills the `{z}`, `{x}` and `{y}` placeholders of a tile URL.
pub fn expand_template(template: &str, x: u32, y: u32, zoom: u8) -> String {
    template
        .replace("{z}", &zoom.to_string())
        .replace("{x}", &x.to_string())
        .replace("{y}", &y.to_string())
}
