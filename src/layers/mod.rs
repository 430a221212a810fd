pub mod base_layer;
pub mod overlay;
pub mod popup;
