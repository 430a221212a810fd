pub mod map_view_controller;
pub mod renderer;
pub mod status;
pub mod viewport;
