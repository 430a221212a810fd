pub mod composite_tiles;
pub mod lib;
pub mod map;
pub mod plugins;
pub mod provider;
pub mod walkers_renderer;
pub mod windows;
