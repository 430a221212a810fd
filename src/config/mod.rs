pub mod map_config;
