use log::info;
use parks_trails_map::{
    config::map_config::MapConfig,
    errors::error_types::{ErrorTypes, APP_START_FAILED},
    ui::lib::ParksTrailsApp,
};

fn main() -> Result<(), ErrorTypes> {
    env_logger::init();

    let config = MapConfig::from_env()?;
    info!(
        "Starting with parks from {} and trails from {}",
        config.parks_location, config.trails_location
    );

    eframe::run_native(
        "Chattanooga Parks & Trails",
        eframe::NativeOptions::default(),
        Box::new(move |cc| {
            Ok(Box::new(ParksTrailsApp::new(
                cc.egui_ctx.clone(),
                config,
            )))
        }),
    )
    .map_err(|e| {
        ErrorTypes::new(
            APP_START_FAILED,
            format!("Failed to open the map window: {}", e),
        )
    })
}
