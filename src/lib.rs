pub mod config;
pub mod controller;
pub mod data;
pub mod errors;
pub mod layers;
pub mod ui;
