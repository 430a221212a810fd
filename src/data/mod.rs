pub mod feature_collection;
pub mod fetcher;
pub mod loader;
