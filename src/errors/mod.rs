pub mod error_types;
