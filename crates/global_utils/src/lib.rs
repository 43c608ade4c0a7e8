pub mod common_types;
pub mod config_path;
pub mod config_variant;
pub mod env_parser;
pub mod logger;
